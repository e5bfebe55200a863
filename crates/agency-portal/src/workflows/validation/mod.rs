//! Client and vehicle validation ahead of claim submission.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{ClientSummary, PolicyView, ReasonCode, ValidationOutcome, ValidationView};
pub use router::{validation_router, ValidationQuery};
pub use service::{ClientValidationService, ValidationError};
