//! Customer ratings: the public average and the review form.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{RatingReceipt, RatingSubmission, RatingSummary};
pub use router::rating_router;
pub use service::{RatingError, RatingService};
