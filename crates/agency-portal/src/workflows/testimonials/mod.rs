//! Public testimonial carousel built from published customer ratings.

pub mod domain;
pub mod router;
pub mod selector;
pub mod service;

pub use domain::{AgeBucket, TestimonialItem, RECENT_WINDOW_DAYS};
pub use router::testimonial_router;
pub use selector::{SelectionQuota, TestimonialSelector};
pub use service::{TestimonialFeed, TestimonialService};
