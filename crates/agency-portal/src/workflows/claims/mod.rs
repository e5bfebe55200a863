//! Claim reports: multipart intake, attachment uploads to Drive, and row creation in the
//! table configured per form.

pub mod domain;
pub mod router;
pub mod service;
pub mod uploader;

pub use domain::{AttachmentSet, ClaimFile, ClaimReceipt, ClaimSubmission};
pub use router::claim_router;
pub use service::{ClaimError, ClaimService};
pub use uploader::{
    AttachmentUploader, DriveAttachmentUploader, DriveUploader, UnconfiguredUploader, UploadError,
};
