use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::debug;

use super::domain::{ClaimFile, ClaimReceipt, ClaimSubmission};
use super::service::{ClaimError, ClaimService};
use crate::error::AppError;

/// Photos from phones routinely exceed axum's 2 MiB default.
pub const MAX_CLAIM_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn claim_router(service: Arc<ClaimService>) -> Router {
    Router::new()
        .route("/api/create-siniestro", post(create_handler))
        .layer(DefaultBodyLimit::max(MAX_CLAIM_BODY_BYTES))
        .with_state(service)
}

pub(crate) async fn create_handler(
    State(service): State<Arc<ClaimService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClaimReceipt>, AppError> {
    let multipart = multipart.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let submission = read_submission(multipart).await?;
    Ok(Json(service.submit(submission).await?))
}

async fn read_submission(mut multipart: Multipart) -> Result<ClaimSubmission, ClaimError> {
    let mut submission = ClaimSubmission::default();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid)?;
                if bytes.is_empty() || filename.is_empty() {
                    debug!(field = %name, "empty file part ignored");
                    continue;
                }
                submission.files.push(ClaimFile::new(
                    name,
                    filename,
                    content_type.as_deref(),
                    bytes.to_vec(),
                ));
            }
            None => {
                let value = field.text().await.map_err(invalid)?;
                submission.apply_text(&name, value)?;
            }
        }
    }
    Ok(submission)
}

fn invalid(err: axum::extract::multipart::MultipartError) -> ClaimError {
    ClaimError::InvalidPayload(err.body_text())
}
