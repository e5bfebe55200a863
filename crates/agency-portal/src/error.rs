use crate::config::ConfigError;
use crate::records::RecordGatewayError;
use crate::telemetry::TelemetryError;
use crate::workflows::claims::ClaimError;
use crate::workflows::ratings::RatingError;
use crate::workflows::validation::ValidationError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(RecordGatewayError),
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(RecordGatewayError::NotConfigured)
            | AppError::Store(RecordGatewayError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Store(RecordGatewayError::Rejected { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Store(RecordGatewayError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "{}", err),
            AppError::BadRequest(message) => write!(f, "invalid request: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::BadRequest(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RecordGatewayError> for AppError {
    fn from(value: RecordGatewayError) -> Self {
        Self::Store(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::Store(err) => Self::Store(err),
        }
    }
}

impl From<RatingError> for AppError {
    fn from(value: RatingError) -> Self {
        match value {
            RatingError::Store(err) => Self::Store(err),
            invalid @ RatingError::InvalidStars(_) => Self::BadRequest(invalid.to_string()),
        }
    }
}

impl From<ClaimError> for AppError {
    fn from(value: ClaimError) -> Self {
        match value {
            ClaimError::Store(err) => Self::Store(err),
            invalid => Self::BadRequest(invalid.to_string()),
        }
    }
}
