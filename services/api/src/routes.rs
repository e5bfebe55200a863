use crate::infra::{AppState, PortalServices};
use agency_portal::workflows::claims::claim_router;
use agency_portal::workflows::ratings::rating_router;
use agency_portal::workflows::testimonials::testimonial_router;
use agency_portal::workflows::validation::validation_router;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::atomic::Ordering;

pub(crate) const SERVICE_NAME: &str = "Backend Agencia de Seguros";

/// Every workflow router plus the operational endpoints.
pub(crate) fn with_portal_routes(services: PortalServices) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(validation_router(services.validation))
        .merge(testimonial_router(services.testimonials))
        .merge(rating_router(services.ratings))
        .merge(claim_router(services.claims))
}

pub(crate) async fn banner() -> Json<serde_json::Value> {
    Json(json!({ "status": "online", "service": SERVICE_NAME }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    match state.readiness.load(Ordering::Acquire) {
        true => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        false => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        ),
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
