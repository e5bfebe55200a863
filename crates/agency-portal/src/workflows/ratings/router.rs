use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};

use super::domain::{RatingReceipt, RatingSubmission, RatingSummary};
use super::service::RatingService;
use crate::error::AppError;

pub fn rating_router(service: Arc<RatingService>) -> Router {
    Router::new()
        .route("/api/rating", get(average_handler).post(save_handler))
        .with_state(service)
}

pub(crate) async fn average_handler(
    State(service): State<Arc<RatingService>>,
) -> Result<Json<RatingSummary>, AppError> {
    Ok(Json(service.average().await?))
}

pub(crate) async fn save_handler(
    State(service): State<Arc<RatingService>>,
    payload: Result<Json<RatingSubmission>, JsonRejection>,
) -> Result<Json<RatingReceipt>, AppError> {
    let Json(submission) =
        payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(Json(service.save(submission).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InMemoryGateway, RATINGS_TABLE};
    use crate::workflows::test_support::{read_json_body, record};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn router(gateway: Arc<InMemoryGateway>) -> Router {
        rating_router(Arc::new(RatingService::new(gateway)))
    }

    fn post(body: &str) -> Request<Body> {
        Request::post("/api/rating")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn average_route_reports_mean_and_count() {
        let gateway = Arc::new(
            InMemoryGateway::new()
                .with_record(RATINGS_TABLE, record("r1", json!({ "ESTRELLAS": 5, "VISIBLE": true })))
                .with_record(RATINGS_TABLE, record("r2", json!({ "ESTRELLAS": 2, "VISIBLE": true }))),
        );

        let response = router(gateway)
            .oneshot(Request::get("/api/rating").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json_body(response).await, json!({ "rating": 3.5, "total": 2 }));
    }

    #[tokio::test]
    async fn save_route_returns_receipt() {
        let gateway = Arc::new(InMemoryGateway::new());
        let response = router(gateway.clone())
            .oneshot(post(r#"{"estrellas": 4, "comentario": "Rápidos"}"#))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["status"], json!("success"));
        assert_eq!(body["clienteVinculado"], json!(false));
        assert_eq!(body["recordId"], json!(gateway.records(RATINGS_TABLE)[0].id));
    }

    #[tokio::test]
    async fn malformed_payloads_are_bad_requests() {
        for body in ["{not json", r#"{"comentario": "sin estrellas"}"#, r#"{"estrellas": 0}"#] {
            let response = router(Arc::new(InMemoryGateway::new()))
                .oneshot(post(body))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        }
    }
}
