use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use super::service::{TestimonialFeed, TestimonialService};
use crate::error::AppError;

pub fn testimonial_router(service: Arc<TestimonialService>) -> Router {
    Router::new()
        .route("/api/testimonios", get(feed_handler))
        .with_state(service)
}

pub(crate) async fn feed_handler(
    State(service): State<Arc<TestimonialService>>,
) -> Result<Json<TestimonialFeed>, AppError> {
    Ok(Json(service.feed().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InMemoryGateway, RATINGS_TABLE};
    use crate::workflows::test_support::{read_json_body, record};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn feed_route_serializes_items() {
        let gateway = InMemoryGateway::new().with_record(
            RATINGS_TABLE,
            record(
                "recT",
                json!({
                    "NOMBRE": "Lucia Diaz",
                    "ESTRELLAS": 5,
                    "COMENTARIO": "Excelente",
                    "VISIBLE": true,
                    "AUTORIZA_PUBLICAR": true
                }),
            ),
        );
        let router = testimonial_router(Arc::new(TestimonialService::new(Arc::new(gateway))));

        let response = router
            .oneshot(Request::get("/api/testimonios").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json_body(response).await;
        assert_eq!(body["total"], json!(1));
        assert_eq!(body["testimonios"][0]["initials"], json!("LD"));
        assert_eq!(body["testimonios"][0]["stars"], json!(5));
        assert_eq!(body["testimonios"][0]["relativeAge"], json!("Reciente"));
    }

    #[tokio::test]
    async fn outage_is_service_unavailable() {
        let gateway = InMemoryGateway::new();
        gateway.mark_unavailable(RATINGS_TABLE);
        let router = testimonial_router(Arc::new(TestimonialService::new(Arc::new(gateway))));

        let response = router
            .oneshot(Request::get("/api/testimonios").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
