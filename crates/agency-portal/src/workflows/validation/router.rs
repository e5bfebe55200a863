use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::domain::ValidationView;
use super::service::ClientValidationService;
use crate::error::AppError;

/// Query string of both validation routes. Missing values count as blank.
#[derive(Debug, Default, Deserialize)]
pub struct ValidationQuery {
    #[serde(default)]
    pub dni: String,
    #[serde(default)]
    pub patente: String,
}

/// Router exposing client/plate validation under its current and legacy paths.
pub fn validation_router(service: Arc<ClientValidationService>) -> Router {
    Router::new()
        .route("/api/validate-siniestro", get(validate_handler))
        .route("/api/validar-cliente", get(validate_handler))
        .with_state(service)
}

pub(crate) async fn validate_handler(
    State(service): State<Arc<ClientValidationService>>,
    Query(query): Query<ValidationQuery>,
) -> Result<Json<ValidationView>, AppError> {
    let outcome = service.validate(&query.dni, &query.patente).await?;
    Ok(Json(outcome.view()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InMemoryGateway, UnconfiguredGateway, CLIENTS_TABLE};
    use crate::workflows::test_support::{read_json_body, record};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn router_with_client() -> Router {
        let gateway = InMemoryGateway::new().with_record(
            CLIENTS_TABLE,
            record(
                "recClient",
                json!({
                    "DNI": "30111222",
                    "NOMBRES": "Ana",
                    "ETIQUETA_POLIZA Compilación (de POLIZAS)":
                        "\u{2705} VENCE 30D | \u{1F697} AUTO | N° POL: 33333333 | \u{1F3F7}\u{FE0F} PDL384"
                }),
            ),
        );
        validation_router(Arc::new(ClientValidationService::new(Arc::new(gateway))))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        let status = response.status();
        (status, read_json_body(response).await)
    }

    #[tokio::test]
    async fn both_paths_answer_with_the_same_verdict() {
        for path in ["/api/validate-siniestro", "/api/validar-cliente"] {
            let (status, body) =
                get_json(router_with_client(), &format!("{path}?dni=30111222&patente=pdl384")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["valid"], json!(true));
            assert_eq!(body["poliza"]["patente"], json!("PDL384"));
            assert_eq!(body["poliza"]["estado"], json!("VENCE 30D"));
        }
    }

    #[tokio::test]
    async fn negative_verdicts_are_ok_responses() {
        let (status, body) =
            get_json(router_with_client(), "/api/validate-siniestro?dni=1&patente=AAA111").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reason"], json!("CLIENT_NOT_FOUND"));

        let (_, body) = get_json(router_with_client(), "/api/validate-siniestro").await;
        assert_eq!(body["reason"], json!("INCOMPLETE_DATA"));
    }

    #[tokio::test]
    async fn unconfigured_store_is_service_unavailable() {
        let router = validation_router(Arc::new(ClientValidationService::new(Arc::new(
            UnconfiguredGateway,
        ))));
        let (status, body) =
            get_json(router, "/api/validar-cliente?dni=30111222&patente=PDL384").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap_or_default().contains("not configured"));
    }
}
