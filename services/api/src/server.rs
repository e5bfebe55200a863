use crate::cli::ServeArgs;
use crate::infra::{AppState, PortalServices};
use crate::routes::{with_portal_routes, SERVICE_NAME};
use agency_portal::config::AppConfig;
use agency_portal::error::AppError;
use agency_portal::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = PortalServices::from_config(&config).await;
    let app = with_portal_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        store = config.airtable.is_some(),
        uploads = config.drive.folder_id.is_some(),
        service = SERVICE_NAME,
        "portal backend ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
