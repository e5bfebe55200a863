use agency_portal::config::{AirtableConfig, AppConfig, DriveConfig};
use agency_portal::records::{AirtableClient, RecordGateway, UnconfiguredGateway};
use agency_portal::workflows::claims::{
    AttachmentUploader, ClaimService, DriveAttachmentUploader, UnconfiguredUploader,
};
use agency_portal::workflows::ratings::RatingService;
use agency_portal::workflows::testimonials::TestimonialService;
use agency_portal::workflows::validation::ClientValidationService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Workflow services sharing one record gateway.
#[derive(Clone)]
pub(crate) struct PortalServices {
    pub(crate) validation: Arc<ClientValidationService>,
    pub(crate) testimonials: Arc<TestimonialService>,
    pub(crate) ratings: Arc<RatingService>,
    pub(crate) claims: Arc<ClaimService>,
}

impl PortalServices {
    pub(crate) fn new(
        gateway: Arc<dyn RecordGateway>,
        uploader: Arc<dyn AttachmentUploader>,
        agent_record_id: Option<String>,
    ) -> Self {
        Self {
            validation: Arc::new(ClientValidationService::new(gateway.clone())),
            testimonials: Arc::new(TestimonialService::new(gateway.clone())),
            ratings: Arc::new(RatingService::new(gateway.clone()).with_agent(agent_record_id)),
            claims: Arc::new(ClaimService::new(gateway, uploader)),
        }
    }

    pub(crate) async fn from_config(config: &AppConfig) -> Self {
        let gateway = record_gateway(config.airtable.as_ref());
        let uploader = attachment_uploader(&config.drive).await;
        Self::new(gateway, uploader, config.ratings.agent_record_id.clone())
    }
}

/// Falls back to a gateway that answers every call as unconfigured, so the public routes
/// stay up without credentials.
pub(crate) fn record_gateway(config: Option<&AirtableConfig>) -> Arc<dyn RecordGateway> {
    let Some(config) = config else {
        warn!("AIRTABLE_API_KEY or AIRTABLE_BASE_ID missing; record routes will answer 503");
        return Arc::new(UnconfiguredGateway);
    };

    match AirtableClient::new(config) {
        Ok(client) => {
            info!(base = %config.base_id, "record store configured");
            Arc::new(client)
        }
        Err(error) => {
            warn!(%error, "record store client unavailable; record routes will answer 503");
            Arc::new(UnconfiguredGateway)
        }
    }
}

pub(crate) async fn attachment_uploader(config: &DriveConfig) -> Arc<dyn AttachmentUploader> {
    if config.folder_id.is_none() {
        warn!("GOOGLE_DRIVE_FOLDER_ID missing; claim attachments will be skipped");
        return Arc::new(UnconfiguredUploader);
    }

    match DriveAttachmentUploader::connect(config).await {
        Ok(uploader) => Arc::new(uploader),
        Err(error) => {
            warn!(%error, "drive uploader unavailable; claim attachments will be skipped");
            Arc::new(UnconfiguredUploader)
        }
    }
}
