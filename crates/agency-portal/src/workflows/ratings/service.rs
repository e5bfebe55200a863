use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use super::domain::{
    RatingReceipt, RatingSubmission, RatingSummary, EXPERIENCE_FIELD, NO, STARS_FIELD, YES,
};
use crate::records::{
    FindQuery, Formula, RecordFields, RecordGateway, RecordGatewayError, CLIENTS_TABLE,
    RATINGS_TABLE,
};
use crate::workflows::digits_only;

/// Computes the public average and stores new ratings, linking known clients.
pub struct RatingService {
    gateway: Arc<dyn RecordGateway>,
    agent_record_id: Option<String>,
}

impl RatingService {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self {
            gateway,
            agent_record_id: None,
        }
    }

    /// Staff row credited with ratings that arrive through the portal.
    pub fn with_agent(mut self, agent_record_id: Option<String>) -> Self {
        self.agent_record_id = agent_record_id;
        self
    }

    pub async fn average(&self) -> Result<RatingSummary, RatingError> {
        let query = FindQuery::matching(Formula::and([
            Formula::is_true("VISIBLE"),
            Formula::positive(STARS_FIELD),
        ]))
        .only_fields([STARS_FIELD]);

        let records = self.gateway.find(RATINGS_TABLE, query).await?;
        let stars: Vec<f64> = records
            .iter()
            .map(|record| record.number(STARS_FIELD).unwrap_or(0.0))
            .collect();
        Ok(RatingSummary::from_stars(&stars))
    }

    pub async fn save(&self, submission: RatingSubmission) -> Result<RatingReceipt, RatingError> {
        if !(1..=5).contains(&submission.stars) {
            return Err(RatingError::InvalidStars(submission.stars));
        }

        let mut fields = RecordFields::new();
        fields.insert(STARS_FIELD.into(), json!(submission.stars));
        fields.insert(EXPERIENCE_FIELD.into(), json!(submission.stars));
        fields.insert("NOMBRE".into(), json!(submission.name));
        fields.insert("ES_CLIENTE".into(), json!(submission.is_client));
        fields.insert("SERVICIO".into(), json!(submission.service));
        fields.insert("COMENTARIO".into(), json!(submission.comment));
        fields.insert("MODO".into(), json!("Online"));
        fields.insert("VISIBLE".into(), Value::Bool(true));
        fields.insert("AUTORIZA_PUBLICAR".into(), json!(submission.publish_consent));
        fields.insert("USAR FOTO".into(), json!(submission.use_photo));
        if let Some(agent) = &self.agent_record_id {
            fields.insert("EMPLEADO".into(), json!([agent]));
        }

        let mut client_linked = false;
        if submission.claims_to_be_client() {
            // Confirmed only once the id is found in the client table.
            fields.insert("ES_CLIENTE".into(), json!(NO));
            let dni = submission.dni.as_deref().map(digits_only).unwrap_or_default();
            if let Some((client_id, dni)) = self.lookup_client(&dni).await {
                fields.insert("CLIENTE".into(), json!([client_id]));
                fields.insert("ES_CLIENTE".into(), json!(YES));
                fields.insert("DNI".into(), json!(dni));
                client_linked = true;
            }
        }

        let record = self.gateway.create(RATINGS_TABLE, fields, false).await?;
        info!(record = %record.id, stars = submission.stars, client_linked, "rating stored");

        Ok(RatingReceipt {
            status: "success",
            message: "Calificación registrada correctamente".to_string(),
            record_id: record.id,
            client_linked,
        })
    }

    /// Client row id and numeric DNI, or nothing when the lookup misses or fails.
    async fn lookup_client(&self, dni: &str) -> Option<(String, i64)> {
        let number: i64 = dni.parse().ok()?;
        let query = FindQuery::matching(Formula::number_eq("DNI", number)).limit(1);
        match self.gateway.find(CLIENTS_TABLE, query).await {
            Ok(records) => records.into_iter().next().map(|client| (client.id, number)),
            Err(error) => {
                warn!(%error, "client lookup failed; rating stored unlinked");
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("stars must be between 1 and 5, got {0}")]
    InvalidStars(i64),
    #[error(transparent)]
    Store(#[from] RecordGatewayError),
}
