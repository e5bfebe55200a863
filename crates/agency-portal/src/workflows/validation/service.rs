use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    ClientSummary, ReasonCode, ValidationOutcome, COMPILED_POLICIES_FIELD, DNI_FIELD,
    POLICY_LINKS_FIELD,
};
use crate::records::{
    FindQuery, Formula, Record, RecordGateway, RecordGatewayError, CLIENTS_TABLE, POLICIES_TABLE,
};
use crate::workflows::digits_only;
use crate::workflows::policies::{
    normalize_plate, parse_compiled, verdict_for_plate, BlockSplitter, CompiledPolicyText,
    PlateVerdict,
};

/// Checks that a national id owns an active policy for a given plate.
pub struct ClientValidationService {
    gateway: Arc<dyn RecordGateway>,
    splitter: BlockSplitter,
}

impl ClientValidationService {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self {
            gateway,
            splitter: BlockSplitter::default(),
        }
    }

    pub fn with_splitter(mut self, splitter: BlockSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    pub async fn validate(
        &self,
        dni: &str,
        plate: &str,
    ) -> Result<ValidationOutcome, ValidationError> {
        let dni = digits_only(dni);
        let plate = normalize_plate(plate);
        if dni.is_empty() || plate.is_empty() {
            return Ok(ValidationOutcome::invalid(
                ReasonCode::IncompleteData,
                "Datos incompletos: ingresá DNI y patente.",
            ));
        }

        let Some(client) = self.find_client(&dni).await? else {
            info!(reason = ?ReasonCode::ClientNotFound, "client validation rejected");
            return Ok(ValidationOutcome::invalid(
                ReasonCode::ClientNotFound,
                format!(
                    "No encontramos un cliente con el DNI ingresado ({dni}). Verificá que esté escrito correctamente."
                ),
            ));
        };

        let summary = ClientSummary::from_record(&client);
        let compiled = CompiledPolicyText::from_field(client.field(COMPILED_POLICIES_FIELD));
        let policies = parse_compiled(&compiled, self.splitter);
        debug!(client = %client.id, blocks = policies.len(), "parsed compiled policies");

        let policy = match verdict_for_plate(&policies, &plate) {
            PlateVerdict::Active(policy) => policy.clone(),
            PlateVerdict::Inactive(_) => {
                info!(
                    reason = ?ReasonCode::PolicyInactive,
                    client = %client.id,
                    "client validation rejected"
                );
                return Ok(ValidationOutcome::invalid(
                    ReasonCode::PolicyInactive,
                    format!("La póliza del vehículo {plate} figura como ANULADA o DE BAJA."),
                ));
            }
            PlateVerdict::NotFound => {
                info!(
                    reason = ?ReasonCode::PatenteNotFound,
                    client = %client.id,
                    "client validation rejected"
                );
                return Ok(ValidationOutcome::invalid(
                    ReasonCode::PatenteNotFound,
                    format!(
                        "Hola {}, no encontramos el vehículo patente {plate} asociado a tu DNI.",
                        summary.full_name
                    ),
                ));
            }
        };

        let record_id = self.resolve_policy_record(&client, &plate).await;
        info!(client = %client.id, resolved = record_id.is_some(), "client validated");

        Ok(ValidationOutcome::Valid {
            client: summary,
            policy,
            record_id,
        })
    }

    async fn find_client(&self, dni: &str) -> Result<Option<Record>, RecordGatewayError> {
        let query = FindQuery::matching(Formula::text_eq(DNI_FIELD, dni)).limit(1);
        let records = self.gateway.find(CLIENTS_TABLE, query).await?;
        Ok(records.into_iter().next())
    }

    /// The compiled label carries no row ids, so each linked policy row is fetched and
    /// searched for the plate. Failed fetches are skipped.
    async fn resolve_policy_record(&self, client: &Record, plate: &str) -> Option<String> {
        for id in client.links(POLICY_LINKS_FIELD) {
            match self.gateway.get(POLICIES_TABLE, &id).await {
                Ok(policy) if mentions_plate(&policy, plate) => return Some(id),
                Ok(_) => {}
                Err(error) => debug!(%id, %error, "skipping unreadable policy row"),
            }
        }
        None
    }
}

fn mentions_plate(record: &Record, plate: &str) -> bool {
    record
        .fields
        .values()
        .any(|value| value.to_string().to_uppercase().contains(plate))
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Store(#[from] RecordGatewayError),
}
