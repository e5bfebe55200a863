use serde::Serialize;

use crate::records::Record;
use crate::workflows::policies::PolicyRecord;

pub const DNI_FIELD: &str = "DNI";
pub const COMPILED_POLICIES_FIELD: &str = "ETIQUETA_POLIZA Compilación (de POLIZAS)";
pub const POLICY_LINKS_FIELD: &str = "POLIZAS";
const NAMES_FIELD: &str = "NOMBRES";
const SURNAME_FIELD: &str = "APELLIDO";
const FULL_NAME_FIELD: &str = "NOMBRE COMPLETO";

/// Why a validation request was answered negatively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    ClientNotFound,
    PatenteNotFound,
    PolicyInactive,
    IncompleteData,
}

/// Client attributes echoed back to the portal after a successful match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    #[serde(skip)]
    pub record_id: String,
    #[serde(rename = "nombres")]
    pub names: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "fullname")]
    pub full_name: String,
}

impl ClientSummary {
    pub fn from_record(record: &Record) -> Self {
        let names = record.text(NAMES_FIELD).unwrap_or_default();
        let full_name = record
            .text(FULL_NAME_FIELD)
            .or_else(|| record.text(NAMES_FIELD))
            .unwrap_or_else(|| "Cliente".to_string());

        Self {
            record_id: record.id.clone(),
            names,
            surname: record.text(SURNAME_FIELD).unwrap_or_default(),
            full_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid {
        client: ClientSummary,
        policy: PolicyRecord,
        /// Store id of the matched policy row, when it could be resolved.
        record_id: Option<String>,
    },
    Invalid {
        reason: ReasonCode,
        message: String,
    },
}

impl ValidationOutcome {
    pub fn invalid(reason: ReasonCode, message: impl Into<String>) -> Self {
        Self::Invalid {
            reason,
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { reason, .. } => Some(*reason),
        }
    }

    pub fn view(&self) -> ValidationView {
        match self {
            Self::Valid {
                client,
                policy,
                record_id,
            } => ValidationView {
                valid: true,
                reason: None,
                message: "Validación exitosa".to_string(),
                client: Some(client.clone()),
                policy: Some(PolicyView::new(policy, record_id.clone())),
            },
            Self::Invalid { reason, message } => ValidationView {
                valid: false,
                reason: Some(*reason),
                message: message.clone(),
                client: None,
                policy: None,
            },
        }
    }
}

/// Wire shape consumed by the portal's claim and validation forms.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationView {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    pub message: String,
    #[serde(rename = "cliente", skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientSummary>,
    #[serde(rename = "poliza", skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyView {
    pub record_id: Option<String>,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "patente")]
    pub plate: String,
    #[serde(rename = "tipo_vehiculo")]
    pub vehicle_type: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "vida")]
    pub life_rider: bool,
    #[serde(rename = "auxilio")]
    pub roadside_rider: bool,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "descripcion_completa")]
    pub description: String,
}

impl PolicyView {
    pub fn new(policy: &PolicyRecord, record_id: Option<String>) -> Self {
        Self {
            record_id,
            number: policy.number.clone(),
            plate: policy.plate.clone(),
            vehicle_type: policy.vehicle_type.clone(),
            category: policy.category.clone(),
            life_rider: policy.has_life_rider,
            roadside_rider: policy.has_roadside_rider,
            status: policy.status.label(),
            description: policy.description.clone(),
        }
    }
}
