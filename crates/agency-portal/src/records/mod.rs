//! Access to the relational-table store holding clients, policies, ratings, and claims.
//!
//! Workflows only ever talk to [`RecordGateway`]; the Airtable REST client is one
//! implementation and [`InMemoryGateway`] serves tests and local runs.

mod airtable;
mod formula;
mod memory;

pub use airtable::AirtableClient;
pub use formula::Formula;
pub use memory::InMemoryGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CLIENTS_TABLE: &str = "CLIENTES";
pub const POLICIES_TABLE: &str = "POLIZAS";
pub const RATINGS_TABLE: &str = "CALIFICACIONES";
pub const FORMS_TABLE: &str = "CONFIG_FORMULARIOS";

/// Field map of a stored row, keyed by column label.
pub type RecordFields = Map<String, Value>;

/// A stored row as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: RecordFields,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: RecordFields) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Text value of a field; numbers are rendered, empty strings count as missing.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.fields.get(name), Some(Value::Bool(true)))
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Value::Number(value) => value.as_f64(),
            Value::String(value) => value.trim().parse().ok(),
            _ => None,
        }
    }

    /// Linked-record ids (or any list of strings) stored under `name`.
    pub fn links(&self, name: &str) -> Vec<String> {
        match self.fields.get(name) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(value)) if !value.is_empty() => vec![value.clone()],
            _ => Vec::new(),
        }
    }
}

/// Query parameters for [`RecordGateway::find`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub formula: Option<Formula>,
    pub max_records: Option<usize>,
    pub fields: Vec<String>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(formula: Formula) -> Self {
        Self {
            formula: Some(formula),
            ..Self::default()
        }
    }

    pub fn limit(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn only_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Storage abstraction so the workflows can be exercised in isolation.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn find(&self, table: &str, query: FindQuery) -> Result<Vec<Record>, RecordGatewayError>;
    async fn get(&self, table: &str, id: &str) -> Result<Record, RecordGatewayError>;
    async fn create(
        &self,
        table: &str,
        fields: RecordFields,
        typecast: bool,
    ) -> Result<Record, RecordGatewayError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RecordGatewayError {
    #[error("record store is not configured")]
    NotConfigured,
    #[error("record {id} not found in {table}")]
    NotFound { table: String, id: String },
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Stand-in used when credentials are missing; every call reports `NotConfigured`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGateway;

#[async_trait]
impl RecordGateway for UnconfiguredGateway {
    async fn find(
        &self,
        _table: &str,
        _query: FindQuery,
    ) -> Result<Vec<Record>, RecordGatewayError> {
        Err(RecordGatewayError::NotConfigured)
    }

    async fn get(&self, _table: &str, _id: &str) -> Result<Record, RecordGatewayError> {
        Err(RecordGatewayError::NotConfigured)
    }

    async fn create(
        &self,
        _table: &str,
        _fields: RecordFields,
        _typecast: bool,
    ) -> Result<Record, RecordGatewayError> {
        Err(RecordGatewayError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: Value) -> Record {
        let fields = fields.as_object().cloned().expect("object fields");
        Record::new("rec1", fields)
    }

    #[test]
    fn text_treats_blank_strings_as_missing() {
        let record = record(json!({ "NOMBRE": "  ", "DNI": 30111222 }));
        assert_eq!(record.text("NOMBRE"), None);
        assert_eq!(record.text("DNI").as_deref(), Some("30111222"));
        assert_eq!(record.text("MISSING"), None);
    }

    #[test]
    fn links_accept_lists_and_single_values() {
        let record = record(json!({ "POLIZAS": ["recA", "recB", 3], "CLIENTE": "recC" }));
        assert_eq!(record.links("POLIZAS"), vec!["recA", "recB"]);
        assert_eq!(record.links("CLIENTE"), vec!["recC"]);
        assert!(record.links("OTRO").is_empty());
    }

    #[test]
    fn deserializes_store_payload() {
        let record: Record = serde_json::from_value(json!({
            "id": "rec9",
            "createdTime": "2025-01-05T10:00:00.000Z",
            "fields": { "ESTRELLAS": 4, "VISIBLE": true }
        }))
        .expect("record parses");

        assert_eq!(record.created_time.as_deref(), Some("2025-01-05T10:00:00.000Z"));
        assert_eq!(record.number("ESTRELLAS"), Some(4.0));
        assert!(record.flag("VISIBLE"));
    }

    #[tokio::test]
    async fn unconfigured_gateway_reports_not_configured() {
        let gateway = UnconfiguredGateway;
        let error = gateway
            .find(CLIENTS_TABLE, FindQuery::all())
            .await
            .expect_err("not configured");
        assert!(matches!(error, RecordGatewayError::NotConfigured));
    }
}
