use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use super::{FindQuery, Record, RecordFields, RecordGateway, RecordGatewayError};

/// Process-local store that evaluates formulas in memory.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    unavailable: Mutex<HashSet<String>>,
    sequence: AtomicU64,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a row as-is, keeping its id.
    pub fn insert(&self, table: &str, record: Record) {
        let mut tables = self.tables.lock().expect("gateway mutex poisoned");
        tables.entry(table.to_string()).or_default().push(record);
    }

    pub fn with_record(self, table: &str, record: Record) -> Self {
        self.insert(table, record);
        self
    }

    /// Every later call touching `table` fails with `Unavailable`.
    pub fn mark_unavailable(&self, table: &str) {
        let mut unavailable = self.unavailable.lock().expect("gateway mutex poisoned");
        unavailable.insert(table.to_string());
    }

    pub fn records(&self, table: &str) -> Vec<Record> {
        let tables = self.tables.lock().expect("gateway mutex poisoned");
        tables.get(table).cloned().unwrap_or_default()
    }

    fn ensure_available(&self, table: &str) -> Result<(), RecordGatewayError> {
        let unavailable = self.unavailable.lock().expect("gateway mutex poisoned");
        if unavailable.contains(table) {
            return Err(RecordGatewayError::Unavailable(format!(
                "table {table} is offline"
            )));
        }
        Ok(())
    }

    fn next_id(&self) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("recmem{id:011}")
    }
}

#[async_trait]
impl RecordGateway for InMemoryGateway {
    async fn find(&self, table: &str, query: FindQuery) -> Result<Vec<Record>, RecordGatewayError> {
        self.ensure_available(table)?;
        let tables = self.tables.lock().expect("gateway mutex poisoned");
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or_default();
        let limit = query.max_records.unwrap_or(usize::MAX);

        Ok(rows
            .iter()
            .filter(|record| {
                query
                    .formula
                    .as_ref()
                    .map_or(true, |formula| formula.matches(&record.fields))
            })
            .take(limit)
            .map(|record| project(record, &query.fields))
            .collect())
    }

    async fn get(&self, table: &str, id: &str) -> Result<Record, RecordGatewayError> {
        self.ensure_available(table)?;
        let tables = self.tables.lock().expect("gateway mutex poisoned");
        tables
            .get(table)
            .and_then(|rows| rows.iter().find(|record| record.id == id))
            .cloned()
            .ok_or_else(|| RecordGatewayError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })
    }

    async fn create(
        &self,
        table: &str,
        fields: RecordFields,
        _typecast: bool,
    ) -> Result<Record, RecordGatewayError> {
        self.ensure_available(table)?;
        let record = Record {
            id: self.next_id(),
            created_time: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            fields,
        };
        self.insert(table, record.clone());
        Ok(record)
    }
}

fn project(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    Record {
        id: record.id.clone(),
        created_time: record.created_time.clone(),
        fields: record
            .fields
            .iter()
            .filter(|(name, _)| fields.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    }
}
