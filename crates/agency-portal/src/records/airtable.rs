use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{FindQuery, Record, RecordFields, RecordGateway, RecordGatewayError};
use crate::config::AirtableConfig;

const REQUEST_TIMEOUT_SECS: u64 = 20;
const ERROR_BODY_PREVIEW: usize = 200;

/// REST client for the Airtable base holding the agency tables.
pub struct AirtableClient {
    http: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for AirtableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<Record>,
    #[serde(default)]
    offset: Option<String>,
}

impl AirtableClient {
    pub fn new(config: &AirtableConfig) -> Result<Self, RecordGatewayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| RecordGatewayError::Unavailable(err.to_string()))?;

        let mut base_url = Url::parse(&config.api_url).map_err(|err| {
            RecordGatewayError::Unavailable(format!(
                "invalid store url '{}': {err}",
                config.api_url
            ))
        })?;
        base_url
            .path_segments_mut()
            .map_err(|_| {
                RecordGatewayError::Unavailable(format!(
                    "store url '{}' cannot carry a path",
                    config.api_url
                ))
            })?
            .pop_if_empty()
            .push(&config.base_id);

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url,
        })
    }

    fn table_url(&self, table: &str, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(table);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    fn find_params(query: &FindQuery, offset: Option<&str>) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(formula) = &query.formula {
            params.push(("filterByFormula".to_string(), formula.to_string()));
        }
        if let Some(max) = query.max_records {
            params.push(("maxRecords".to_string(), max.to_string()));
        }
        for field in &query.fields {
            params.push(("fields[]".to_string(), field.clone()));
        }
        if let Some(offset) = offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }

    async fn check(
        response: Response,
        table: &str,
        id: Option<&str>,
    ) -> Result<Response, RecordGatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(RecordGatewayError::NotFound {
                    table: table.to_string(),
                    id: id.to_string(),
                });
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

fn status_error(status: StatusCode, body: &str) -> RecordGatewayError {
    let message: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        RecordGatewayError::Unavailable(format!("{status}: {message}"))
    } else {
        RecordGatewayError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

fn transport_error(err: reqwest::Error) -> RecordGatewayError {
    RecordGatewayError::Unavailable(err.to_string())
}

#[async_trait]
impl RecordGateway for AirtableClient {
    async fn find(&self, table: &str, query: FindQuery) -> Result<Vec<Record>, RecordGatewayError> {
        let url = self.table_url(table, None);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let response = self
                .http
                .get(url.clone())
                .bearer_auth(&self.api_key)
                .query(&Self::find_params(&query, offset.as_deref()))
                .send()
                .await
                .map_err(transport_error)?;
            let page: RecordPage = Self::check(response, table, None)
                .await?
                .json()
                .await
                .map_err(transport_error)?;

            records.extend(page.records);
            let reached_limit = query
                .max_records
                .map(|max| records.len() >= max)
                .unwrap_or(false);

            match page.offset {
                Some(next) if !reached_limit => offset = Some(next),
                _ => break,
            }
        }

        if let Some(max) = query.max_records {
            records.truncate(max);
        }

        debug!(table, count = records.len(), "fetched records");
        Ok(records)
    }

    async fn get(&self, table: &str, id: &str) -> Result<Record, RecordGatewayError> {
        let response = self
            .http
            .get(self.table_url(table, Some(id)))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        Self::check(response, table, Some(id))
            .await?
            .json()
            .await
            .map_err(transport_error)
    }

    async fn create(
        &self,
        table: &str,
        fields: RecordFields,
        typecast: bool,
    ) -> Result<Record, RecordGatewayError> {
        let response = self
            .http
            .post(self.table_url(table, None))
            .bearer_auth(&self.api_key)
            .json(&json!({ "fields": fields, "typecast": typecast }))
            .send()
            .await
            .map_err(transport_error)?;

        let record: Record = Self::check(response, table, None)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        debug!(table, record_id = %record.id, "created record");
        Ok(record)
    }
}
