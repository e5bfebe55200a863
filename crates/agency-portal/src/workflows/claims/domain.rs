use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::service::ClaimError;
use crate::records::RecordFields;

pub const DEFAULT_DESTINATION_TABLE: &str = "SINIESTROS";
pub const FORM_SLUG_FIELD: &str = "Slug";
pub const DESTINATION_TABLE_FIELD: &str = "Tabla Destino";

/// Multipart field names the claim form posts besides its file inputs.
pub const SLUG_PART: &str = "tipo_formulario";
pub const POLICY_PART: &str = "poliza_record_id";
pub const DNI_PART: &str = "dni";
pub const PLATE_PART: &str = "patente";
pub const DATA_PART: &str = "datos";

/// One uploaded file, keyed by the form field it was attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFile {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ClaimFile {
    /// Falls back to a type guessed from the file name when the part carried none.
    pub fn new(
        field: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        let filename = filename.into();
        let content_type = content_type
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        Self {
            field: field.into(),
            filename,
            content_type,
            bytes,
        }
    }
}

/// Claim report as received from the portal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSubmission {
    pub form_slug: String,
    pub policy_record_id: Option<String>,
    pub dni: Option<String>,
    pub plate: Option<String>,
    /// Answers keyed by destination column label.
    pub data: RecordFields,
    pub files: Vec<ClaimFile>,
}

impl ClaimSubmission {
    /// Routes one text part to its slot. Unknown parts become plain answers.
    pub fn apply_text(&mut self, name: &str, value: String) -> Result<(), ClaimError> {
        let value = value.trim().to_string();
        match name {
            SLUG_PART => self.form_slug = value,
            POLICY_PART => self.policy_record_id = non_empty(value),
            DNI_PART => self.dni = non_empty(value),
            PLATE_PART => self.plate = non_empty(value),
            DATA_PART if value.is_empty() => {}
            DATA_PART => {
                let parsed: Value = serde_json::from_str(&value)
                    .map_err(|err| ClaimError::InvalidPayload(format!("{DATA_PART}: {err}")))?;
                let Value::Object(answers) = parsed else {
                    return Err(ClaimError::InvalidPayload(format!(
                        "{DATA_PART} must be a JSON object"
                    )));
                };
                self.data.extend(answers);
            }
            other => {
                self.data.insert(other.to_string(), Value::String(value));
            }
        }
        Ok(())
    }

    pub fn ensure_complete(&self) -> Result<(), ClaimError> {
        if self.form_slug.is_empty() {
            return Err(ClaimError::MissingField(SLUG_PART));
        }
        Ok(())
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimReceipt {
    pub status: &'static str,
    pub id: String,
}

impl ClaimReceipt {
    pub fn created(id: impl Into<String>) -> Self {
        Self {
            status: "success",
            id: id.into(),
        }
    }
}

/// Uploaded links grouped by form field, rendered as attachment cell values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentSet {
    fields: BTreeMap<String, Vec<Value>>,
}

impl AttachmentSet {
    pub fn push(&mut self, field: &str, url: String, filename: &str) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(serde_json::json!({ "url": url, "filename": filename }));
    }

    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn merge_into(self, fields: &mut RecordFields) {
        for (field, attachments) in self.fields {
            fields.insert(field, Value::Array(attachments));
        }
    }
}
