use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use super::domain::{
    AttachmentSet, ClaimReceipt, ClaimSubmission, DEFAULT_DESTINATION_TABLE,
    DESTINATION_TABLE_FIELD, FORM_SLUG_FIELD,
};
use super::uploader::AttachmentUploader;
use crate::records::{FindQuery, Formula, RecordGateway, RecordGatewayError, FORMS_TABLE};
use crate::workflows::digits_only;
use crate::workflows::policies::normalize_plate;

pub const POLICY_LINK_FIELD: &str = "POLIZA";
pub const DNI_FIELD: &str = "DNI";
pub const PLATE_FIELD: &str = "PATENTE";

#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    #[error("malformed claim payload: {0}")]
    InvalidPayload(String),
    #[error("missing claim field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    Store(#[from] RecordGatewayError),
}

/// Files a claim report: uploads its attachments, then creates the row in the table
/// configured for the form.
pub struct ClaimService {
    gateway: Arc<dyn RecordGateway>,
    uploader: Arc<dyn AttachmentUploader>,
}

impl ClaimService {
    pub fn new(gateway: Arc<dyn RecordGateway>, uploader: Arc<dyn AttachmentUploader>) -> Self {
        Self { gateway, uploader }
    }

    pub async fn submit(&self, submission: ClaimSubmission) -> Result<ClaimReceipt, ClaimError> {
        submission.ensure_complete()?;
        let ClaimSubmission {
            form_slug,
            policy_record_id,
            dni,
            plate,
            data: mut fields,
            files,
        } = submission;

        let table = self.destination_table(&form_slug).await;

        if let Some(policy) = policy_record_id {
            fields.insert(POLICY_LINK_FIELD.into(), json!([policy]));
        }
        if let Some(dni) = dni.map(|dni| digits_only(&dni)).filter(|dni| !dni.is_empty()) {
            fields.entry(DNI_FIELD).or_insert(Value::String(dni));
        }
        if let Some(plate) = plate.map(|plate| normalize_plate(&plate)) {
            fields.entry(PLATE_FIELD).or_insert(Value::String(plate));
        }

        let submitted = files.len();
        let mut attachments = AttachmentSet::default();
        for file in files {
            match self
                .uploader
                .upload(file.bytes, &file.filename, &file.content_type)
                .await
            {
                Ok(url) => attachments.push(&file.field, url, &file.filename),
                Err(error) => warn!(
                    field = %file.field,
                    filename = %file.filename,
                    %error,
                    "attachment skipped"
                ),
            }
        }
        let uploaded = attachments.len();
        attachments.merge_into(&mut fields);

        let record = self.gateway.create(&table, fields, true).await?;
        info!(
            form = %form_slug,
            %table,
            record = %record.id,
            submitted,
            uploaded,
            "claim report created"
        );

        Ok(ClaimReceipt::created(record.id))
    }

    /// Table named by the form's configuration row, or the default when the row is
    /// missing or unreadable.
    async fn destination_table(&self, form_slug: &str) -> String {
        let query = FindQuery::matching(Formula::text_eq(FORM_SLUG_FIELD, form_slug)).limit(1);
        match self.gateway.find(FORMS_TABLE, query).await {
            Ok(rows) => rows
                .first()
                .and_then(|row| row.text(DESTINATION_TABLE_FIELD))
                .map(|table| table.trim().to_string())
                .unwrap_or_else(|| DEFAULT_DESTINATION_TABLE.to_string()),
            Err(error) => {
                warn!(form = %form_slug, %error, "form configuration unreadable; using default table");
                DEFAULT_DESTINATION_TABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::InMemoryGateway;
    use crate::workflows::claims::domain::ClaimFile;
    use crate::workflows::claims::uploader::{UnconfiguredUploader, UploadError};
    use crate::workflows::test_support::{fields, record};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Accepts every file except those named `broken*`.
    #[derive(Debug, Default)]
    struct RecordingUploader {
        uploads: Mutex<Vec<(String, String, usize)>>,
    }

    #[async_trait]
    impl AttachmentUploader for RecordingUploader {
        async fn upload(
            &self,
            bytes: Vec<u8>,
            filename: &str,
            mime_type: &str,
        ) -> Result<String, UploadError> {
            if filename.starts_with("broken") {
                return Err(UploadError::Backend("quota exceeded".into()));
            }
            self.uploads.lock().expect("uploads mutex").push((
                filename.to_string(),
                mime_type.to_string(),
                bytes.len(),
            ));
            Ok(format!("https://drive.example/{filename}"))
        }
    }

    fn submission() -> ClaimSubmission {
        ClaimSubmission {
            form_slug: "choque".into(),
            policy_record_id: Some("recPol".into()),
            dni: Some("30.111.222".into()),
            plate: Some("ab 123 cd".into()),
            data: fields(serde_json::json!({ "FECHA": "2025-06-01" })),
            files: vec![
                ClaimFile::new("FOTOS", "frente.jpg", Some("image/jpeg"), vec![0; 4]),
                ClaimFile::new("FOTOS", "broken.jpg", Some("image/jpeg"), vec![0; 4]),
                ClaimFile::new("DENUNCIA", "denuncia.pdf", None, vec![0; 8]),
            ],
        }
    }

    fn gateway() -> Arc<InMemoryGateway> {
        Arc::new(InMemoryGateway::new().with_record(
            FORMS_TABLE,
            record(
                "recForm",
                serde_json::json!({ "Slug": "choque", "Tabla Destino": "SINIESTROS_CHOQUE" }),
            ),
        ))
    }

    #[tokio::test]
    async fn claim_lands_in_the_configured_table_with_surviving_uploads() {
        let gateway = gateway();
        let uploader = Arc::new(RecordingUploader::default());
        let service = ClaimService::new(gateway.clone(), uploader.clone());

        let receipt = service.submit(submission()).await.expect("claim created");
        assert_eq!(receipt.status, "success");

        let rows = gateway.records("SINIESTROS_CHOQUE");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, receipt.id);

        let stored = &rows[0].fields;
        assert_eq!(stored["FECHA"], json!("2025-06-01"));
        assert_eq!(stored["POLIZA"], json!(["recPol"]));
        assert_eq!(stored["DNI"], json!("30111222"));
        assert_eq!(stored["PATENTE"], json!("AB123CD"));
        assert_eq!(
            stored["FOTOS"],
            json!([{ "url": "https://drive.example/frente.jpg", "filename": "frente.jpg" }])
        );
        assert_eq!(stored["DENUNCIA"][0]["filename"], json!("denuncia.pdf"));

        let uploads = uploader.uploads.lock().expect("uploads mutex").clone();
        assert_eq!(
            uploads,
            vec![
                ("frente.jpg".to_string(), "image/jpeg".to_string(), 4),
                ("denuncia.pdf".to_string(), "application/pdf".to_string(), 8),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_form_uses_default_table() {
        let gateway = gateway();
        let service = ClaimService::new(gateway.clone(), Arc::new(RecordingUploader::default()));

        let mut claim = submission();
        claim.form_slug = "robo".into();
        claim.files.clear();
        service.submit(claim).await.expect("claim created");

        assert_eq!(gateway.records(DEFAULT_DESTINATION_TABLE).len(), 1);
    }

    #[tokio::test]
    async fn claims_are_filed_without_attachment_storage() {
        let gateway = gateway();
        gateway.mark_unavailable(FORMS_TABLE);
        let service = ClaimService::new(gateway.clone(), Arc::new(UnconfiguredUploader));

        service.submit(submission()).await.expect("claim created");

        let rows = gateway.records(DEFAULT_DESTINATION_TABLE);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].fields.get("FOTOS").is_none());
    }

    #[tokio::test]
    async fn answers_keep_precedence_over_identity_parts() {
        let gateway = gateway();
        let service = ClaimService::new(gateway.clone(), Arc::new(RecordingUploader::default()));

        let mut claim = submission();
        claim.data.insert("PATENTE".into(), json!("ZZZ999"));
        service.submit(claim).await.expect("claim created");

        assert_eq!(
            gateway.records("SINIESTROS_CHOQUE")[0].fields["PATENTE"],
            json!("ZZZ999")
        );
    }

    #[tokio::test]
    async fn missing_slug_is_rejected_before_any_call() {
        let gateway = gateway();
        let service = ClaimService::new(gateway.clone(), Arc::new(RecordingUploader::default()));

        let mut claim = submission();
        claim.form_slug.clear();
        let error = service.submit(claim).await.expect_err("rejected");
        assert!(matches!(error, ClaimError::MissingField("tipo_formulario")));
        assert!(gateway.records(DEFAULT_DESTINATION_TABLE).is_empty());
    }
}
