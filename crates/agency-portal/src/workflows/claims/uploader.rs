use std::io::Cursor;

use async_trait::async_trait;
use google_drive3::{api::File, api::Scope, hyper_rustls, hyper_util, yup_oauth2, DriveHub};
use tracing::{debug, info};

use crate::config::DriveConfig;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("attachment storage is not configured")]
    NotConfigured,
    #[error("drive credentials unusable: {0}")]
    Credentials(String),
    #[error("drive upload failed: {0}")]
    Backend(String),
    #[error("drive returned no shareable link for {0}")]
    MissingLink(String),
}

/// Stores one attachment and returns a link the claim record can point at.
#[async_trait]
pub trait AttachmentUploader: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, UploadError>;
}

/// Used when no Drive folder or credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredUploader;

#[async_trait]
impl AttachmentUploader for UnconfiguredUploader {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        _filename: &str,
        _mime_type: &str,
    ) -> Result<String, UploadError> {
        Err(UploadError::NotConfigured)
    }
}

pub type DriveConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;

/// Uploader over the HTTPS connector built by [`DriveUploader::connect`].
pub type DriveAttachmentUploader = DriveUploader<DriveConnector>;

/// Uploads into a single Drive folder through the generated google-drive3 client.
pub struct DriveUploader<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    hub: DriveHub<C>,
    folder_id: String,
}

impl<C> DriveUploader<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: DriveHub<C>, folder_id: impl Into<String>) -> Self {
        Self {
            hub,
            folder_id: folder_id.into(),
        }
    }

    fn map_error<E: std::fmt::Display>(err: E) -> UploadError {
        UploadError::Backend(err.to_string())
    }
}

impl DriveUploader<DriveConnector> {
    /// Authenticates with the service account from `GOOGLE_CREDENTIAL_JSON`, falling back
    /// to the key file.
    pub async fn connect(config: &DriveConfig) -> Result<Self, UploadError> {
        let folder_id = config.folder_id.clone().ok_or(UploadError::NotConfigured)?;
        let key = match &config.credentials_json {
            Some(json) => yup_oauth2::parse_service_account_key(json)
                .map_err(|err| UploadError::Credentials(err.to_string()))?,
            None => yup_oauth2::read_service_account_key(&config.credentials_file)
                .await
                .map_err(|err| {
                    UploadError::Credentials(format!(
                        "{}: {err}",
                        config.credentials_file.display()
                    ))
                })?,
        };

        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|err| UploadError::Credentials(err.to_string()))?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .map_err(|err| UploadError::Credentials(err.to_string()))?
            .https_only()
            .enable_http1()
            .build();
        let client =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build(connector);

        info!(folder = %folder_id, "drive uploader connected");
        Ok(Self::new(DriveHub::new(client, auth), folder_id))
    }
}

impl<C> std::fmt::Debug for DriveUploader<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveUploader")
            .field("folder_id", &self.folder_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<C> AttachmentUploader for DriveUploader<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, UploadError> {
        let metadata = File {
            name: Some(filename.to_string()),
            parents: Some(vec![self.folder_id.clone()]),
            ..File::default()
        };
        let mime = mime_type
            .parse::<mime::Mime>()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);
        let size = bytes.len();

        let (_, file) = self
            .hub
            .files()
            .create(metadata)
            .param("fields", "id,webViewLink")
            .supports_all_drives(true)
            .add_scope(Scope::File)
            .upload(Cursor::new(bytes), mime)
            .await
            .map_err(Self::map_error)?;

        debug!(file = ?file.id, size, "attachment uploaded");
        file.web_view_link
            .ok_or_else(|| UploadError::MissingLink(filename.to_string()))
    }
}
