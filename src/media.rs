// Media host adapter
//
// Product and category images live in Cloudinary; the rest of the
// application only sees the MediaStore trait so catalog flows can be
// exercised against a test double.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by the media host
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media host request failed: {0}")]
    Transport(String),

    #[error("media host rejected the upload: {0}")]
    Rejected(String),

    #[error("media store is not configured")]
    NotConfigured,
}

/// An asset stored at the media host. `public_id` is the host-side
/// identifier required to delete or replace the asset later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub public_id: String,
}

/// Upload/delete interface against the external media host.
///
/// `source` is a remote URL (or data URI) the host ingests itself; this
/// deployment uses the remote-ingestion contract rather than raw
/// multipart bytes.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, source: &str, folder: &str) -> Result<StoredImage, MediaError>;

    async fn delete(&self, public_id: &str) -> Result<(), MediaError>;
}

/// Cloudinary-backed MediaStore using the HTTP upload API
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    upload_preset: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryUploadResponse {
    secure_url: String,
    public_id: String,
}

impl CloudinaryStore {
    /// Build the store from CLOUDINARY_* environment variables. Missing
    /// variables leave the store unconfigured; uploads then fail with
    /// MediaError::NotConfigured instead of panicking at startup.
    pub fn from_env() -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
            api_key: std::env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
            api_secret: std::env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
            upload_preset: std::env::var("CLOUDINARY_UPLOAD_PRESET").unwrap_or_default(),
        }
    }

    fn ensure_configured(&self) -> Result<(), MediaError> {
        if self.cloud_name.is_empty() || self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(MediaError::NotConfigured);
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, source: &str, folder: &str) -> Result<StoredImage, MediaError> {
        self.ensure_configured()?;

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );

        let params = [
            ("file", source),
            ("upload_preset", self.upload_preset.as_str()),
            ("folder", folder),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Cloudinary upload failed: {} {}", status, body);
            return Err(MediaError::Rejected(format!("HTTP {}", status)));
        }

        let uploaded: CloudinaryUploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        tracing::debug!("Uploaded media asset {}", uploaded.public_id);
        Ok(StoredImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        self.ensure_configured()?;

        // Admin API destroy; basic auth avoids request signing
        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/resources/image/upload",
            self.cloud_name
        );

        let response = self
            .client
            .delete(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(&[("public_ids[]", public_id)])
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::Rejected(format!("HTTP {}", response.status())));
        }

        tracing::debug!("Deleted media asset {}", public_id);
        Ok(())
    }
}
