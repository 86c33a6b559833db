//! Cloudinary upload client.
//!
//! Uses a signed upload: the signature is the SHA-256 hex digest of the signed
//! parameters (alphabetical, `&`-joined) followed by the API secret.

use super::ObjectStorage;
use crate::config::settings::CloudinaryCredentials;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{info, instrument};

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Storage implementation backed by Cloudinary.
#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    base_url: String,
    folder: String,
    credentials: CloudinaryCredentials,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryClient {
    /// Builds a client that uploads into `folder`.
    pub fn new(base_url: &str, folder: &str, credentials: CloudinaryCredentials) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            folder: folder.to_string(),
            credentials,
        })
    }

    fn upload_url(&self) -> String {
        // `auto` lets the provider detect image, video or raw files
        format!(
            "{}/v1_1/{}/auto/upload",
            self.base_url, self.credentials.cloud_name
        )
    }
}

/// Signature over the signed upload parameters.
#[must_use]
pub fn upload_signature(folder: &str, timestamp: i64, api_secret: &str) -> String {
    let to_sign = format!("folder={folder}&timestamp={timestamp}{api_secret}");
    hex::encode(Sha256::digest(to_sign.as_bytes()))
}

#[async_trait]
impl ObjectStorage for CloudinaryClient {
    #[instrument(skip(self, data_uri), fields(len = data_uri.len()))]
    async fn upload(&self, data_uri: &str) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = upload_signature(&self.folder, timestamp, &self.credentials.api_secret);
        let timestamp = timestamp.to_string();

        let params = [
            ("file", data_uri),
            ("folder", self.folder.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.credentials.api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .http
            .post(self.upload_url())
            .form(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage {
                message: format!("upload failed with {status}: {body}"),
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        info!(url = %uploaded.secure_url, "Stored upload");
        Ok(uploaded.secure_url)
    }
}
