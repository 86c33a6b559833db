//! Object storage seam used by the upload endpoint.

/// HTTP client for the Cloudinary upload API
pub mod cloudinary;

use crate::errors::Result;
use async_trait::async_trait;

/// Stores files and returns their public URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads a `data:` URI and returns the HTTPS URL it is served from.
    async fn upload(&self, data_uri: &str) -> Result<String>;
}
