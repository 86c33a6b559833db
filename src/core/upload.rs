//! File upload preparation.

use crate::{
    errors::{Error, Result},
    storage::ObjectStorage,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, info, instrument};

const PDF_PREFIX: &str = "data:application/pdf";
// The storage provider refuses to deliver PDFs, plain text is served as-is.
const PDF_SUBSTITUTE_PREFIX: &str = "data:text/plain";

fn invalid(message: &str) -> Error {
    Error::Validation {
        message: message.to_string(),
    }
}

/// Checks that `data_uri` is a base64 `data:` URI and applies the PDF MIME substitution.
pub fn prepare_upload(data_uri: &str) -> Result<String> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| invalid("image must be a data: URI"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid("image must be base64 encoded"))?;
    if mime.is_empty() || payload.is_empty() {
        return Err(invalid("image is empty"));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| invalid(&format!("image is not valid base64: {e}")))?;

    match data_uri.strip_prefix(PDF_PREFIX) {
        Some(tail) => {
            debug!("Rewriting PDF upload as text/plain");
            Ok(format!("{PDF_SUBSTITUTE_PREFIX}{tail}"))
        }
        None => Ok(data_uri.to_string()),
    }
}

/// Validates and stores a file, returning its public URL.
#[instrument(skip_all)]
pub async fn upload_file(storage: &dyn ObjectStorage, data_uri: &str) -> Result<String> {
    let prepared = prepare_upload(data_uri)?;
    let url = storage.upload(&prepared).await?;
    info!(%url, "File uploaded");
    Ok(url)
}
