//! Image upload client with inline fallback.
//!
//! Uploads go to the configured endpoint as multipart form data. When the
//! endpoint is unreachable or rejects the file, the bytes are embedded as
//! a base64 `data:` URL instead — an upload failure never blocks the
//! edit.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::EngineResult;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

/// Client for the upload side-channel.
pub struct UploadService {
    client: reqwest::Client,
    endpoint: String,
}

impl UploadService {
    /// Create a client posting to `endpoint`.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Upload a file and return a URL for it.
    ///
    /// Falls back to an inline `data:` URL on any failure.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> String {
        match self.try_upload(filename, bytes.clone()).await {
            Ok(url) => {
                debug!(filename = %filename, url = %url, "file uploaded");
                url
            }
            Err(e) => {
                warn!(filename = %filename, error = %e, "upload failed; embedding file inline");
                inline_data_url(&bytes)
            }
        }
    }

    async fn try_upload(&self, filename: &str, bytes: Vec<u8>) -> EngineResult<String> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response: UploadResponse = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.url)
    }
}

/// Encode bytes as a `data:` URL, sniffing the mime type from the
/// content.
pub fn inline_data_url(bytes: &[u8]) -> String {
    let mime = infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}
