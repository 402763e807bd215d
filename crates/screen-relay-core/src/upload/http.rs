use crate::{CaptureError, CoreResult, Uploader};

use std::{panic::Location, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Path the upload is POSTed to, relative to the base URL.
pub const DEFAULT_UPLOAD_ENDPOINT: &str = "/api/cloudinary";

/// Longest slice of an error body kept in `ServerError`.
const MAX_ERROR_BODY_CHARS: usize = 256;

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: String,
}

/// Uploads recordings as `{"data": "<data url>"}` JSON over HTTP.
///
/// No retries and, unless configured, no timeout.
pub struct HttpUploader {
    client: Client,
    url: Url,
}

impl HttpUploader {
    /// Build an uploader posting to `endpoint` resolved against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEndpoint` if the URL does not parse, or
    /// `NetworkError` if the HTTP client cannot be built.
    #[track_caller]
    #[instrument]
    pub fn new(base_url: &str, endpoint: &str, timeout: Option<Duration>) -> CoreResult<Self> {
        let base = Url::parse(base_url).map_err(|e| CaptureError::InvalidEndpoint {
            reason: format!("Invalid base URL {:?}: {}", base_url, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let url = base.join(endpoint).map_err(|e| CaptureError::InvalidEndpoint {
            reason: format!("Invalid endpoint {:?}: {}", endpoint, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| CaptureError::NetworkError {
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(url = %url, timeout = ?timeout, "HttpUploader initialized");

        Ok(Self { client, url })
    }

    /// Fully resolved upload URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    #[instrument(skip(self, payload), fields(url = %self.url, payload_len = payload.len()))]
    async fn upload(&self, payload: &str) -> CoreResult<String> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&UploadRequest { data: payload })
            .send()
            .await
            .map_err(|e| CaptureError::NetworkError {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), "Upload rejected by server");
            return Err(CaptureError::ServerError {
                status: status.as_u16(),
                body,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let parsed: UploadResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                CaptureError::MalformedResponse {
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                }
            } else {
                CaptureError::NetworkError {
                    source: e,
                    location: ErrorLocation::from(Location::caller()),
                }
            }
        })?;

        if parsed.data.trim().is_empty() {
            return Err(CaptureError::MalformedResponse {
                reason: "response carried an empty URL".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!(hosted_url = %parsed.data, "Upload accepted");

        Ok(parsed.data)
    }
}
