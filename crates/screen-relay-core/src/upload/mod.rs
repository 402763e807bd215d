mod http;

pub use http::{DEFAULT_UPLOAD_ENDPOINT, HttpUploader};

use crate::CoreResult;

use async_trait::async_trait;

/// Sends an encoded recording to the media host.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload `payload` (a data URL) and return the hosted video URL.
    async fn upload(&self, payload: &str) -> CoreResult<String>;
}
