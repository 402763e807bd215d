use crate::{CaptureError, CoreResult};

use std::panic::Location;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// In-memory, append-only list of encoded chunks for one recording.
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    chunks: Vec<Vec<u8>>,
    total_len: usize,
}

impl ChunkAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk after all previously pushed chunks.
    pub fn push(&mut self, chunk: Vec<u8>) {
        self.total_len += chunk.len();
        self.chunks.push(chunk);
    }

    /// Number of chunks received so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Sum of all chunk lengths in bytes.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Concatenate every chunk, in arrival order, into one blob.
    pub fn into_blob(self, mime_type: &str) -> VideoBlob {
        let mut bytes = Vec::with_capacity(self.total_len);
        for chunk in self.chunks {
            bytes.extend_from_slice(&chunk);
        }

        VideoBlob {
            mime_type: mime_type.to_string(),
            bytes,
        }
    }
}

/// Immutable, typed recording assembled from all of its chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoBlob {
    mime_type: String,
    bytes: Vec<u8>,
}

impl VideoBlob {
    /// Wrap already-assembled bytes.
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Media type the blob is tagged with.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw encoded video.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a recording that produced no data.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Read a blob into a `data:<mime>;base64,<payload>` URL.
///
/// Base64 over a multi-megabyte recording is CPU-bound, so the encode runs on
/// the blocking pool and the caller is suspended until it has finished.
#[instrument(skip(blob), fields(byte_len = blob.len()))]
pub async fn read_as_data_url(blob: VideoBlob) -> CoreResult<String> {
    let data_url = tokio::task::spawn_blocking(move || encode_data_url(&blob.mime_type, &blob.bytes))
        .await
        .map_err(|e| CaptureError::ReadError {
            reason: format!("Encoding task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    debug!(encoded_len = data_url.len(), "Recording read as data URL");

    Ok(data_url)
}

pub(crate) fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let mut data_url = format!("data:{};base64,", mime_type);
    BASE64.encode_string(bytes, &mut data_url);
    data_url
}
