use crate::{CaptureSession, CoreResult};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Signals delivered by an encoder while it records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    /// One incremental fragment of encoded video.
    Chunk(Vec<u8>),
    /// The encoder has flushed everything it will ever emit.
    Stopped,
}

/// Channel an encoder pushes its [`EncoderEvent`]s into.
pub type EventSender = mpsc::UnboundedSender<EncoderEvent>;

/// Platform facility that encodes a live capture into compressed video.
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    /// Whether this encoder can produce the given media type.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Start encoding `session` as `mime_type`.
    ///
    /// Chunks are sent on `events` as they are produced. Exactly one
    /// [`EncoderEvent::Stopped`] is sent once encoding ends, whether it was
    /// asked to via [`EncodingSession::finish`] or the source went away.
    async fn begin(
        &self,
        session: &CaptureSession,
        mime_type: &str,
        events: EventSender,
    ) -> CoreResult<Box<dyn EncodingSession>>;
}

/// A running encode started by [`VideoEncoder::begin`].
#[async_trait]
pub trait EncodingSession: Send {
    /// Ask the encoder to stop. The `Stopped` event follows the last chunk.
    async fn finish(&mut self) -> CoreResult<()>;
}
