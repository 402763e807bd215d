use crate::{
    CaptureError, CaptureSession, CoreResult,
    media::{EncodingSession, EventSender, VideoEncoder},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{info, instrument};

/// Lifecycle of a [`MediaRecorder`]. There is no way back from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Created, not yet started.
    Idle,
    /// Encoding and emitting chunks.
    Recording,
    /// Finished; a new recording needs a new recorder.
    Stopped,
}

impl RecorderState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
        }
    }
}

/// Single-use recorder wrapping a [`VideoEncoder`].
pub struct MediaRecorder {
    encoder: Arc<dyn VideoEncoder>,
    mime_type: &'static str,
    state: RecorderState,
    session: Option<Box<dyn EncodingSession>>,
}

impl MediaRecorder {
    /// Create an idle recorder that will encode as `mime_type`.
    pub fn new(encoder: Arc<dyn VideoEncoder>, mime_type: &'static str) -> Self {
        Self {
            encoder,
            mime_type,
            state: RecorderState::Idle,
            session: None,
        }
    }

    /// Media type this recorder was constructed with.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Idle → Recording. Chunks start flowing into `events`.
    #[instrument(skip(self, capture, events), fields(capture_id = %capture.id()))]
    pub async fn start(&mut self, capture: &CaptureSession, events: EventSender) -> CoreResult<()> {
        if self.state != RecorderState::Idle {
            return Err(CaptureError::InvalidTransition {
                from: self.state.name(),
                action: "start",
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let session = self.encoder.begin(capture, self.mime_type, events).await?;
        self.session = Some(session);
        self.state = RecorderState::Recording;

        info!(mime_type = self.mime_type, "Recorder started");

        Ok(())
    }

    /// Recording → Stopped. The encoder emits its final chunks and then the
    /// stop signal.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> CoreResult<()> {
        if self.state != RecorderState::Recording {
            return Err(CaptureError::InvalidTransition {
                from: self.state.name(),
                action: "stop",
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.state = RecorderState::Stopped;

        match self.session.take() {
            Some(mut session) => session.finish().await?,
            None => {
                return Err(CaptureError::EncoderFailed {
                    reason: "recording without an encoding session".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        info!("Recorder stopped");

        Ok(())
    }
}
