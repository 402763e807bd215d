use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

/// What the presentation layer shows.
///
/// `link` is only ever overwritten by a successful upload; failures land in
/// `last_error` and leave the previous link in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Hosted URL of the most recent successful upload.
    pub link: Option<String>,
    /// Where the capture pipeline currently is.
    pub status: FlowStatus,
    /// Message of the most recent failure, cleared by the next success.
    pub last_error: Option<String>,
}

/// Pipeline status for the record control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowStatus {
    /// Nothing in flight; pressing record starts a recording.
    #[default]
    Idle,
    /// Capturing and encoding.
    Recording {
        /// Unique session ID for log correlation.
        session_id: Uuid,
        /// When recording started.
        #[serde(skip)]
        started_at: Instant,
    },
    /// Stopped; the blob is being read and uploaded.
    Uploading {
        /// Session ID of the recording being uploaded.
        session_id: Uuid,
    },
}

impl FlowStatus {
    /// Session ID of the in-flight recording, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            Self::Idle => None,
            Self::Recording { session_id, .. } | Self::Uploading { session_id } => {
                Some(*session_id)
            }
        }
    }
}
