use uuid::Uuid;

/// Commands sent from the record control to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Capture the screen and start a new recording.
    StartRecording {
        /// Unique session ID for this recording.
        session_id: Uuid,
    },
    /// Stop the current recording and upload it.
    StopRecording {
        /// Session ID of the recording to stop.
        session_id: Uuid,
    },
    /// Request application shutdown.
    Shutdown,
}
