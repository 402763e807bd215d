use error_location::ErrorLocation;
use thiserror::Error;

/// Capture, recording, and upload errors with source location tracking.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The user or the operating system refused screen capture.
    #[error("Screen capture permission denied: {reason} {location}")]
    PermissionDenied {
        /// Why capture was refused.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No display source could be selected for capture.
    #[error("No capture source selected {location}")]
    NoSourceSelected {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture backend itself is missing or unusable.
    #[error("Screen capture unavailable: {reason} {location}")]
    CaptureUnavailable {
        /// Description of what is missing.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recording (or its upload) is already in flight.
    #[error("A recording is already in progress {location}")]
    CaptureInProgress {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stop was requested with no active recording.
    #[error("No recording in progress {location}")]
    NotRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Neither the preferred nor the fallback media type is supported.
    #[error("No video encoder available {location}")]
    NoEncoderAvailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recorder asked to move between states it cannot move between.
    #[error("Invalid recorder transition from {from} on {action} {location}")]
    InvalidTransition {
        /// State the recorder was in.
        from: &'static str,
        /// Operation that was attempted.
        action: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder failed to start, run, or stop.
    #[error("Encoder error: {reason} {location}")]
    EncoderFailed {
        /// Description of the encoder failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recorded blob could not be read into its transport encoding.
    #[error("Failed to read recording: {reason} {location}")]
    ReadError {
        /// Description of the read failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The upload endpoint could not be built from its configuration.
    #[error("Invalid upload endpoint: {reason} {location}")]
    InvalidEndpoint {
        /// Why the endpoint was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The upload request never got a response.
    #[error("Upload network error: {source} {location}")]
    NetworkError {
        /// Underlying error from reqwest.
        #[source]
        source: reqwest::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The upload endpoint answered with a non-success status.
    #[error("Upload server error: {status} {body} {location}")]
    ServerError {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Leading part of the response body.
        body: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The upload endpoint answered with a body that has no hosted URL.
    #[error("Malformed upload response: {reason} {location}")]
    MalformedResponse {
        /// Description of what was wrong with the body.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The background recording pipeline ended abnormally.
    #[error("Recording pipeline failed: {reason} {location}")]
    PipelineFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CaptureError`].
pub type Result<T> = std::result::Result<T, CaptureError>;
