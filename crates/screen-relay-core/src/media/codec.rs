use crate::{CaptureError, CoreResult, VideoEncoder};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, warn};

/// Media type asked for first: WebM with VP9.
pub const PREFERRED_MIME_TYPE: &str = "video/webm; codecs=vp9";

/// Container-only media type used when VP9 is unavailable.
pub const FALLBACK_MIME_TYPE: &str = "video/webm";

/// Media type the assembled recording is tagged with.
pub const BLOB_MIME_TYPE: &str = "video/webm";

/// Pick the first media type the encoder supports.
///
/// # Errors
///
/// Returns `NoEncoderAvailable` if neither the preferred nor the fallback
/// type is supported.
#[track_caller]
pub fn select_mime_type(encoder: &dyn VideoEncoder) -> CoreResult<&'static str> {
    for mime_type in [PREFERRED_MIME_TYPE, FALLBACK_MIME_TYPE] {
        if encoder.is_type_supported(mime_type) {
            debug!(mime_type, "Selected recording media type");
            return Ok(mime_type);
        }
    }

    warn!("Encoder supports neither VP9 nor plain WebM");

    Err(CaptureError::NoEncoderAvailable {
        location: ErrorLocation::from(Location::caller()),
    })
}
