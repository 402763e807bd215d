//! Screen-relay Core Library
//!
//! Capture the screen, record it as WebM, and upload the recording to a media
//! host. Platform capture and encoding sit behind [`ScreenCapturer`] and
//! [`VideoEncoder`]; the upload sits behind [`Uploader`].
//!
//! # Example
//!
//! ```no_run
//! use screen_relay_core::{
//!     CaptureOptions, CaptureUploadFlow, CoreResult, DisplayCapturer, FfmpegEncoder,
//!     HttpUploader, DEFAULT_UPLOAD_ENDPOINT,
//! };
//!
//! use std::{sync::Arc, time::Duration};
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let options = CaptureOptions::default();
//!     let encoder = FfmpegEncoder::probe(&options.ffmpeg_path)?;
//!     let uploader = HttpUploader::new("http://localhost:3000", DEFAULT_UPLOAD_ENDPOINT, None)?;
//!
//!     let flow = CaptureUploadFlow::new(
//!         Arc::new(DisplayCapturer::new(options)),
//!         Arc::new(encoder),
//!         Arc::new(uploader),
//!     );
//!
//!     flow.start_recording().await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     let uploaded = flow.stop_recording().await?;
//!
//!     println!("Hosted at: {}", uploaded.url);
//!     Ok(())
//! }
//! ```

mod capture;
mod error;
mod flow;
mod media;
mod upload;

pub use {
    capture::{
        CaptureOptions, CaptureSession, CaptureSource, DEFAULT_FRAMERATE, DisplayCapturer,
        ScreenCapturer,
    },
    error::{CaptureError, Result as CoreResult},
    flow::{CaptureUploadFlow, FlowStatus, UploadResult, ViewState},
    media::{
        BLOB_MIME_TYPE, ChunkAccumulator, EncoderEvent, EncodingSession, EventSender,
        FALLBACK_MIME_TYPE, FfmpegEncoder, MediaRecorder, PREFERRED_MIME_TYPE, RecorderState,
        VideoBlob, VideoEncoder, read_as_data_url, select_mime_type,
    },
    upload::{DEFAULT_UPLOAD_ENDPOINT, HttpUploader, Uploader},
};
