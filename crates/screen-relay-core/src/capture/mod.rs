pub(crate) mod display;
mod session;

pub use {
    display::{CaptureOptions, DEFAULT_FRAMERATE, DisplayCapturer},
    session::{CaptureSession, CaptureSource},
};

use crate::CoreResult;

use async_trait::async_trait;

/// Platform facility that grants a video stream of the screen.
#[async_trait]
pub trait ScreenCapturer: Send + Sync {
    /// Acquire a display capture. Video only, no audio.
    ///
    /// # Errors
    ///
    /// `PermissionDenied` or `NoSourceSelected` when the platform refuses or
    /// no display can be chosen.
    async fn acquire(&self) -> CoreResult<CaptureSession>;

    /// Release a capture previously returned by [`acquire`](Self::acquire).
    async fn release(&self, session: CaptureSession) -> CoreResult<()>;
}
