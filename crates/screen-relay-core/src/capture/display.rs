use crate::{CaptureError, CaptureSession, CaptureSource, CoreResult, ScreenCapturer};

use std::{panic::Location, path::PathBuf, sync::Mutex};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Frames per second grabbed when none is configured.
pub const DEFAULT_FRAMERATE: u32 = 30;

/// Settings for grabbing the display through ffmpeg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOptions {
    /// ffmpeg executable to invoke.
    pub ffmpeg_path: PathBuf,
    /// Grab device override (e.g. `x11grab`, `avfoundation`, `gdigrab`).
    pub input_format: Option<String>,
    /// Grab input override (e.g. `:1.0`).
    pub input: Option<String>,
    /// Frames per second to grab.
    pub framerate: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            input_format: None,
            input: None,
            framerate: DEFAULT_FRAMERATE,
        }
    }
}

/// Screen capturer backed by ffmpeg's platform grab devices.
///
/// Acquiring resolves which display to grab and reserves it; the pixels are
/// pulled by the encoder process that consumes the [`CaptureSession`]. Only
/// one session may be held at a time.
pub struct DisplayCapturer {
    options: CaptureOptions,
    active: Mutex<Option<Uuid>>,
}

impl DisplayCapturer {
    /// Create a capturer with the given options.
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            options,
            active: Mutex::new(None),
        }
    }

    #[track_caller]
    fn resolve_source(&self) -> CoreResult<CaptureSource> {
        if let (Some(input_format), Some(input)) = (&self.options.input_format, &self.options.input)
        {
            return Ok(CaptureSource {
                input_format: input_format.clone(),
                input: input.clone(),
                framerate: self.options.framerate,
            });
        }

        let display = std::env::var("DISPLAY").ok();
        let wayland = std::env::var("WAYLAND_DISPLAY").ok();

        let mut source = platform_source(
            std::env::consts::OS,
            display.as_deref(),
            wayland.as_deref(),
            self.options.framerate,
        )?;

        if let Some(input_format) = &self.options.input_format {
            source.input_format = input_format.clone();
        }
        if let Some(input) = &self.options.input {
            source.input = input.clone();
        }

        Ok(source)
    }

    /// Check that ffmpeg runs. Errors carry the caller's location.
    #[track_caller]
    pub(crate) fn ensure_ffmpeg(&self) -> impl Future<Output = CoreResult<()>> + Send + '_ {
        let location = ErrorLocation::from(Location::caller());

        async move {
            let output = tokio::process::Command::new(&self.options.ffmpeg_path)
                .arg("-version")
                .output()
                .await
                .map_err(|e| CaptureError::CaptureUnavailable {
                    reason: format!(
                        "ffmpeg not found at {:?}: {}",
                        self.options.ffmpeg_path, e
                    ),
                    location,
                })?;

            if !output.status.success() {
                return Err(CaptureError::CaptureUnavailable {
                    reason: format!("ffmpeg -version exited with {}", output.status),
                    location,
                });
            }

            Ok(())
        }
    }
}

#[async_trait]
impl ScreenCapturer for DisplayCapturer {
    #[instrument(skip(self))]
    async fn acquire(&self) -> CoreResult<CaptureSession> {
        {
            let active = self.active.lock().unwrap_or_else(|e| {
                error!("Capture slot lock poisoned, recovering: {}", e);
                e.into_inner()
            });
            if let Some(id) = *active {
                warn!(capture_id = %id, "Display already captured");
                return Err(CaptureError::CaptureInProgress {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        self.ensure_ffmpeg().await?;
        let source = self.resolve_source()?;
        let session = CaptureSession::new(source);

        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.is_some() {
            return Err(CaptureError::CaptureInProgress {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        *active = Some(session.id());

        info!(
            capture_id = %session.id(),
            input_format = %session.source().input_format,
            input = %session.source().input,
            framerate = session.source().framerate,
            "Display capture acquired"
        );

        Ok(session)
    }

    #[instrument(skip(self, session), fields(capture_id = %session.id()))]
    async fn release(&self, session: CaptureSession) -> CoreResult<()> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());

        match *active {
            Some(id) if id == session.id() => {
                *active = None;
                info!("Display capture released");
            }
            Some(id) => {
                warn!(held_by = %id, "Release for a capture that is not the active one");
            }
            None => {
                debug!("Release for a capture that was already released");
            }
        }

        Ok(())
    }
}

/// Pick the default ffmpeg grab device for a platform.
///
/// Linux needs an X11 display; a pure Wayland session refuses `x11grab`, so
/// it is reported as a permission failure rather than a missing source.
#[track_caller]
pub(crate) fn platform_source(
    os: &str,
    display: Option<&str>,
    wayland: Option<&str>,
    framerate: u32,
) -> CoreResult<CaptureSource> {
    let (input_format, input) = match os {
        "linux" | "freebsd" | "openbsd" | "netbsd" => match (display, wayland) {
            (Some(display), _) if !display.is_empty() => ("x11grab", display.to_string()),
            (_, Some(wayland)) if !wayland.is_empty() => {
                return Err(CaptureError::PermissionDenied {
                    reason: format!(
                        "Wayland session {} cannot be grabbed with x11grab; \
                         set capture.input_format and capture.input",
                        wayland
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            _ => {
                return Err(CaptureError::NoSourceSelected {
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        },
        "macos" => ("avfoundation", "Capture screen 0:none".to_string()),
        "windows" => ("gdigrab", "desktop".to_string()),
        _ => {
            return Err(CaptureError::NoSourceSelected {
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    Ok(CaptureSource {
        input_format: input_format.to_string(),
        input,
        framerate,
    })
}
