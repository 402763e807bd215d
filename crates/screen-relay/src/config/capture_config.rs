use crate::config::{default_ffmpeg_path, default_framerate};

use std::path::PathBuf;

use screen_relay_core::CaptureOptions;
use serde::{Deserialize, Serialize};

/// Screen capture and encoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// ffmpeg binary used for both grabbing and encoding.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    /// ffmpeg input device (`x11grab`, `avfoundation`, `gdigrab`, ...).
    /// None = chosen for the current platform.
    #[serde(default)]
    pub input_format: Option<String>,
    /// Input passed to the device (display name, screen index, `desktop`).
    /// None = chosen for the current platform.
    #[serde(default)]
    pub input: Option<String>,
    /// Capture frame rate.
    #[serde(default = "default_framerate")]
    pub framerate: u32,
}

impl CaptureConfig {
    /// Options for the display capturer and encoder probe.
    pub fn to_options(&self) -> CaptureOptions {
        CaptureOptions {
            ffmpeg_path: self.ffmpeg_path.clone(),
            input_format: self.input_format.clone(),
            input: self.input.clone(),
            framerate: self.framerate,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            input_format: None,
            input: None,
            framerate: default_framerate(),
        }
    }
}
