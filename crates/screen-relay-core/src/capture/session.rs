use uuid::Uuid;

/// Where an encoder should read display pixels from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSource {
    /// Grab device name understood by the encoder (e.g. `x11grab`).
    pub input_format: String,
    /// Device-specific input (e.g. `:0.0` or `desktop`).
    pub input: String,
    /// Frames per second to grab.
    pub framerate: u32,
}

/// Handle to one acquired screen capture.
///
/// Not `Clone`: a session is handed back to its capturer exactly once via
/// [`ScreenCapturer::release`](crate::ScreenCapturer::release).
#[derive(Debug)]
pub struct CaptureSession {
    id: Uuid,
    source: CaptureSource,
}

impl CaptureSession {
    /// Create a session for an already-acquired source.
    pub fn new(source: CaptureSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
        }
    }

    /// Unique id of this capture.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The display source being captured.
    pub fn source(&self) -> &CaptureSource {
        &self.source
    }
}
