//! ffmpeg-backed video encoder.
//!
//! One ffmpeg process per recording grabs the display described by the
//! [`CaptureSession`] and writes a WebM stream to stdout, which is forwarded
//! as [`EncoderEvent::Chunk`]s.

use crate::{
    CaptureError, CaptureSession, CoreResult,
    media::{EncoderEvent, EncodingSession, EventSender, VideoEncoder},
};

use std::{
    collections::HashSet,
    panic::Location,
    path::PathBuf,
    process::{Command as StdCommand, Stdio},
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    process::{Child, ChildStdin, ChildStdout, Command},
};
use tracing::{debug, error, info, instrument, warn};

/// Bytes read from ffmpeg's stdout per chunk.
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// How long ffmpeg gets to finalize the container after `q`.
const STOP_GRACE: Duration = Duration::from_secs(10);

/// Encoder that shells out to ffmpeg.
pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
    available: HashSet<String>,
}

impl FfmpegEncoder {
    /// Ask ffmpeg which encoders it was built with.
    ///
    /// # Errors
    ///
    /// Returns `CaptureUnavailable` if ffmpeg cannot be run.
    #[track_caller]
    #[instrument(skip(ffmpeg_path))]
    pub fn probe(ffmpeg_path: impl Into<PathBuf>) -> CoreResult<Self> {
        let ffmpeg_path = ffmpeg_path.into();

        let output = StdCommand::new(&ffmpeg_path)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| CaptureError::CaptureUnavailable {
                reason: format!("Failed to run {:?}: {}", ffmpeg_path, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        if !output.status.success() {
            return Err(CaptureError::CaptureUnavailable {
                reason: format!("ffmpeg -encoders exited with {}", output.status),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let available = parse_encoder_list(&String::from_utf8_lossy(&output.stdout));

        info!(
            ffmpeg_path = ?ffmpeg_path,
            encoder_count = available.len(),
            vp9 = available.contains("libvpx-vp9"),
            vp8 = available.contains("libvpx"),
            "ffmpeg encoders probed"
        );

        Ok(Self {
            ffmpeg_path,
            available,
        })
    }

    /// Build an encoder with a known encoder list, skipping the probe.
    pub fn with_encoders<'a>(
        ffmpeg_path: impl Into<PathBuf>,
        encoders: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            available: encoders.into_iter().map(str::to_string).collect(),
        }
    }

    fn arguments(session: &CaptureSession, codec: &str) -> Vec<String> {
        let source = session.source();
        let framerate = source.framerate.to_string();

        [
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            source.input_format.as_str(),
            "-framerate",
            framerate.as_str(),
            "-i",
            source.input.as_str(),
            "-an",
            "-c:v",
            codec,
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-pix_fmt",
            "yuv420p",
            "-f",
            "webm",
            "pipe:1",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        codec_for_mime(mime_type).is_some_and(|codec| self.available.contains(codec))
    }

    #[instrument(skip(self, session, events), fields(capture_id = %session.id()))]
    async fn begin(
        &self,
        session: &CaptureSession,
        mime_type: &str,
        events: EventSender,
    ) -> CoreResult<Box<dyn EncodingSession>> {
        let codec = codec_for_mime(mime_type).ok_or(CaptureError::NoEncoderAvailable {
            location: ErrorLocation::from(Location::caller()),
        })?;

        let mut child = Command::new(&self.ffmpeg_path)
            .args(Self::arguments(session, codec))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::EncoderFailed {
                reason: format!("Failed to start ffmpeg: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let stdout = child.stdout.take().ok_or(CaptureError::EncoderFailed {
            reason: "ffmpeg stdout was not captured".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!(target: "ffmpeg", "{}", line);
                }
            });
        }

        tokio::spawn(forward_chunks(stdout, events));

        let stdin = child.stdin.take();

        info!(codec, pid = ?child.id(), "ffmpeg encoder started");

        Ok(Box::new(FfmpegSession { child, stdin }))
    }
}

/// Pump stdout into chunk events, then signal the stop.
async fn forward_chunks(mut stdout: ChildStdout, events: EventSender) {
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut total = 0usize;

    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                if events.send(EncoderEvent::Chunk(buf[..n].to_vec())).is_err() {
                    debug!("Chunk receiver dropped, discarding remaining output");
                    break;
                }
            }
            Err(e) => {
                error!(error = ?e, "Failed to read ffmpeg output");
                break;
            }
        }
    }

    debug!(byte_len = total, "ffmpeg output drained");
    let _ = events.send(EncoderEvent::Stopped);
}

struct FfmpegSession {
    child: Child,
    stdin: Option<ChildStdin>,
}

#[async_trait]
impl EncodingSession for FfmpegSession {
    #[instrument(skip(self))]
    async fn finish(&mut self) -> CoreResult<()> {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!(%status, "ffmpeg already exited");
            return Ok(());
        }

        // `q` on stdin makes ffmpeg finalize the container before exiting.
        let graceful = match self.stdin.take() {
            Some(mut stdin) => match stdin.write_all(b"q").await {
                Ok(()) => stdin.flush().await,
                Err(e) => Err(e),
            },
            None => Err(std::io::Error::other("stdin already closed")),
        };

        if let Err(e) = graceful {
            warn!(error = ?e, "Graceful ffmpeg stop failed, killing");
            self.kill()?;
        }

        match tokio::time::timeout(STOP_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(%status, "ffmpeg encoder exited");
                Ok(())
            }
            Ok(Err(e)) => Err(CaptureError::EncoderFailed {
                reason: format!("Failed to wait for ffmpeg: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(_) => {
                warn!(
                    grace_secs = STOP_GRACE.as_secs(),
                    "ffmpeg did not exit in time, killing"
                );
                self.kill()?;
                let _ = self.child.wait().await;
                Ok(())
            }
        }
    }
}

impl FfmpegSession {
    #[track_caller]
    fn kill(&mut self) -> CoreResult<()> {
        self.child.start_kill().map_err(|e| CaptureError::EncoderFailed {
            reason: format!("Failed to kill ffmpeg: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Map a recording media type onto the ffmpeg encoder that produces it.
pub(crate) fn codec_for_mime(mime_type: &str) -> Option<&'static str> {
    let normalized: String = mime_type
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.as_str() {
        "video/webm;codecs=vp9" | "video/webm;codecs=\"vp9\"" => Some("libvpx-vp9"),
        "video/webm;codecs=vp8" | "video/webm;codecs=\"vp8\"" | "video/webm" => Some("libvpx"),
        _ => None,
    }
}

/// Collect video encoder names from `ffmpeg -encoders` output.
///
/// Entries follow a ` ------` separator line and look like
/// ` V....D libvpx-vp9   libvpx VP9 (codec vp9)`.
pub(crate) fn parse_encoder_list(listing: &str) -> HashSet<String> {
    listing
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let flags = fields.next()?;
            let name = fields.next()?;
            flags.starts_with('V').then(|| name.to_string())
        })
        .collect()
}
