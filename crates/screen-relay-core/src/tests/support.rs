//! Fake platform capabilities for driving the flow without a display,
//! an ffmpeg binary, or a media host.

use crate::{
    CaptureError, CaptureSession, CaptureSource, CoreResult, EncoderEvent, EncodingSession,
    EventSender, ScreenCapturer, Uploader, VideoEncoder,
};

use std::{
    collections::{HashSet, VecDeque},
    panic::Location,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use error_location::ErrorLocation;

pub(crate) fn fake_source() -> CaptureSource {
    CaptureSource {
        input_format: "lavfi".to_string(),
        input: "testsrc".to_string(),
        framerate: 30,
    }
}

#[derive(Default)]
pub(crate) struct FakeCapturer {
    refuse: bool,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl FakeCapturer {
    pub(crate) fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub(crate) fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub(crate) fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScreenCapturer for FakeCapturer {
    async fn acquire(&self) -> CoreResult<CaptureSession> {
        if self.refuse {
            return Err(CaptureError::PermissionDenied {
                reason: "user dismissed the picker".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(CaptureSession::new(fake_source()))
    }

    async fn release(&self, _session: CaptureSession) -> CoreResult<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Emits `chunks` as soon as it begins and `final_chunk` plus the stop
/// signal when finished. For the first `self_stops` recordings the stop
/// signal follows the chunks immediately, as if the capture source went away.
#[derive(Default)]
pub(crate) struct FakeEncoder {
    supported: HashSet<String>,
    chunks: Vec<Vec<u8>>,
    final_chunk: Option<Vec<u8>>,
    self_stops: AtomicUsize,
    begun_with: Mutex<Vec<String>>,
}

impl FakeEncoder {
    pub(crate) fn supporting(supported: &[&'static str]) -> Self {
        Self {
            supported: supported.iter().map(|mime| mime.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn with_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self
    }

    pub(crate) fn with_final_chunk(mut self, chunk: Vec<u8>) -> Self {
        self.final_chunk = Some(chunk);
        self
    }

    pub(crate) fn stopping_on_its_own(self) -> Self {
        self.stopping_on_its_own_times(usize::MAX)
    }

    pub(crate) fn stopping_on_its_own_times(mut self, times: usize) -> Self {
        self.self_stops = AtomicUsize::new(times);
        self
    }

    pub(crate) fn begun_with(&self) -> Vec<String> {
        self.begun_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl VideoEncoder for FakeEncoder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.contains(mime_type)
    }

    async fn begin(
        &self,
        _session: &CaptureSession,
        mime_type: &str,
        events: EventSender,
    ) -> CoreResult<Box<dyn EncodingSession>> {
        self.begun_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(mime_type.to_string());

        for chunk in &self.chunks {
            let _ = events.send(EncoderEvent::Chunk(chunk.clone()));
        }

        let stops_on_its_own = self
            .self_stops
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();

        if stops_on_its_own {
            let _ = events.send(EncoderEvent::Stopped);
            return Ok(Box::new(FakeSession {
                events: None,
                final_chunk: None,
            }));
        }

        Ok(Box::new(FakeSession {
            events: Some(events),
            final_chunk: self.final_chunk.clone(),
        }))
    }
}

struct FakeSession {
    events: Option<EventSender>,
    final_chunk: Option<Vec<u8>>,
}

#[async_trait]
impl EncodingSession for FakeSession {
    async fn finish(&mut self) -> CoreResult<()> {
        if let Some(events) = self.events.take() {
            if let Some(chunk) = self.final_chunk.take() {
                let _ = events.send(EncoderEvent::Chunk(chunk));
            }
            let _ = events.send(EncoderEvent::Stopped);
        }
        Ok(())
    }
}

/// Answers uploads from a queue: `Ok(url)` or `Err(status)`. Once the queue
/// is empty every upload fails with 503.
#[derive(Default)]
pub(crate) struct FakeUploader {
    responses: Mutex<VecDeque<Result<String, u16>>>,
    calls: AtomicUsize,
    payloads: Mutex<Vec<String>>,
}

impl FakeUploader {
    pub(crate) fn answering(responses: Vec<Result<String, u16>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn payloads(&self) -> Vec<String> {
        self.payloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Uploader for FakeUploader {
    async fn upload(&self, payload: &str) -> CoreResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload.to_string());

        let next = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(503));

        next.map_err(|status| CaptureError::ServerError {
            status,
            body: "upload refused".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Serve `router` on an ephemeral localhost port and return its base URL.
#[allow(clippy::unwrap_used)]
pub(crate) async fn serve_mock(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}
