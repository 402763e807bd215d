use crate::{
    CaptureError, CaptureSession, CoreResult, ScreenCapturer, Uploader,
    flow::{FlowStatus, ViewState},
    media::{
        BLOB_MIME_TYPE, ChunkAccumulator, EncoderEvent, MediaRecorder, VideoBlob, VideoEncoder,
        read_as_data_url, select_mime_type,
    },
};

use std::{panic::Location, sync::Arc, time::Instant};

use error_location::ErrorLocation;
use tokio::{
    sync::{Mutex, OwnedSemaphorePermit, Semaphore, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// A recording that has been hosted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Session the recording belonged to.
    pub session_id: Uuid,
    /// Hosted video URL returned by the upload endpoint.
    pub url: String,
    /// Number of encoded chunks that made up the recording.
    pub chunk_count: usize,
    /// Size of the assembled recording in bytes.
    pub byte_len: usize,
}

struct ActiveRecording {
    session_id: Uuid,
    recorder: MediaRecorder,
    pipeline: JoinHandle<CoreResult<UploadResult>>,
}

/// Shared handles the background pipeline needs after `start_recording`
/// has returned.
struct PipelineContext {
    capturer: Arc<dyn ScreenCapturer>,
    uploader: Arc<dyn Uploader>,
    view_tx: Arc<watch::Sender<ViewState>>,
}

/// Orchestrates capture → record → assemble → upload → publish.
///
/// # Concurrency
///
/// A single-permit gate is taken by `start_recording` and held by the
/// background pipeline until the upload has finished, so at most one
/// capture (and one upload) is ever in flight. A second start in that
/// window fails with `CaptureInProgress`.
///
/// # Ordering
///
/// Chunks are collected by the pipeline task until the encoder's `Stopped`
/// event. The blob is assembled and uploaded only after that event, so an
/// upload never sees a partial recording.
pub struct CaptureUploadFlow {
    capturer: Arc<dyn ScreenCapturer>,
    encoder: Arc<dyn VideoEncoder>,
    uploader: Arc<dyn Uploader>,
    gate: Arc<Semaphore>,
    active: Mutex<Option<ActiveRecording>>,
    view_tx: Arc<watch::Sender<ViewState>>,
}

impl CaptureUploadFlow {
    /// Wire the flow to its platform capabilities.
    pub fn new(
        capturer: Arc<dyn ScreenCapturer>,
        encoder: Arc<dyn VideoEncoder>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        let (view_tx, _) = watch::channel(ViewState::default());

        Self {
            capturer,
            encoder,
            uploader,
            gate: Arc::new(Semaphore::new(1)),
            active: Mutex::new(None),
            view_tx: Arc::new(view_tx),
        }
    }

    /// Subscribe to view state changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    /// Snapshot of the current view state.
    pub fn view(&self) -> ViewState {
        self.view_tx.borrow().clone()
    }

    /// Acquire the screen and start recording it.
    ///
    /// Returns the new session ID. Chunks accumulate in the background until
    /// [`stop_recording`](Self::stop_recording) is called or the encoder
    /// stops on its own; either way the recording is then uploaded.
    ///
    /// # Errors
    ///
    /// `CaptureInProgress` if a recording or its upload is still running;
    /// otherwise any capture, codec, or encoder error. Failures other than
    /// `CaptureInProgress` are also published as `last_error`.
    pub async fn start_recording(&self) -> CoreResult<Uuid> {
        let session_id = Uuid::new_v4();
        self.start_session(session_id).await?;
        Ok(session_id)
    }

    /// Like [`start_recording`](Self::start_recording), under a session ID
    /// chosen by the caller so its logs correlate with the flow's.
    ///
    /// # Errors
    ///
    /// Same as [`start_recording`](Self::start_recording).
    #[instrument(skip(self))]
    pub async fn start_session(&self, session_id: Uuid) -> CoreResult<()> {
        let permit = Arc::clone(&self.gate).try_acquire_owned().map_err(|_| {
            CaptureError::CaptureInProgress {
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        // Holding the permit means any earlier pipeline has finished. A
        // recording whose encoder stopped on its own is still parked here;
        // its result was already published, so it is discarded.
        if let Some(finished) = self.active.lock().await.take() {
            debug!(session_id = %finished.session_id, "Discarding finished recording");
        }

        match self.begin(session_id, permit).await {
            Ok(active) => {
                *self.active.lock().await = Some(active);
                info!(session_id = %session_id, "Recording started");
                Ok(())
            }
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to start recording");
                self.view_tx.send_modify(|view| {
                    view.status = FlowStatus::Idle;
                    view.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Stop the active recording and wait for its upload to finish.
    ///
    /// # Errors
    ///
    /// `NotRecording` if nothing was started; otherwise the error that ended
    /// the pipeline (read, network, or server failure). The view state has
    /// already been updated by the time this returns.
    #[instrument(skip(self))]
    pub async fn stop_recording(&self) -> CoreResult<UploadResult> {
        let active = self
            .active
            .lock()
            .await
            .take()
            .ok_or(CaptureError::NotRecording {
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.finish(active).await
    }

    /// Stop the recording running under `session_id` and wait for its upload.
    ///
    /// # Errors
    ///
    /// `NotRecording` if `session_id` is not the active recording (a later
    /// recording is left untouched); otherwise as
    /// [`stop_recording`](Self::stop_recording).
    #[instrument(skip(self))]
    pub async fn stop_session(&self, session_id: Uuid) -> CoreResult<UploadResult> {
        let active = {
            let mut slot = self.active.lock().await;
            match slot.as_ref() {
                Some(active) if active.session_id == session_id => slot.take(),
                _ => None,
            }
        }
        .ok_or(CaptureError::NotRecording {
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.finish(active).await
    }

    async fn finish(&self, active: ActiveRecording) -> CoreResult<UploadResult> {
        let ActiveRecording {
            session_id,
            mut recorder,
            pipeline,
        } = active;

        // A failed stop has already dropped the encoding session, which ends
        // the encoder and closes its event stream, so the pipeline still
        // finishes with whatever was captured.
        if let Err(e) = recorder.stop().await {
            warn!(session_id = %session_id, error = ?e, "Recorder did not stop cleanly");
        }
        drop(recorder);

        match pipeline.await {
            Ok(result) => result,
            Err(e) => {
                let err = CaptureError::PipelineFailed {
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                };
                error!(session_id = %session_id, error = ?err, "Recording pipeline ended abnormally");
                self.view_tx.send_modify(|view| {
                    view.status = FlowStatus::Idle;
                    view.last_error = Some(err.to_string());
                });
                Err(err)
            }
        }
    }

    async fn begin(
        &self,
        session_id: Uuid,
        permit: OwnedSemaphorePermit,
    ) -> CoreResult<ActiveRecording> {
        let capture = self.capturer.acquire().await?;

        let mime_type = match select_mime_type(self.encoder.as_ref()) {
            Ok(mime_type) => mime_type,
            Err(e) => {
                self.release_capture(session_id, capture).await;
                return Err(e);
            }
        };

        let mut recorder = MediaRecorder::new(Arc::clone(&self.encoder), mime_type);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        // Published before the pipeline exists so that a pipeline finishing
        // early can only ever move the status forward.
        self.view_tx.send_modify(|view| {
            view.status = FlowStatus::Recording {
                session_id,
                started_at: Instant::now(),
            };
        });

        if let Err(e) = recorder.start(&capture, events_tx).await {
            self.release_capture(session_id, capture).await;
            return Err(e);
        }

        let context = PipelineContext {
            capturer: Arc::clone(&self.capturer),
            uploader: Arc::clone(&self.uploader),
            view_tx: Arc::clone(&self.view_tx),
        };

        let pipeline = tokio::spawn(run_pipeline(
            context, session_id, capture, events_rx, permit,
        ));

        Ok(ActiveRecording {
            session_id,
            recorder,
            pipeline,
        })
    }

    async fn release_capture(&self, session_id: Uuid, capture: CaptureSession) {
        if let Err(e) = self.capturer.release(capture).await {
            warn!(session_id = %session_id, error = ?e, "Failed to release capture");
        }
    }
}

/// Collect chunks until the stop signal, then release, assemble, upload, and
/// publish. Holds the gate permit for its whole lifetime.
#[instrument(skip(context, capture, events, permit))]
async fn run_pipeline(
    context: PipelineContext,
    session_id: Uuid,
    capture: CaptureSession,
    mut events: mpsc::UnboundedReceiver<EncoderEvent>,
    permit: OwnedSemaphorePermit,
) -> CoreResult<UploadResult> {
    let mut accumulator = ChunkAccumulator::new();
    let mut stopped = false;

    while let Some(event) = events.recv().await {
        match event {
            EncoderEvent::Chunk(chunk) => accumulator.push(chunk),
            EncoderEvent::Stopped => {
                stopped = true;
                break;
            }
        }
    }
    drop(events);

    if !stopped {
        warn!("Encoder went away without a stop signal, uploading what arrived");
    }

    if let Err(e) = context.capturer.release(capture).await {
        warn!(error = ?e, "Failed to release capture");
    }

    let chunk_count = accumulator.chunk_count();
    let blob = accumulator.into_blob(BLOB_MIME_TYPE);
    let byte_len = blob.len();

    info!(chunk_count, byte_len, "Recording assembled");

    context
        .view_tx
        .send_modify(|view| view.status = FlowStatus::Uploading { session_id });

    let start = Instant::now();
    let result = upload_blob(context.uploader.as_ref(), blob)
        .await
        .map(|url| UploadResult {
            session_id,
            url,
            chunk_count,
            byte_len,
        });

    match &result {
        Ok(uploaded) => info!(
            hosted_url = %uploaded.url,
            duration_ms = start.elapsed().as_millis(),
            "Upload complete"
        ),
        Err(e) => error!(error = ?e, "Upload failed"),
    }

    context.view_tx.send_modify(|view| {
        match &result {
            Ok(uploaded) => {
                view.link = Some(uploaded.url.clone());
                view.last_error = None;
            }
            Err(e) => view.last_error = Some(e.to_string()),
        }
        view.status = FlowStatus::Idle;
    });

    // Released only after the view says Idle, so a rejected start is the
    // worst a racing press can see.
    drop(permit);

    result
}

async fn upload_blob(uploader: &dyn Uploader, blob: VideoBlob) -> CoreResult<String> {
    let payload = read_as_data_url(blob).await?;
    uploader.upload(&payload).await
}
