use crate::{AppCommand, AppResult};

use std::{sync::Arc, time::Duration};

use screen_relay_core::{CaptureError, CaptureUploadFlow, FlowStatus};
use tokio::{
    sync::{mpsc, watch},
    task::JoinSet,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Longest wait for in-flight uploads once shutdown is requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Main application state.
///
/// Applies record commands to the capture flow. Stops run as background
/// tasks because they last until the upload finishes.
pub struct App {
    flow: Arc<CaptureUploadFlow>,
    command_rx: mpsc::Receiver<AppCommand>,
    shutdown_tx: watch::Sender<bool>,
    stops: JoinSet<()>,
}

impl App {
    /// Create the application around a flow and its command channel.
    pub fn new(
        flow: Arc<CaptureUploadFlow>,
        command_rx: mpsc::Receiver<AppCommand>,
        shutdown_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            flow,
            command_rx,
            shutdown_tx,
            stops: JoinSet::new(),
        }
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Screen-Relay starting");

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::StartRecording { session_id } => {
                            self.start_recording(session_id).await;
                        }
                        AppCommand::StopRecording { session_id } => {
                            self.stop_and_upload(session_id);
                        }
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                Some(joined) = self.stops.join_next(), if !self.stops.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = ?e, "Stop task panicked");
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        // A recording still running at shutdown is stopped and uploaded
        // rather than thrown away.
        if let FlowStatus::Recording { session_id, .. } = self.flow.view().status {
            self.stop_and_upload(session_id);
        }

        self.drain_stops().await;

        let _ = self.shutdown_tx.send(true);
        info!("Screen-Relay shut down successfully");

        Ok(())
    }

    /// Capture the screen and begin recording.
    #[instrument(skip(self))]
    async fn start_recording(&self, session_id: Uuid) {
        match self.flow.start_session(session_id).await {
            Ok(()) => {}
            Err(e @ CaptureError::CaptureInProgress { .. }) => {
                warn!(session_id = %session_id, error = %e, "Start ignored, recording already running");
            }
            Err(e) => {
                error!(session_id = %session_id, error = ?e, "Failed to start recording");
            }
        }
    }

    /// Stop the recording and upload it in the background.
    ///
    /// Only `session_id` is stopped; a stop that arrives after that
    /// recording has already ended leaves any newer recording running.
    #[instrument(skip(self))]
    fn stop_and_upload(&mut self, session_id: Uuid) {
        let flow = Arc::clone(&self.flow);

        self.stops.spawn(async move {
            match flow.stop_session(session_id).await {
                Ok(uploaded) => info!(
                    session_id = %uploaded.session_id,
                    hosted_url = %uploaded.url,
                    byte_len = uploaded.byte_len,
                    "Recording hosted"
                ),
                Err(e @ CaptureError::NotRecording { .. }) => {
                    warn!(session_id = %session_id, error = %e, "Stop ignored, session not recording");
                }
                Err(e) => {
                    error!(session_id = %session_id, error = ?e, "Failed to stop and upload")
                }
            }
        });
    }

    async fn drain_stops(&mut self) {
        if self.stops.is_empty() {
            return;
        }

        info!(pending = self.stops.len(), "Waiting for uploads to finish");

        let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
            while let Some(joined) = self.stops.join_next().await {
                if let Err(e) = joined {
                    error!(error = ?e, "Stop task panicked");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Uploads did not finish within shutdown grace, abandoning");
            self.stops.abort_all();
        }
    }
}
