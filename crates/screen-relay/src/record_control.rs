//! The record button's toggle.
//!
//! Each press is turned into an `AppCommand` based on where the capture
//! pipeline currently is: idle starts a recording, recording stops it, and
//! presses during an upload are refused.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use screen_relay_core::{FlowStatus, ViewState};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{info, instrument};
use uuid::Uuid;

/// What a press of the record button did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PressOutcome {
    /// A new recording was requested.
    Started {
        /// Session ID the recording will run under.
        session_id: Uuid,
    },
    /// The running recording was asked to stop and upload.
    Stopped {
        /// Session ID of the stopped recording.
        session_id: Uuid,
    },
    /// An upload is still in flight; nothing was sent.
    Busy,
}

/// Record button state machine.
pub struct RecordControl {
    view_rx: watch::Receiver<ViewState>,
    command_tx: mpsc::Sender<AppCommand>,
}

impl RecordControl {
    /// Create a control driven by the flow's published view state.
    pub fn new(view_rx: watch::Receiver<ViewState>, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            view_rx,
            command_tx,
        }
    }

    /// Handle one press of the record button.
    ///
    /// A second press that lands before the first start has been applied
    /// sends another start, which the flow rejects without touching the view.
    ///
    /// # Errors
    ///
    /// `ChannelSendFailed` if the application loop is gone.
    #[instrument(skip(self))]
    pub async fn press(&self) -> AppResult<PressOutcome> {
        let status = self.view_rx.borrow().status;

        match status {
            FlowStatus::Idle => {
                let session_id = Uuid::new_v4();

                self.command_tx
                    .send(AppCommand::StartRecording { session_id })
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send StartRecording: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                info!(session_id = %session_id, "Record pressed, starting");

                Ok(PressOutcome::Started { session_id })
            }
            FlowStatus::Recording {
                session_id,
                started_at,
            } => {
                let duration = started_at.elapsed();

                self.command_tx
                    .send(AppCommand::StopRecording { session_id })
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send StopRecording: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                info!(
                    session_id = %session_id,
                    duration_ms = duration.as_millis(),
                    "Record pressed, stopping"
                );

                Ok(PressOutcome::Stopped { session_id })
            }
            FlowStatus::Uploading { session_id } => {
                info!(session_id = %session_id, "Record pressed during upload, ignored");
                Ok(PressOutcome::Busy)
            }
        }
    }
}
