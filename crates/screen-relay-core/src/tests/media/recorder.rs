use crate::{
    CaptureError, CaptureSession, EncoderEvent, FALLBACK_MIME_TYPE, MediaRecorder,
    PREFERRED_MIME_TYPE, RecorderState,
    tests::support::{FakeEncoder, fake_source},
};

use std::sync::Arc;

use tokio::sync::mpsc;

/// WHAT: Recorder walks Idle -> Recording -> Stopped
/// WHY: Start and stop are the only transitions a recording has
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_idle_recorder_when_started_and_stopped_then_states_follow() {
    // Given: An idle recorder over a fake encoder
    let encoder = Arc::new(FakeEncoder::supporting(&[PREFERRED_MIME_TYPE]));
    let mut recorder = MediaRecorder::new(encoder, PREFERRED_MIME_TYPE);
    let capture = CaptureSession::new(fake_source());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    assert_eq!(recorder.state(), RecorderState::Idle);

    // When: Starting then stopping
    recorder.start(&capture, events_tx).await.unwrap();
    assert_eq!(recorder.state(), RecorderState::Recording);
    recorder.stop().await.unwrap();

    // Then: Stopped, and the encoder signalled completion
    assert_eq!(recorder.state(), RecorderState::Stopped);
    assert_eq!(events_rx.recv().await, Some(EncoderEvent::Stopped));
}

/// WHAT: Stopping an idle recorder is an invalid transition
/// WHY: There is nothing to flush before a recording starts
#[tokio::test]
async fn given_idle_recorder_when_stopping_then_invalid_transition() {
    // Given: An idle recorder
    let encoder = Arc::new(FakeEncoder::supporting(&[FALLBACK_MIME_TYPE]));
    let mut recorder = MediaRecorder::new(encoder, FALLBACK_MIME_TYPE);

    // When: Stopping it
    let result = recorder.stop().await;

    // Then: InvalidTransition from idle
    assert!(matches!(
        result,
        Err(CaptureError::InvalidTransition {
            from: "idle",
            action: "stop",
            ..
        })
    ));
    assert_eq!(recorder.state(), RecorderState::Idle);
}

/// WHAT: A stopped recorder cannot be restarted
/// WHY: Each recording needs a fresh recorder and chunk accumulator
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stopped_recorder_when_starting_again_then_invalid_transition() {
    // Given: A recorder that has already recorded once
    let encoder = Arc::new(FakeEncoder::supporting(&[FALLBACK_MIME_TYPE]));
    let mut recorder = MediaRecorder::new(Arc::clone(&encoder) as _, FALLBACK_MIME_TYPE);
    let capture = CaptureSession::new(fake_source());
    let (events_tx, _events_rx) = mpsc::unbounded_channel();
    recorder.start(&capture, events_tx.clone()).await.unwrap();
    recorder.stop().await.unwrap();

    // When: Starting it again
    let result = recorder.start(&capture, events_tx).await;

    // Then: InvalidTransition from stopped, encoder not begun a second time
    assert!(matches!(
        result,
        Err(CaptureError::InvalidTransition {
            from: "stopped",
            action: "start",
            ..
        })
    ));
    assert_eq!(encoder.begun_with().len(), 1);
}

/// WHAT: The recorder hands its media type to the encoder
/// WHY: Codec negotiation is only useful if the encoder receives the choice
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_recorder_with_type_when_started_then_encoder_receives_type() {
    // Given: A recorder constructed with the VP9 type
    let encoder = Arc::new(FakeEncoder::supporting(&[PREFERRED_MIME_TYPE]));
    let mut recorder = MediaRecorder::new(Arc::clone(&encoder) as _, PREFERRED_MIME_TYPE);
    let capture = CaptureSession::new(fake_source());
    let (events_tx, _events_rx) = mpsc::unbounded_channel();

    // When: Starting
    recorder.start(&capture, events_tx).await.unwrap();

    // Then: The encoder began with exactly that string
    assert_eq!(recorder.mime_type(), "video/webm; codecs=vp9");
    assert_eq!(encoder.begun_with(), vec!["video/webm; codecs=vp9".to_string()]);
}
