use crate::{
    CaptureSession, CaptureSource, EncoderEvent, FALLBACK_MIME_TYPE, FfmpegEncoder,
    PREFERRED_MIME_TYPE, VideoEncoder,
    media::ffmpeg::{codec_for_mime, parse_encoder_list},
    select_mime_type,
};

use std::time::Duration;

use tokio::sync::mpsc;

const ENCODER_LISTING: &str = "\
Encoders:
 V..... = Video
 A..... = Audio
 S..... = Subtitle
 .F.... = Frame-level multithreading
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 V....D libvpx               libvpx VP8 (codec vp8)
 V....D libvpx-vp9           libvpx VP9 (codec vp9)
 A....D libopus              libopus Opus (codec opus)
";

/// WHAT: Only video encoders below the separator are collected
/// WHY: Legend lines and audio encoders must not count as video support
#[test]
fn given_encoder_listing_when_parsing_then_video_encoders_only() {
    // Given: Typical `ffmpeg -encoders` output

    // When: Parsing it
    let encoders = parse_encoder_list(ENCODER_LISTING);

    // Then: The three video encoders and nothing else
    assert_eq!(encoders.len(), 3);
    assert!(encoders.contains("libvpx-vp9"));
    assert!(encoders.contains("libvpx"));
    assert!(encoders.contains("libx264"));
    assert!(!encoders.contains("libopus"));
    assert!(!encoders.contains("="));
}

/// WHAT: Media types map onto ffmpeg encoder names
/// WHY: Browser-style type strings vary in spacing and quoting
#[test]
fn given_media_types_when_mapping_then_matching_encoder() {
    assert_eq!(codec_for_mime("video/webm; codecs=vp9"), Some("libvpx-vp9"));
    assert_eq!(codec_for_mime("video/webm;codecs=\"vp9\""), Some("libvpx-vp9"));
    assert_eq!(codec_for_mime("VIDEO/WEBM"), Some("libvpx"));
    assert_eq!(codec_for_mime("video/webm; codecs=vp8"), Some("libvpx"));
    assert_eq!(codec_for_mime("video/mp4"), None);
}

/// WHAT: Support follows the probed encoder list
/// WHY: An ffmpeg build without libvpx-vp9 must fall back to plain WebM
#[test]
fn given_build_without_vp9_when_checking_support_then_only_fallback() {
    // Given: An ffmpeg build with VP8 only
    let encoder = FfmpegEncoder::with_encoders("ffmpeg", ["libvpx", "libx264"]);

    // When/Then: Only the fallback type is supported
    assert!(!encoder.is_type_supported(PREFERRED_MIME_TYPE));
    assert!(encoder.is_type_supported(FALLBACK_MIME_TYPE));
}

/// WHAT: A missing ffmpeg binary is reported as CaptureUnavailable
/// WHY: The app must explain why recording cannot work
#[test]
fn given_missing_binary_when_probing_then_capture_unavailable() {
    // Given: A path with no ffmpeg
    let path = "/nonexistent/ffmpeg";

    // When: Probing
    let result = FfmpegEncoder::probe(path);

    // Then: CaptureUnavailable
    assert!(matches!(
        result,
        Err(crate::CaptureError::CaptureUnavailable { .. })
    ));
}

/// WHAT: A real ffmpeg reports at least one WebM encoder
/// WHY: Confirms the probe parses live output
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_installed_ffmpeg_when_probing_then_webm_supported() {
    // Given: ffmpeg on PATH
    let encoder = FfmpegEncoder::probe("ffmpeg").unwrap();

    // When/Then: Plain WebM is available
    assert!(encoder.is_type_supported(FALLBACK_MIME_TYPE));
}

/// WHAT: Recording a test source yields chunks, then exactly one Stopped
/// WHY: The pipeline only assembles a blob once Stopped follows the last chunk
#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
async fn given_test_source_when_finishing_then_chunks_precede_single_stop() {
    // Given: A live ffmpeg encoding the lavfi test pattern
    let encoder = FfmpegEncoder::probe("ffmpeg").unwrap();
    let mime_type = select_mime_type(&encoder).unwrap();
    let session = CaptureSession::new(CaptureSource {
        input_format: "lavfi".to_string(),
        input: "testsrc=size=320x240:rate=15".to_string(),
        framerate: 15,
    });
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut recording = encoder.begin(&session, mime_type, tx).await.unwrap();

    // When: Recording briefly, then finishing
    tokio::time::sleep(Duration::from_secs(1)).await;
    recording.finish().await.unwrap();

    // Then: Chunks arrive first, then one Stopped closes the stream
    let events = tokio::time::timeout(Duration::from_secs(15), async {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    })
    .await
    .unwrap();

    let stops = events
        .iter()
        .filter(|event| matches!(event, EncoderEvent::Stopped))
        .count();
    assert_eq!(stops, 1);
    assert!(matches!(events.last(), Some(EncoderEvent::Stopped)));
    assert!(matches!(events.first(), Some(EncoderEvent::Chunk(bytes)) if !bytes.is_empty()));
}
