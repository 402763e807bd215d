use crate::{
    CaptureError, FALLBACK_MIME_TYPE, PREFERRED_MIME_TYPE, select_mime_type,
    tests::support::FakeEncoder,
};

/// WHAT: VP9 is chosen when the encoder supports it
/// WHY: VP9 gives smaller uploads at the same quality
#[test]
fn given_vp9_support_when_selecting_then_preferred_type() {
    // Given: An encoder supporting both types
    let encoder = FakeEncoder::supporting(&[FALLBACK_MIME_TYPE, PREFERRED_MIME_TYPE]);

    // When: Selecting a media type
    let selected = select_mime_type(&encoder);

    // Then: The preferred codec string is picked
    assert!(matches!(selected, Ok("video/webm; codecs=vp9")));
}

/// WHAT: Plain WebM is chosen when VP9 is missing
/// WHY: Recording must still work on encoders without VP9
#[test]
fn given_only_container_support_when_selecting_then_fallback_type() {
    // Given: An encoder supporting only plain WebM
    let encoder = FakeEncoder::supporting(&[FALLBACK_MIME_TYPE]);

    // When: Selecting a media type
    let selected = select_mime_type(&encoder);

    // Then: The fallback is picked without error
    assert!(matches!(selected, Ok("video/webm")));
}

/// WHAT: No supported type yields NoEncoderAvailable
/// WHY: Recording with an unusable encoder must fail before capture runs
#[test]
fn given_no_support_when_selecting_then_no_encoder_available() {
    // Given: An encoder supporting nothing
    let encoder = FakeEncoder::supporting(&[]);

    // When: Selecting a media type
    let selected = select_mime_type(&encoder);

    // Then: NoEncoderAvailable is returned
    assert!(matches!(
        selected,
        Err(CaptureError::NoEncoderAvailable { .. })
    ));
}
