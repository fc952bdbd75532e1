//! Type system enforcement tests for audio domain newtypes.
//! These newtypes reject out-of-range link parameters before they reach a driver.

// ── SampleRateHz ─────────────────────────────────────────────────────────────

#[test]
fn sample_rate_hz_rejects_below_8000() {
    use platform::audio_types::SampleRateHz;
    let err = SampleRateHz::new(7_999).unwrap_err();
    assert_eq!(err.value, 7_999);
    assert_eq!(err.min, 8_000);
    assert_eq!(err.max, 768_000);
}

#[test]
fn sample_rate_hz_accepts_bounds() {
    use platform::audio_types::SampleRateHz;
    assert_eq!(SampleRateHz::new(8_000).unwrap().get(), 8_000);
    assert_eq!(SampleRateHz::new(768_000).unwrap().get(), 768_000);
}

#[test]
fn sample_rate_hz_rejects_above_768000() {
    use platform::audio_types::SampleRateHz;
    assert!(SampleRateHz::new(768_001).is_err());
}

#[test]
fn sample_rate_hz_try_from_u32() {
    use platform::audio_types::SampleRateHz;
    let rate = SampleRateHz::try_from(48_000u32).unwrap();
    assert_eq!(u32::from(rate), 48_000);
}

#[test]
fn sample_rate_hz_is_four_bytes() {
    use platform::audio_types::SampleRateHz;
    // repr(transparent) over u32
    assert_eq!(core::mem::size_of::<SampleRateHz>(), 4);
}

// ── ChannelCount ─────────────────────────────────────────────────────────────

#[test]
fn channel_count_rejects_zero() {
    use platform::audio_types::ChannelCount;
    assert!(ChannelCount::new(0).is_err());
}

#[test]
fn channel_count_rejects_above_32() {
    use platform::audio_types::ChannelCount;
    assert!(ChannelCount::new(33).is_err());
    assert!(ChannelCount::new(32).is_ok());
}

#[test]
fn channel_count_constants() {
    use platform::audio_types::ChannelCount;
    assert_eq!(ChannelCount::MONO.get(), 1);
    assert_eq!(ChannelCount::STEREO.get(), 2);
}

// ── SampleFormat ─────────────────────────────────────────────────────────────

#[test]
fn sample_format_widths() {
    use platform::audio_types::SampleFormat;
    // S24_LE is 24 significant bits in a 32-bit container
    assert_eq!(SampleFormat::S24Le.sample_bits(), 24);
    assert_eq!(SampleFormat::S24Le.physical_bits(), 32);
    assert_eq!(SampleFormat::S24_3Le.physical_bits(), 24);
    assert_eq!(SampleFormat::S16Le.physical_bits(), 16);
}

#[test]
fn sample_format_mask_bits_are_distinct() {
    use platform::audio_types::SampleFormat;
    let combined = SampleFormat::ALL
        .iter()
        .fold(0u32, |acc, f| {
            assert_eq!(acc & f.mask_bit(), 0, "{f} shares a mask bit");
            acc | f.mask_bit()
        });
    assert_eq!(combined.count_ones(), 4);
}

#[test]
fn sample_format_display_matches_pcm_names() {
    use platform::audio_types::SampleFormat;
    assert_eq!(SampleFormat::S16Le.to_string(), "S16_LE");
    assert_eq!(SampleFormat::S24_3Le.to_string(), "S24_3LE");
}

// ── StreamDirection ──────────────────────────────────────────────────────────

#[test]
fn stream_direction_display() {
    use platform::audio_types::StreamDirection;
    assert_eq!(StreamDirection::Playback.to_string(), "playback");
    assert_eq!(StreamDirection::Capture.to_string(), "capture");
}
