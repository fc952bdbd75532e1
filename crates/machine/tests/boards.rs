//! Board profile integration tests: real endpoint drivers behind a static
//! registry.
// Integration test file: unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
//!
//! Run with: cargo test -p machine --test boards

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use machine::boards::{self, SPH064X, TFA98XX};
use machine::endpoints::sai::SaiMode;
use machine::endpoints::{DummyCodec, SaiInterface, DUMMY_CODEC_NAME};
use machine::{
    ComponentReference, ComponentRegistry, HwParams, Machine, MachineError, Parameter,
    TriggerCommand,
};
use platform::mocks::MockEndpoint;
use platform::{
    Capabilities, ChannelSet, ClockRole, FormatMask, RateSet, SampleFormat, StreamDirection,
};

/// SAI1 plus a dummy codec, as wired on a PDM microphone board.
struct MicBoard;

impl ComponentRegistry for MicBoard {
    type Node = u8;
    type Interface = SaiInterface;
    type Codec = DummyCodec;

    fn acquire(&self, reference: &ComponentReference) -> Option<u8> {
        match (reference.property.as_str(), reference.index) {
            ("audio-cpu", 0) => Some(0),
            ("snd-soc-dummy", 0) => Some(1),
            _ => None,
        }
    }

    fn release(&self, _node: u8) {}

    fn bind_interface(&self, node: u8) -> Option<SaiInterface> {
        (node == 0).then(SaiInterface::stm32h7_sai1)
    }

    fn bind_codec(&self, node: u8) -> Option<DummyCodec> {
        (node == 1).then(DummyCodec::new)
    }
}

#[test]
fn sph064x_capture_session_on_sai() {
    let config = SPH064X.link_config().unwrap();
    let m: Machine<NoopRawMutex, _, _> = Machine::probe(&MicBoard, &config).unwrap();

    assert_eq!(
        m.topology().codec_label(0),
        Some("0 snd-soc-dummy-dai")
    );
    assert_eq!(m.topology().codecs[0].name.as_str(), DUMMY_CODEC_NAME);

    let allowed = m.startup(StreamDirection::Capture).unwrap();
    assert_eq!(allowed.rates.as_slice(), &[32_000, 48_000, 64_000]);

    let cfg = m
        .hw_params(
            StreamDirection::Capture,
            HwParams::new(48_000, 2, SampleFormat::S16Le),
        )
        .unwrap();
    // Two 32-bit slots regardless of sample width.
    assert_eq!(cfg.layout.frame_bits(), 64);
    assert_eq!(cfg.clocks.bclk_hz, 3_072_000);

    m.with_link(|link| {
        let block = link.interface().block().unwrap();
        assert_eq!(block.mode, SaiMode::Master);
        assert_eq!(block.mckdiv, Some(16));
        assert_eq!(
            link.codec(0).unwrap().format().map(|f| f.role),
            Some(ClockRole::Consumer)
        );
    });

    m.trigger(StreamDirection::Capture, TriggerCommand::Start);
    m.trigger(StreamDirection::Capture, TriggerCommand::Stop);
    m.hw_free(StreamDirection::Capture).unwrap();
    m.with_link(|link| assert!(link.interface().block().is_none()));
}

#[test]
fn sph064x_has_no_playback_path() {
    let config = SPH064X.link_config().unwrap();
    let m: Machine<NoopRawMutex, _, _> = Machine::probe(&MicBoard, &config).unwrap();

    assert_eq!(
        m.hw_params(
            StreamDirection::Playback,
            HwParams::new(48_000, 2, SampleFormat::S16Le)
        ),
        Err(MachineError::UnsupportedParameter {
            parameter: Parameter::Direction(StreamDirection::Playback)
        })
    );
}

#[test]
fn sph064x_refuses_packed_24_bit() {
    let config = SPH064X.link_config().unwrap();
    let m: Machine<NoopRawMutex, _, _> = Machine::probe(&MicBoard, &config).unwrap();

    assert_eq!(
        m.hw_params(
            StreamDirection::Capture,
            HwParams::new(48_000, 2, SampleFormat::S24_3Le)
        ),
        Err(MachineError::UnsupportedParameter {
            parameter: Parameter::Format(SampleFormat::S24_3Le)
        })
    );
}

#[test]
fn tfa98xx_slots_follow_sample_width() {
    let config = TFA98XX.link_config().unwrap().with_card("imx-audio-tfa9912").unwrap();
    let wide = Capabilities::new(RateSet::standard(), ChannelSet::MONO_STEREO, FormatMask::ALL);
    let registry = machine::topology::mock::MockRegistry::new();
    registry.insert(config.interface.clone(), MockEndpoint::new("sai", wide.clone()));
    for reference in &config.codecs {
        registry.insert(reference.clone(), MockEndpoint::new("tfa98xx", wide.clone()));
    }
    let m: Machine<NoopRawMutex, _, _> = Machine::probe(&registry, &config).unwrap();

    assert_eq!(m.topology().card.as_str(), "imx-audio-tfa9912");
    assert_eq!(m.topology().codec_label(0), Some("0 tfa98xx"));
    assert_eq!(m.topology().codec_label(1), Some("1 tfa98xx"));
    assert_eq!(
        m.topology().allowed.rates.as_slice(),
        &[8_000, 16_000, 32_000, 44_100, 48_000]
    );

    // (rate, channels, format, bits per frame)
    for (rate, channels, format, frame_bits) in [
        (44_100, 2, SampleFormat::S16Le, 32),
        (16_000, 2, SampleFormat::S32Le, 64),
        // Mono still occupies both I2S slots.
        (8_000, 1, SampleFormat::S16Le, 32),
    ] {
        let cfg = m
            .hw_params(StreamDirection::Playback, HwParams::new(rate, channels, format))
            .unwrap();
        assert_eq!(cfg.layout.frame_bits(), frame_bits);
        assert_eq!(cfg.clocks.bclk_hz, rate * u32::from(frame_bits));
    }
}

#[test]
fn unknown_board_is_not_found() {
    assert!(boards::find("fsl,imx-audio-wm8960").is_none());
    assert_eq!(
        boards::find(TFA98XX.compatible).map(|b| b.card),
        Some("TFA9912")
    );
}
