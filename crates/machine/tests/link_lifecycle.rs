//! Link lifecycle integration tests: resolve → restrict → negotiate →
//! trigger → hw_free over mock endpoints.
// Integration test file: unwrap/panic/indexing are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
//!
//! Run with: cargo test -p machine --test link_lifecycle

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use machine::topology::mock::MockRegistry;
use machine::{
    resolve, ComponentReference, HwFreeOutcome, HwParams, LinkConfig, Machine, MachineError,
    Parameter, Rollback, TriggerCommand,
};
use platform::mocks::MockEndpoint;
use platform::{
    Capabilities, ChannelSet, ClockRole, EndpointFault, FormatMask, RateSet, SampleFormat,
    StreamDirection,
};

type TestMachine = Machine<NoopRawMutex, MockEndpoint, MockEndpoint>;

fn caps() -> Capabilities {
    Capabilities::new(
        RateSet::from_rates(&[16_000, 32_000, 48_000]).unwrap(),
        ChannelSet::MONO_STEREO,
        FormatMask::ALL,
    )
}

fn cpu() -> ComponentReference {
    ComponentReference::interface("audio-cpu", 0).unwrap()
}

fn codec(index: u8) -> ComponentReference {
    ComponentReference::codec("audio-codec", index).unwrap()
}

fn config() -> LinkConfig {
    LinkConfig::new("tfa98xx", "Audio", cpu())
        .unwrap()
        .with_codec(codec(0))
        .unwrap()
        .with_codec(codec(1))
        .unwrap()
}

/// One interface and two codecs, all advertising [`caps`].
fn registry_with(codec_b: MockEndpoint) -> MockRegistry {
    let registry = MockRegistry::new();
    registry
        .insert(cpu(), MockEndpoint::new("sai", caps()))
        .insert(codec(0), MockEndpoint::new("amp-left", caps()))
        .insert(codec(1), codec_b);
    registry
}

fn machine() -> TestMachine {
    Machine::probe(&registry_with(MockEndpoint::new("amp-right", caps())), &config()).unwrap()
}

const PB: StreamDirection = StreamDirection::Playback;
const CAP: StreamDirection = StreamDirection::Capture;

// ── Resolution ──────────────────────────────────────────────────────────────

#[test]
fn resolve_labels_codecs_by_position() {
    let registry = registry_with(MockEndpoint::new("amp-right", caps()));
    let link = resolve(&registry, &config()).unwrap();

    let topology = link.topology();
    assert_eq!(topology.interface.label.as_str(), "sai");
    assert_eq!(topology.codec_label(0), Some("0 amp-left"));
    assert_eq!(topology.codec_label(1), Some("1 amp-right"));
    assert_eq!(link.codec_count(), 2);
    assert!(link.negotiated().is_none());
    assert_eq!(registry.outstanding(), 0);
    assert_eq!(registry.acquisitions(), 3);
}

#[test]
fn unbound_codec_aborts_the_link_and_releases_every_node() {
    let registry = registry_with(MockEndpoint::new("amp-right", caps()));
    registry.insert_unbound(codec(1));

    let err = resolve(&registry, &config()).unwrap_err();
    assert_eq!(
        err,
        MachineError::ComponentNotReady {
            reference: codec(1)
        }
    );
    assert!(err.is_retryable());
    assert_eq!(registry.outstanding(), 0);

    // Driver probes later; the retry succeeds.
    registry.insert(codec(1), MockEndpoint::new("amp-right", caps()));
    assert!(resolve(&registry, &config()).is_ok());
    assert_eq!(registry.outstanding(), 0);
}

#[test]
fn missing_interface_is_reported_before_codecs() {
    let registry = registry_with(MockEndpoint::new("amp-right", caps()));
    registry.remove(&cpu());
    registry.remove(&codec(0));

    assert_eq!(
        resolve(&registry, &config()).unwrap_err(),
        MachineError::ComponentNotReady { reference: cpu() }
    );
    assert_eq!(registry.acquisitions(), 0);
}

// ── Restriction and negotiation ─────────────────────────────────────────────

#[test]
fn startup_restricts_every_endpoint_to_the_common_set() {
    let m = machine();
    let allowed = m.startup(PB).unwrap();

    assert_eq!(allowed.rates.as_slice(), &[16_000, 32_000, 48_000]);
    assert_eq!(allowed.channels, ChannelSet::MONO_STEREO);
    m.with_link(|link| {
        assert_eq!(link.interface().constraints.as_ref(), Some(&allowed));
        assert_eq!(link.codec(0).unwrap().constraints.as_ref(), Some(&allowed));
        assert_eq!(link.codec(1).unwrap().constraints.as_ref(), Some(&allowed));
    });
}

#[test]
fn narrowest_endpoint_wins() {
    let narrow = Capabilities::new(
        RateSet::from_rates(&[48_000]).unwrap(),
        ChannelSet::STEREO,
        FormatMask::from_formats(&[SampleFormat::S16Le]),
    );
    let m: TestMachine = Machine::probe(
        &registry_with(MockEndpoint::new("amp-right", narrow.clone())),
        &config(),
    )
    .unwrap();
    assert_eq!(m.startup(PB).unwrap(), narrow);
    assert_eq!(m.topology().allowed, narrow);
}

#[test]
fn negotiate_assigns_provider_to_interface_and_consumer_to_codecs() {
    let m = machine();
    m.startup(PB).unwrap();
    let cfg = m
        .hw_params(PB, HwParams::new(48_000, 2, SampleFormat::S16Le))
        .unwrap();

    assert_eq!(cfg.interface_role, ClockRole::Provider);
    assert_eq!(cfg.codec_roles.as_slice(), &[ClockRole::Consumer; 2]);
    assert_eq!(cfg.clocks.fsync_hz, 48_000);
    m.with_link(|link| {
        assert_eq!(link.interface().role(), Some(ClockRole::Provider));
        assert_eq!(link.codec(0).unwrap().role(), Some(ClockRole::Consumer));
        assert_eq!(link.codec(1).unwrap().role(), Some(ClockRole::Consumer));
    });
}

#[test]
fn negotiate_is_idempotent() {
    let m = machine();
    let params = HwParams::new(32_000, 1, SampleFormat::S24Le);
    let first = m.hw_params(PB, params).unwrap();
    let second = m.hw_params(PB, params).unwrap();

    assert_eq!(first, second);
    assert_eq!(m.negotiated(), Some(second));
    m.with_link(|link| {
        assert_eq!(link.interface().set_format_calls, 2);
        assert_eq!(link.interface().role(), Some(ClockRole::Provider));
    });
}

#[test]
fn unsupported_rate_leaves_configuration_untouched() {
    let m = machine();
    let committed = m
        .hw_params(PB, HwParams::new(48_000, 2, SampleFormat::S16Le))
        .unwrap();

    let err = m
        .hw_params(PB, HwParams::new(44_100, 2, SampleFormat::S16Le))
        .unwrap_err();
    assert_eq!(
        err,
        MachineError::UnsupportedParameter {
            parameter: Parameter::Rate(44_100)
        }
    );
    assert_eq!(m.negotiated(), Some(committed));
    // Rejected before any endpoint was addressed.
    m.with_link(|link| assert_eq!(link.interface().set_format_calls, 1));
}

#[test]
fn host_errors_are_std_errors() {
    fn boxed(err: impl std::error::Error + 'static) -> Box<dyn std::error::Error> {
        Box::new(err)
    }

    let err = machine()
        .hw_params(PB, HwParams::new(44_100, 2, SampleFormat::S16Le))
        .unwrap_err();
    assert!(boxed(err).to_string().starts_with("unsupported"));

    let err = RateSet::from_rates(&[1_000]).unwrap_err();
    assert!(boxed(err).to_string().contains("out of range"));
}

#[test]
fn unsupported_channel_count_is_named() {
    let m = machine();
    assert_eq!(
        m.hw_params(PB, HwParams::new(48_000, 6, SampleFormat::S16Le)),
        Err(MachineError::UnsupportedParameter {
            parameter: Parameter::Channels(6)
        })
    );
}

// ── Rollback ────────────────────────────────────────────────────────────────

#[test]
fn interface_rejection_needs_no_rollback() {
    let registry = registry_with(MockEndpoint::new("amp-right", caps()));
    registry.insert(
        cpu(),
        MockEndpoint::new("sai", caps()).rejecting_format(EndpointFault::ClockUnreachable),
    );
    let m: TestMachine = Machine::probe(&registry, &config()).unwrap();

    let err = m
        .hw_params(PB, HwParams::new(48_000, 2, SampleFormat::S16Le))
        .unwrap_err();
    let MachineError::EndpointRejected {
        endpoint,
        cause,
        rollback,
    } = err
    else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(endpoint.as_str(), "sai");
    assert_eq!(cause, EndpointFault::ClockUnreachable);
    assert_eq!(rollback, Rollback::NotNeeded);
    m.with_link(|link| assert_eq!(link.codec(0).unwrap().set_format_calls, 0));
}

#[test]
fn first_commit_failure_clears_committed_endpoints() {
    let m: TestMachine = Machine::probe(
        &registry_with(
            MockEndpoint::new("amp-right", caps()).rejecting_format(EndpointFault::Bus),
        ),
        &config(),
    )
    .unwrap();

    let err = m
        .hw_params(PB, HwParams::new(48_000, 2, SampleFormat::S16Le))
        .unwrap_err();
    assert_eq!(
        err,
        MachineError::EndpointRejected {
            endpoint: "1 amp-right".try_into().unwrap(),
            cause: EndpointFault::Bus,
            rollback: Rollback::Completed,
        }
    );
    assert!(m.negotiated().is_none());
    m.with_link(|link| {
        assert_eq!(link.interface().format, None);
        assert_eq!(link.interface().clear_calls, 1);
        assert_eq!(link.codec(0).unwrap().format, None);
        assert_eq!(link.codec(0).unwrap().clear_calls, 1);
        // The rejecting codec is not touched again.
        assert_eq!(link.codec(1).unwrap().clear_calls, 0);
    });
}

#[test]
fn failure_after_a_good_commit_restores_the_previous_configuration() {
    let m = machine();
    let committed = m
        .hw_params(PB, HwParams::new(48_000, 2, SampleFormat::S16Le))
        .unwrap();
    m.with_link_mut(|link| {
        link.codec_mut(1).unwrap().reject_format = Some(EndpointFault::Busy);
    });

    let err = m
        .hw_params(PB, HwParams::new(16_000, 1, SampleFormat::S32Le))
        .unwrap_err();
    assert!(matches!(
        err,
        MachineError::EndpointRejected {
            rollback: Rollback::Completed,
            ..
        }
    ));
    assert_eq!(m.negotiated(), Some(committed.clone()));
    m.with_link(|link| {
        let restored = link.codec(0).unwrap().format.unwrap();
        assert_eq!(restored.clocks, committed.clocks);
        assert_eq!(link.interface().format.unwrap().clocks.fsync_hz, 48_000);
    });
}

#[test]
fn failed_revert_is_incomplete_and_forgets_the_configuration() {
    // Codec 1 rejects; codec 0 then refuses to go back to unconfigured.
    let registry = registry_with(
        MockEndpoint::new("amp-right", caps()).rejecting_format(EndpointFault::Bus),
    );
    let mut codec_a = MockEndpoint::new("amp-left", caps());
    codec_a.reject_clear = Some(EndpointFault::Bus);
    registry.insert(codec(0), codec_a);
    let m = TestMachine::probe(&registry, &config()).unwrap();

    let err = m
        .hw_params(PB, HwParams::new(48_000, 2, SampleFormat::S16Le))
        .unwrap_err();
    assert!(matches!(
        err,
        MachineError::EndpointRejected {
            rollback: Rollback::Incomplete,
            ..
        }
    ));
    assert!(m.negotiated().is_none());
    m.with_link(|link| {
        // The interface is still reverted after codec 0 failed.
        assert_eq!(link.codec(0).unwrap().clear_calls, 1);
        assert_eq!(link.interface().clear_calls, 1);
        assert_eq!(link.interface().format, None);
    });
}

// ── Stream accounting ───────────────────────────────────────────────────────

#[test]
fn capture_stop_at_zero_is_an_anomaly_not_a_failure() {
    let m = machine();
    assert_eq!(m.trigger(CAP, TriggerCommand::Stop), 0);
    assert_eq!(m.active_count(CAP), 0);
    assert_eq!(m.underflows(), 1);
    assert!(m.can_release_shared_state());
    // The stream can still run afterwards.
    assert_eq!(m.trigger(CAP, TriggerCommand::Start), 1);
}

#[test]
fn full_duplex_session() {
    let m = machine();
    let params = HwParams::new(48_000, 2, SampleFormat::S16Le);

    m.startup(PB).unwrap();
    m.hw_params(PB, params).unwrap();
    assert_eq!(m.trigger(PB, TriggerCommand::Start), 1);

    m.startup(CAP).unwrap();
    m.hw_params(CAP, params).unwrap();
    assert_eq!(m.trigger(CAP, TriggerCommand::Start), 1);

    // Playback pauses, then stops, while capture keeps running. Pausing
    // leaves the count alone.
    assert_eq!(m.trigger(PB, TriggerCommand::PausePush), 1);
    assert_eq!(m.trigger(PB, TriggerCommand::Stop), 0);
    assert_eq!(m.hw_free(PB).unwrap(), HwFreeOutcome::Retained);
    assert!(m.negotiated().is_some());

    // Suspend and resume do not end the capture stream.
    assert_eq!(m.trigger(CAP, TriggerCommand::Suspend), 1);
    assert_eq!(m.trigger(CAP, TriggerCommand::Resume), 1);
    assert_eq!(m.hw_free(CAP).unwrap(), HwFreeOutcome::Retained);
    assert_eq!(m.trigger(CAP, TriggerCommand::Stop), 0);
    assert_eq!(m.hw_free(CAP).unwrap(), HwFreeOutcome::Released);
    assert!(m.negotiated().is_none());
    m.with_link(|link| {
        assert_eq!(link.interface().format, None);
        assert_eq!(link.codec(0).unwrap().format, None);
        assert_eq!(link.codec(1).unwrap().format, None);
    });
    assert_eq!(m.underflows(), 0);
}

#[test]
fn release_failure_is_reported_but_state_is_forgotten() {
    let m = machine();
    m.hw_params(PB, HwParams::new(48_000, 2, SampleFormat::S16Le))
        .unwrap();
    m.with_link_mut(|link| {
        link.codec_mut(0).unwrap().reject_clear = Some(EndpointFault::Bus);
    });

    let err = m.hw_free(PB).unwrap_err();
    assert!(matches!(
        err,
        MachineError::EndpointRejected {
            cause: EndpointFault::Bus,
            ..
        }
    ));
    assert!(m.negotiated().is_none());
    m.with_link(|link| assert_eq!(link.interface().format, None));
}
