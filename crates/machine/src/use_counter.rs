//! Per-direction stream use counting
//!
//! Shared link state (the negotiated configuration, the endpoint formats)
//! may only be torn down once no stream in either direction is running.
//! Each trigger start increments its direction's counter, each trigger stop
//! decrements it; a stop with nothing running is an anomaly that is recorded
//! but never blocks teardown.

use platform::StreamDirection;

use crate::error::MachineError;

/// Activity of one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamState {
    /// No stream running.
    Idle,
    /// At least one stream running.
    Active,
}

/// Active stream counts per direction.
///
/// All transitions are via [`on_stream_start`][Self::on_stream_start] and
/// [`on_stream_stop`][Self::on_stream_stop]. Counters saturate at
/// [`u32::MAX`] and never go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamUseCounters {
    playback: u32,
    capture: u32,
    underflows: u32,
}

impl StreamUseCounters {
    /// Both directions idle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            playback: 0,
            capture: 0,
            underflows: 0,
        }
    }

    fn slot(&mut self, direction: StreamDirection) -> &mut u32 {
        match direction {
            StreamDirection::Playback => &mut self.playback,
            StreamDirection::Capture => &mut self.capture,
        }
    }

    /// A stream in `direction` started. Returns the new count.
    pub fn on_stream_start(&mut self, direction: StreamDirection) -> u32 {
        let count = self.slot(direction);
        *count = count.saturating_add(1);
        *count
    }

    /// A stream in `direction` stopped. Returns the new count.
    ///
    /// # Errors
    ///
    /// [`MachineError::CounterUnderflow`] if the counter was already 0; it
    /// stays 0 and the underflow is tallied.
    pub fn on_stream_stop(&mut self, direction: StreamDirection) -> Result<u32, MachineError> {
        if self.active_count(direction) == 0 {
            self.underflows = self.underflows.saturating_add(1);
            return Err(MachineError::CounterUnderflow { direction });
        }
        let count = self.slot(direction);
        *count = count.saturating_sub(1);
        Ok(*count)
    }

    /// Running streams in `direction`.
    #[must_use]
    pub const fn active_count(&self, direction: StreamDirection) -> u32 {
        match direction {
            StreamDirection::Playback => self.playback,
            StreamDirection::Capture => self.capture,
        }
    }

    /// [`StreamState::Active`] when at least one stream runs in `direction`.
    #[must_use]
    pub const fn state(&self, direction: StreamDirection) -> StreamState {
        if self.active_count(direction) == 0 {
            StreamState::Idle
        } else {
            StreamState::Active
        }
    }

    /// `true` exactly when both directions are idle.
    #[must_use]
    pub const fn can_release_shared_state(&self) -> bool {
        self.playback == 0 && self.capture == 0
    }

    /// Unmatched stops seen so far.
    #[must_use]
    pub const fn underflows(&self) -> u32 {
        self.underflows
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PB: StreamDirection = StreamDirection::Playback;
    const CAP: StreamDirection = StreamDirection::Capture;

    #[test]
    fn starts_idle() {
        let c = StreamUseCounters::new();
        assert_eq!(c.state(PB), StreamState::Idle);
        assert_eq!(c.state(CAP), StreamState::Idle);
        assert!(c.can_release_shared_state());
    }

    #[test]
    fn start_then_stop_returns_to_idle() {
        let mut c = StreamUseCounters::new();
        assert_eq!(c.on_stream_start(PB), 1);
        assert_eq!(c.state(PB), StreamState::Active);
        assert!(!c.can_release_shared_state());
        assert_eq!(c.on_stream_stop(PB).unwrap(), 0);
        assert!(c.can_release_shared_state());
    }

    #[test]
    fn stop_at_zero_underflows_and_stays_zero() {
        let mut c = StreamUseCounters::new();
        assert_eq!(
            c.on_stream_stop(CAP),
            Err(MachineError::CounterUnderflow { direction: CAP })
        );
        assert_eq!(c.active_count(CAP), 0);
        assert_eq!(c.underflows(), 1);
        assert!(c.can_release_shared_state());
    }

    #[test]
    fn directions_are_independent() {
        let mut c = StreamUseCounters::new();
        c.on_stream_start(PB);
        c.on_stream_start(PB);
        c.on_stream_start(CAP);
        c.on_stream_stop(PB).unwrap();
        assert_eq!(c.active_count(PB), 1);
        assert_eq!(c.active_count(CAP), 1);
    }

    #[test]
    fn start_saturates() {
        let mut c = StreamUseCounters {
            playback: u32::MAX,
            ..StreamUseCounters::new()
        };
        assert_eq!(c.on_stream_start(PB), u32::MAX);
    }

    proptest! {
        /// N starts followed by N stops return the counter to its prior value,
        /// without touching the other direction.
        #[test]
        fn balanced_start_stop_restores_count(
            prior in 0u32..16,
            other in 0u32..16,
            n in 0u32..64,
        ) {
            let mut c = StreamUseCounters::new();
            for _ in 0..prior { c.on_stream_start(PB); }
            for _ in 0..other { c.on_stream_start(CAP); }
            for _ in 0..n { c.on_stream_start(PB); }
            for _ in 0..n { c.on_stream_stop(PB).unwrap(); }
            prop_assert_eq!(c.active_count(PB), prior);
            prop_assert_eq!(c.active_count(CAP), other);
            prop_assert_eq!(c.underflows(), 0);
        }

        /// Release is allowed exactly when both counters are zero.
        #[test]
        fn release_iff_both_idle(ops in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..64)) {
            let mut c = StreamUseCounters::new();
            for (start, playback) in ops {
                let dir = if playback { PB } else { CAP };
                if start {
                    c.on_stream_start(dir);
                } else {
                    let _ = c.on_stream_stop(dir);
                }
                prop_assert_eq!(
                    c.can_release_shared_state(),
                    c.active_count(PB) == 0 && c.active_count(CAP) == 0
                );
            }
        }
    }
}
