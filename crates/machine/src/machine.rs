//! Host stream lifecycle
//!
//! [`Machine`] owns one resolved link and serialises every stream operation
//! on it through a single blocking mutex: negotiation, trigger accounting
//! and teardown never interleave. The immutable [`LinkTopology`] is kept
//! outside the lock.
//!
//! Per stream the host calls, in order:
//!
//! ```text
//! startup → hw_params → (trigger start / trigger stop)* → hw_free
//! ```
//!
//! `M` selects the lock: `CriticalSectionRawMutex` when the link is shared
//! between interrupt and thread contexts, `NoopRawMutex` when only one
//! context ever touches it.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use platform::{Capabilities, DaiEndpoint, StreamDirection};

use crate::error::{MachineError, Parameter};
use crate::link::{AudioLink, HwParams, LinkTopology, NegotiatedConfig};
use crate::topology::{resolve, ComponentRegistry, LinkConfig};
use crate::use_counter::StreamUseCounters;

/// PCM trigger command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerCommand {
    /// Stream starts.
    Start,
    /// Stream stops.
    Stop,
    /// Stream pauses.
    PausePush,
    /// Stream resumes from pause.
    PauseRelease,
    /// System suspend while running.
    Suspend,
    /// System resume.
    Resume,
}

impl TriggerCommand {
    /// `true` for the command that opens a stream's active period.
    #[must_use]
    pub const fn is_start(self) -> bool {
        matches!(self, Self::Start)
    }

    /// `true` for the command that closes a stream's active period.
    #[must_use]
    pub const fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// What [`Machine::hw_free`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HwFreeOutcome {
    /// No stream was running; endpoints were cleared.
    Released,
    /// A stream is still running; shared state was kept.
    Retained,
}

struct LinkState<I, C> {
    link: AudioLink<I, C>,
    counters: StreamUseCounters,
}

/// One link, its use counters, and the lock around them.
pub struct Machine<M: RawMutex, I, C> {
    topology: LinkTopology,
    state: Mutex<M, RefCell<LinkState<I, C>>>,
}

impl<M: RawMutex, I: DaiEndpoint, C: DaiEndpoint> Machine<M, I, C> {
    /// Take ownership of a resolved link.
    pub fn new(link: AudioLink<I, C>) -> Self {
        Self {
            topology: link.topology.clone(),
            state: Mutex::new(RefCell::new(LinkState {
                link,
                counters: StreamUseCounters::new(),
            })),
        }
    }

    /// Resolve `config` through `registry` and wrap the result.
    pub fn probe<R>(registry: &R, config: &LinkConfig) -> Result<Self, MachineError>
    where
        R: ComponentRegistry<Interface = I, Codec = C> + ?Sized,
    {
        resolve(registry, config).map(Self::new)
    }

    /// Static description; readable without locking.
    pub fn topology(&self) -> &LinkTopology {
        &self.topology
    }

    fn check_direction(&self, direction: StreamDirection) -> Result<(), MachineError> {
        if self.topology.directions.allows(direction) {
            Ok(())
        } else {
            warn!(
                "link {}: no {} path",
                self.topology.name.as_str(),
                direction.as_str()
            );
            Err(MachineError::UnsupportedParameter {
                parameter: Parameter::Direction(direction),
            })
        }
    }

    /// Stream open: narrow every endpoint to the allowed set.
    pub fn startup(&self, direction: StreamDirection) -> Result<Capabilities, MachineError> {
        self.check_direction(direction)?;
        self.state
            .lock(|state| state.borrow_mut().link.restrict_capabilities())
    }

    /// Stream configure: negotiate and commit `params` across the link.
    pub fn hw_params(
        &self,
        direction: StreamDirection,
        params: HwParams,
    ) -> Result<NegotiatedConfig, MachineError> {
        self.check_direction(direction)?;
        self.state
            .lock(|state| state.borrow_mut().link.negotiate(params))
    }

    /// Account a trigger command. Returns the direction's new count.
    ///
    /// Only `Start` and `Stop` move the count; pause and suspend commands
    /// leave it as is, so a paused stream is still stopped exactly once.
    /// An unmatched stop is logged and tallied (see
    /// [`underflows`](Self::underflows)) but never fails the trigger.
    pub fn trigger(&self, direction: StreamDirection, command: TriggerCommand) -> u32 {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if command.is_start() {
                return state.counters.on_stream_start(direction);
            }
            if !command.is_stop() {
                return state.counters.active_count(direction);
            }
            match state.counters.on_stream_stop(direction) {
                Ok(count) => count,
                Err(_) => {
                    error!(
                        "link {}: error in {} streams count",
                        self.topology.name.as_str(),
                        direction.as_str()
                    );
                    0
                }
            }
        })
    }

    /// Stream teardown. Clears every endpoint only when no stream in
    /// either direction is still running.
    pub fn hw_free(&self, direction: StreamDirection) -> Result<HwFreeOutcome, MachineError> {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if !state.counters.can_release_shared_state() {
                debug!(
                    "link {}: {} hw_free, shared state retained",
                    self.topology.name.as_str(),
                    direction.as_str()
                );
                return Ok(HwFreeOutcome::Retained);
            }
            state.link.release_hardware()?;
            info!(
                "link {}: {} hw_free, released",
                self.topology.name.as_str(),
                direction.as_str()
            );
            Ok(HwFreeOutcome::Released)
        })
    }

    /// Configuration committed by the last successful `hw_params`.
    pub fn negotiated(&self) -> Option<NegotiatedConfig> {
        self.state
            .lock(|state| state.borrow().link.negotiated().cloned())
    }

    /// Running streams in `direction`.
    pub fn active_count(&self, direction: StreamDirection) -> u32 {
        self.state
            .lock(|state| state.borrow().counters.active_count(direction))
    }

    /// `true` when no stream runs in either direction.
    pub fn can_release_shared_state(&self) -> bool {
        self.state
            .lock(|state| state.borrow().counters.can_release_shared_state())
    }

    /// Unmatched trigger stops seen so far.
    pub fn underflows(&self) -> u32 {
        self.state
            .lock(|state| state.borrow().counters.underflows())
    }

    /// Inspect the link under the lock.
    pub fn with_link<T>(&self, f: impl FnOnce(&AudioLink<I, C>) -> T) -> T {
        self.state.lock(|state| f(&state.borrow().link))
    }

    /// Modify the link's drivers under the lock.
    pub fn with_link_mut<T>(&self, f: impl FnOnce(&mut AudioLink<I, C>) -> T) -> T {
        self.state.lock(|state| f(&mut state.borrow_mut().link))
    }

    /// Give back the link.
    pub fn into_link(self) -> AudioLink<I, C> {
        self.state.into_inner().into_inner().link
    }
}
