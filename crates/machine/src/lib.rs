//! Machine binding layer for serial-audio links
//!
//! Binds one host-side serial audio interface to one or more codecs,
//! negotiates a single format and clock plan across all of them, and
//! accounts the streams running over the link so shared state is only torn
//! down once both directions are idle.
//!
//! # Lifecycle
//!
//! ```text
//! LinkConfig ──resolve──▶ AudioLink ──Machine::new──▶ Machine
//!                                                       │
//!   startup → hw_params → trigger(start/stop)* → hw_free┘
//! ```
//!
//! # Modules
//!
//! - [`topology`] - component references, [`LinkConfig`], [`resolve`]
//! - [`link`] - the bound [`AudioLink`] and its static [`LinkTopology`]
//! - [`machine`] - [`Machine`]: lock, stream lifecycle
//! - [`use_counter`] - per-direction active stream counts
//! - [`endpoints`] - interface and codec drivers
//! - [`boards`] - known board profiles
//! - [`error`] - [`MachineError`]
//!
//! # Features
//!
//! - `std`: Host builds; exposes `topology::mock::MockRegistry`
//! - `serde`: Load [`LinkConfig`] from JSON / TOML
//! - `defmt`: defmt logging (hardware)
//! - `tracing`: tracing logging (host)
//!
//! # Example
//!
//! ```no_run
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use machine::{HwParams, Machine, TriggerCommand};
//! use platform::{DaiEndpoint, SampleFormat, StreamDirection};
//!
//! fn play<I: DaiEndpoint, C: DaiEndpoint>(
//!     m: &Machine<CriticalSectionRawMutex, I, C>,
//! ) -> Result<(), machine::MachineError> {
//!     let dir = StreamDirection::Playback;
//!     m.startup(dir)?;
//!     m.hw_params(dir, HwParams::new(48_000, 2, SampleFormat::S16Le))?;
//!     m.trigger(dir, TriggerCommand::Start);
//!     m.trigger(dir, TriggerCommand::Stop);
//!     m.hw_free(dir)?;
//!     Ok(())
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)] // register and signal names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)] // MachineError, machine::Machine

// Must come first: the logging macros are textually scoped.
#[macro_use]
mod fmt;

pub mod boards;
pub mod endpoints;
pub mod error;
pub mod link;
pub mod machine;
mod negotiator;
pub mod topology;
pub mod use_counter;

pub use boards::BoardProfile;
pub use error::{MachineError, Parameter, Rollback, Severity, TopologyFault};
pub use link::{
    AudioLink, ClockPolicy, EndpointInfo, HwParams, LinkDirections, LinkTopology,
    NegotiatedConfig,
};
pub use machine::{HwFreeOutcome, Machine, TriggerCommand};
pub use topology::{resolve, ComponentReference, ComponentRegistry, LinkConfig, NodeGuard};
pub use use_counter::{StreamState, StreamUseCounters};
