//! Endpoint abstraction layer for serial-audio machine drivers
//!
//! This crate provides the trait every interface and codec driver implements,
//! plus the audio parameter types the machine layer negotiates with, so that
//! link logic can be developed and tested without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Host stream lifecycle (startup / hw_params / trigger / hw_free)
//!         ↓
//! Machine layer (machine crate: resolver, negotiator, use counters)
//!         ↓
//! Platform (this crate: DaiEndpoint trait, capabilities, clock math)
//!         ↓
//! Endpoint drivers (SAI, I2C codecs)
//! ```
//!
//! # Modules
//!
//! - [`audio`] - [`DaiEndpoint`] command interface and [`DaiFormat`]
//! - [`audio_types`] - validated newtypes ([`SampleRateHz`], [`ChannelCount`])
//! - [`constraints`] - enumerated [`Capabilities`] and their intersection
//! - [`audio_config`] - frame layout and BCLK/MCLK derivation
//! - [`config`] - compile-time capacities
//!
//! # Features
//!
//! - `std`: Enable standard library support and the `mocks` module (for testing)
//! - `serde`: Serialize/deserialize capability types (host config loading)
//! - `defmt`: Enable defmt logging
//!
//! # Example
//!
//! ```no_run
//! use platform::{Capabilities, DaiEndpoint};
//!
//! fn narrow<E: DaiEndpoint>(ep: &mut E, board: &Capabilities) -> Result<(), E::Error> {
//!     let allowed = ep.capabilities().intersect(board);
//!     ep.set_capability_constraints(&allowed)
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
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this HAL crate:
#![allow(clippy::doc_markdown)] // register and signal names in doc comments
#![allow(clippy::must_use_candidate)] // accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio;
pub mod audio_config;
pub mod audio_types;
pub mod config;
pub mod constraints;
pub mod mocks;

// Re-export the endpoint interface
pub use audio::{
    ClockInversion, ClockRole, DaiEndpoint, DaiError, DaiFormat, DaiProtocol, EndpointFault,
    EndpointRole,
};

// Re-export parameter types
pub use audio_config::{ClockError, ClockPlan, FrameLayout, I2S_MIN_SLOTS};
pub use audio_types::{ChannelCount, OutOfRangeError, SampleFormat, SampleRateHz, StreamDirection};
pub use constraints::{Capabilities, ChannelSet, ConstraintError, FormatMask, Mismatch, RateSet};
