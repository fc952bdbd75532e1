//! Compile-time limits and reference tables
//!
//! Every collection in this workspace is a fixed-capacity `heapless` type.
//! The capacities are defined here so that the platform and machine crates
//! agree on them, and so that a board with more codecs is a one-line change.

/// Maximum number of codec endpoints on a single link.
///
/// The TFA98xx stereo-amp board uses two; four leaves room for TDM arrays.
pub const MAX_CODECS: usize = 4;

/// Maximum number of entries in an enumerated rate constraint list.
pub const MAX_RATES: usize = 16;

/// Maximum length of an endpoint or link name (bytes).
pub const NAME_LEN: usize = 32;

/// Maximum length of a per-codec name prefix (bytes), e.g. `"0"` or `"left"`.
pub const PREFIX_LEN: usize = 8;

/// Maximum length of a display label: `"<prefix> <name>"`.
pub const LABEL_LEN: usize = NAME_LEN + PREFIX_LEN + 1;

/// Standard PCM sample rates (Hz), ascending.
///
/// Mirrors the discrete rate table every DAI driver advertises against.
/// Continuous-range hardware is represented by the subset it can clock.
pub const STANDARD_RATES: [u32; 15] = [
    8_000, 11_025, 16_000, 22_050, 32_000, 44_100, 48_000, 64_000, 88_200, 96_000, 176_400,
    192_000, 352_800, 384_000, 768_000,
];
