//! Capability descriptors and their intersection.
//!
//! A link can only carry a configuration every endpoint on it supports, so the
//! link-wide parameter space is the intersection of each endpoint's
//! [`Capabilities`] (and of any board-level constraint). All three dimensions
//! are *enumerated* sets, not ranges: physical constraints are frequently
//! non-contiguous (e.g. {32000, 48000, 64000} Hz).
//!
//! | Dimension | Type | Representation |
//! |-----------|------|----------------|
//! | rate      | [`RateSet`]    | sorted `heapless::Vec<u32, MAX_RATES>` |
//! | channels  | [`ChannelSet`] | bitmask, bit `n-1` ⇔ `n` channels |
//! | format    | [`FormatMask`] | bitmask of [`SampleFormat::mask_bit`] |

use heapless::Vec;

use crate::audio_types::{ChannelCount, OutOfRangeError, SampleFormat, SampleRateHz};
use crate::config::{MAX_RATES, STANDARD_RATES};

// ── Errors ───────────────────────────────────────────────────────────────────

/// Error building a capability set from raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConstraintError {
    /// A rate or channel count outside the representable range.
    #[error("constraint value out of range: {0}")]
    OutOfRange(OutOfRangeError),
    /// More distinct rates than a [`RateSet`] can hold.
    #[error("more than {max} distinct rates")]
    TooManyRates {
        /// Capacity of a rate list.
        max: usize,
    },
}

impl From<OutOfRangeError> for ConstraintError {
    fn from(err: OutOfRangeError) -> Self {
        Self::OutOfRange(err)
    }
}

// ── RateSet ──────────────────────────────────────────────────────────────────

/// Enumerated set of sample rates, kept sorted ascending without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u32, MAX_RATES>", into = "Vec<u32, MAX_RATES>"))]
pub struct RateSet(Vec<u32, MAX_RATES>);

impl RateSet {
    /// Empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a set from arbitrary (unsorted, possibly repeated) rates.
    ///
    /// # Errors
    ///
    /// [`ConstraintError::OutOfRange`] if any rate fails [`SampleRateHz::new`],
    /// [`ConstraintError::TooManyRates`] if more than `MAX_RATES` distinct rates.
    pub fn from_rates(rates: &[u32]) -> Result<Self, ConstraintError> {
        let mut set = Self::new();
        for &hz in rates {
            set.insert(SampleRateHz::new(hz)?)?;
        }
        Ok(set)
    }

    /// The [`STANDARD_RATES`] table.
    #[must_use]
    pub fn standard() -> Self {
        let mut set = Self::new();
        for &hz in &STANDARD_RATES {
            // STANDARD_RATES is sorted, in range and shorter than MAX_RATES.
            let _ = set.0.push(hz);
        }
        set
    }

    /// Insert one rate, keeping the set sorted.
    ///
    /// # Errors
    ///
    /// [`ConstraintError::TooManyRates`] if the set is full.
    pub fn insert(&mut self, rate: SampleRateHz) -> Result<(), ConstraintError> {
        let hz = rate.get();
        match self.0.binary_search(&hz) {
            Ok(_) => Ok(()),
            Err(pos) => self
                .0
                .insert(pos, hz)
                .map_err(|_| ConstraintError::TooManyRates { max: MAX_RATES }),
        }
    }

    /// `true` if `hz` is a member.
    #[must_use]
    pub fn contains(&self, hz: u32) -> bool {
        self.0.binary_search(&hz).is_ok()
    }

    /// Rates present in both sets.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = Self::new();
        for &hz in self.0.iter().filter(|hz| other.contains(**hz)) {
            // out is a subset of self, so it cannot overflow.
            let _ = out.0.push(hz);
        }
        out
    }

    /// Rates in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Number of rates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no rate is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<u32, MAX_RATES>> for RateSet {
    type Error = ConstraintError;

    fn try_from(rates: Vec<u32, MAX_RATES>) -> Result<Self, Self::Error> {
        Self::from_rates(&rates)
    }
}

impl From<RateSet> for Vec<u32, MAX_RATES> {
    fn from(set: RateSet) -> Self {
        set.0
    }
}

// ── ChannelSet ───────────────────────────────────────────────────────────────

/// Enumerated set of channel counts 1–32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ChannelSet(u32);

impl ChannelSet {
    /// Empty set.
    pub const EMPTY: Self = Self(0);
    /// `{1}`.
    pub const MONO: Self = Self(0b01);
    /// `{2}`.
    pub const STEREO: Self = Self(0b10);
    /// `{1, 2}`.
    pub const MONO_STEREO: Self = Self(0b11);

    /// Build from a list of counts.
    ///
    /// # Errors
    ///
    /// [`OutOfRangeError`] if any count is 0 or above 32.
    pub fn from_counts(counts: &[u8]) -> Result<Self, OutOfRangeError> {
        let mut bits = 0u32;
        for &count in counts {
            bits |= Self::bit(ChannelCount::new(count)?);
        }
        Ok(Self(bits))
    }

    /// Every count in `min..=max`.
    ///
    /// # Errors
    ///
    /// [`OutOfRangeError`] if either bound is invalid.
    pub fn range(min: u8, max: u8) -> Result<Self, OutOfRangeError> {
        let min = ChannelCount::new(min)?;
        let max = ChannelCount::new(max)?;
        let bits = (min.get()..=max.get())
            .filter_map(|n| ChannelCount::new(n).ok())
            .fold(0u32, |acc, n| acc | Self::bit(n));
        Ok(Self(bits))
    }

    fn bit(count: ChannelCount) -> u32 {
        // count is 1..=32, so the shift is 0..=31.
        1u32.checked_shl(u32::from(count.get().saturating_sub(1)))
            .unwrap_or(0)
    }

    /// `true` if `count` channels is a member.
    #[must_use]
    pub fn contains(self, count: u8) -> bool {
        ChannelCount::new(count).is_ok_and(|c| self.0 & Self::bit(c) != 0)
    }

    /// Counts present in both sets.
    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// `true` when no count is allowed.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Counts in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=ChannelCount::MAX).filter(move |&n| self.contains(n))
    }

    /// Raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

// ── FormatMask ───────────────────────────────────────────────────────────────

/// Set of [`SampleFormat`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct FormatMask(u32);

impl FormatMask {
    /// Empty set.
    pub const EMPTY: Self = Self(0);

    /// Every known format.
    pub const ALL: Self = Self::from_formats(&SampleFormat::ALL);

    /// Build from a list of formats.
    #[must_use]
    pub const fn from_formats(formats: &[SampleFormat]) -> Self {
        let mut bits = 0u32;
        let mut i = 0;
        while i < formats.len() {
            #[allow(clippy::indexing_slicing)] // bounded by the loop condition
            {
                bits |= formats[i].mask_bit();
            }
            i = i.saturating_add(1);
        }
        Self(bits)
    }

    /// `true` if `format` is a member.
    #[must_use]
    pub const fn contains(self, format: SampleFormat) -> bool {
        self.0 & format.mask_bit() != 0
    }

    /// Formats present in both sets.
    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// `true` when no format is allowed.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in mask-bit order.
    pub fn iter(self) -> impl Iterator<Item = SampleFormat> {
        SampleFormat::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

// ── Capabilities ─────────────────────────────────────────────────────────────

/// Which parameter of a request failed a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mismatch {
    /// Rate not in the [`RateSet`].
    Rate(u32),
    /// Channel count not in the [`ChannelSet`].
    Channels(u8),
    /// Format not in the [`FormatMask`].
    Format(SampleFormat),
}

/// Supported parameter space of one endpoint, or of a whole link after
/// intersection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    /// Allowed sample rates.
    pub rates: RateSet,
    /// Allowed channel counts.
    pub channels: ChannelSet,
    /// Allowed sample formats.
    pub formats: FormatMask,
}

impl Capabilities {
    /// Build from its three dimensions.
    #[must_use]
    pub const fn new(rates: RateSet, channels: ChannelSet, formats: FormatMask) -> Self {
        Self {
            rates,
            channels,
            formats,
        }
    }

    /// Dimension-wise intersection.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            rates: self.rates.intersect(&other.rates),
            channels: self.channels.intersect(other.channels),
            formats: self.formats.intersect(other.formats),
        }
    }

    /// `true` when at least one configuration exists in every dimension.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        !self.rates.is_empty() && !self.channels.is_empty() && !self.formats.is_empty()
    }

    /// Check one concrete request. Rate is checked first, then channels, then format.
    ///
    /// # Errors
    ///
    /// The first [`Mismatch`] found.
    pub fn permits(&self, rate: u32, channels: u8, format: SampleFormat) -> Result<(), Mismatch> {
        if !self.rates.contains(rate) {
            return Err(Mismatch::Rate(rate));
        }
        if !self.channels.contains(channels) {
            return Err(Mismatch::Channels(channels));
        }
        if !self.formats.contains(format) {
            return Err(Mismatch::Format(format));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    #[test]
    fn rate_set_sorts_and_dedups() {
        let set = RateSet::from_rates(&[48_000, 16_000, 48_000, 32_000]).unwrap();
        assert_eq!(set.as_slice(), &[16_000, 32_000, 48_000]);
    }

    #[test]
    fn rate_set_rejects_out_of_range_rate() {
        assert!(matches!(
            RateSet::from_rates(&[4_000]),
            Err(ConstraintError::OutOfRange(_))
        ));
    }

    #[test]
    fn rate_set_rejects_overflow() {
        let rates: [u32; 17] = core::array::from_fn(|i| 8_000 + 1_000 * i as u32);
        assert_eq!(
            RateSet::from_rates(&rates),
            Err(ConstraintError::TooManyRates { max: MAX_RATES })
        );
    }

    #[test]
    fn rate_intersection_is_non_contiguous() {
        let board = RateSet::from_rates(&[32_000, 48_000, 64_000]).unwrap();
        let sai = RateSet::standard();
        assert_eq!(board.intersect(&sai).as_slice(), &[32_000, 48_000, 64_000]);
    }

    #[test]
    fn channel_set_range_and_iter() {
        let set = ChannelSet::range(1, 4).unwrap();
        assert!(set.contains(3));
        assert!(!set.contains(5));
        assert!(!set.contains(0));
        assert_eq!(set.iter().count(), 4);
    }

    #[test]
    fn channel_set_32_channels_uses_top_bit() {
        let set = ChannelSet::from_counts(&[32]).unwrap();
        assert_eq!(set.bits(), 1 << 31);
    }

    #[test]
    fn format_mask_all_contains_every_format() {
        for f in SampleFormat::ALL {
            assert!(FormatMask::ALL.contains(f));
        }
    }

    #[test]
    fn permits_reports_first_mismatch() {
        let caps = Capabilities::new(
            RateSet::from_rates(&[48_000]).unwrap(),
            ChannelSet::STEREO,
            FormatMask::from_formats(&[SampleFormat::S16Le]),
        );
        assert_eq!(caps.permits(48_000, 2, SampleFormat::S16Le), Ok(()));
        assert_eq!(
            caps.permits(44_100, 1, SampleFormat::S32Le),
            Err(Mismatch::Rate(44_100))
        );
        assert_eq!(
            caps.permits(48_000, 1, SampleFormat::S32Le),
            Err(Mismatch::Channels(1))
        );
        assert_eq!(
            caps.permits(48_000, 2, SampleFormat::S32Le),
            Err(Mismatch::Format(SampleFormat::S32Le))
        );
    }

    #[test]
    fn empty_dimension_is_unsatisfiable() {
        let caps = Capabilities::new(RateSet::standard(), ChannelSet::EMPTY, FormatMask::ALL);
        assert!(!caps.is_satisfiable());
    }
}
