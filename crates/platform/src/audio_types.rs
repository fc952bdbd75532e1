//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common configuration errors:
//! - `SampleRateHz`: validates 8000–768000 Hz range
//! - `ChannelCount`: validates 1–32 channels (one bit per count in a `ChannelSet`)
//! - `SampleFormat`: sample width vs. physical slot width
//! - `StreamDirection`: playback vs. capture, used to index per-direction state

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} outside {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, validated to the range a PCM DAI can carry.
///
/// Valid range: 8000–768000 Hz (8 kHz telephony to 768 kHz PCM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 768000 Hz.
    pub const MAX_HZ: u32 = 768_000;

    /// Create a `SampleRateHz`, returning an error if out of 8000–768000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 768000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if hz < Self::MIN_HZ || hz > Self::MAX_HZ {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        } else {
            Ok(Self(hz))
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for SampleRateHz {
    type Error = OutOfRangeError;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        Self::new(hz)
    }
}

impl From<SampleRateHz> for u32 {
    fn from(rate: SampleRateHz) -> Self {
        rate.0
    }
}

// ── ChannelCount ─────────────────────────────────────────────────────────────

/// Number of interleaved channels in one frame, 1–32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct ChannelCount(u8);

impl ChannelCount {
    /// Mono.
    pub const MONO: Self = Self(1);
    /// Stereo.
    pub const STEREO: Self = Self(2);
    /// Largest channel count a [`ChannelSet`](crate::constraints::ChannelSet) can hold.
    pub const MAX: u8 = 32;

    /// Create a `ChannelCount`, rejecting 0 and counts above 32.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `count == 0` or `count > 32`.
    pub fn new(count: u8) -> Result<Self, OutOfRangeError> {
        if count == 0 || count > Self::MAX {
            Err(OutOfRangeError {
                value: u32::from(count),
                min: 1,
                max: u32::from(Self::MAX),
            })
        } else {
            Ok(Self(count))
        }
    }

    /// Return the channel count.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── SampleFormat ─────────────────────────────────────────────────────────────

/// PCM sample encoding carried on the serial link.
///
/// Only little-endian signed formats are listed: those are the only ones the
/// interface and codec drivers in this workspace can clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleFormat {
    /// Signed 16-bit in a 16-bit container.
    S16Le,
    /// Signed 24-bit in a 32-bit container (low-aligned).
    S24Le,
    /// Signed 24-bit packed in 3 bytes.
    S24_3Le,
    /// Signed 32-bit.
    S32Le,
}

impl SampleFormat {
    /// Every format, in mask-bit order.
    pub const ALL: [Self; 4] = [Self::S16Le, Self::S24Le, Self::S24_3Le, Self::S32Le];

    /// Significant bits per sample.
    #[must_use]
    pub const fn sample_bits(self) -> u8 {
        match self {
            Self::S16Le => 16,
            Self::S24Le | Self::S24_3Le => 24,
            Self::S32Le => 32,
        }
    }

    /// Bits the sample occupies in memory and, by default, on the wire.
    #[must_use]
    pub const fn physical_bits(self) -> u8 {
        match self {
            Self::S16Le => 16,
            Self::S24_3Le => 24,
            Self::S24Le | Self::S32Le => 32,
        }
    }

    /// Bit index of this format inside a [`FormatMask`](crate::constraints::FormatMask).
    #[must_use]
    pub const fn mask_bit(self) -> u32 {
        match self {
            Self::S16Le => 0b0001,
            Self::S24Le => 0b0010,
            Self::S24_3Le => 0b0100,
            Self::S32Le => 0b1000,
        }
    }

    /// Short name, e.g. `"S16_LE"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S16Le => "S16_LE",
            Self::S24Le => "S24_LE",
            Self::S24_3Le => "S24_3LE",
            Self::S32Le => "S32_LE",
        }
    }
}

impl core::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── StreamDirection ──────────────────────────────────────────────────────────

/// Direction of a PCM stream relative to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamDirection {
    /// Host → codec (speaker, headphone).
    Playback,
    /// Codec → host (microphone).
    Capture,
}

impl StreamDirection {
    /// Both directions, playback first.
    pub const ALL: [Self; 2] = [Self::Playback, Self::Capture];

    /// Lower-case name for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Playback => "playback",
            Self::Capture => "capture",
        }
    }
}

impl core::fmt::Display for StreamDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
