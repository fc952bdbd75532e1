//! Serial-audio frame layout and clock derivation.
//!
//! Every endpoint on a link must agree on the same frame, so the frame and
//! the clocks that follow from it are computed once per negotiation and
//! handed to each endpoint inside a [`DaiFormat`](crate::audio::DaiFormat).
//!
//! # Clock Chain
//!
//! ```text
//! MCLK  = mclk_fs × fs                  (only when the board drives MCLK)
//! BCLK  = slots × slot_width × fs       (bit clock)
//! FSYNC = fs                            (frame sync / LRCLK)
//! ```
//!
//! For 2 × 32-bit slots at 48 kHz: BCLK = 64 × 48 000 = 3.072 MHz.
//! For 2 × 32-bit slots at 192 kHz with 256 fs MCLK:
//! BCLK = 12.288 MHz, MCLK = 49.152 MHz (MCLK / BCLK = 4).

use crate::audio_types::SampleFormat;

/// Minimum number of slots in an I2S / left-justified frame (left + right).
pub const I2S_MIN_SLOTS: u8 = 2;

/// Error deriving a frame layout or its clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// The fixed slot width is narrower than the sample container.
    #[error("{slot_width}-bit slot cannot carry {format}")]
    SlotTooNarrow {
        /// Board slot width in bits.
        slot_width: u8,
        /// Requested sample format.
        format: SampleFormat,
    },
    /// A clock frequency does not fit in 32 bits.
    #[error("clock for {rate_hz} Hz overflows")]
    Overflow {
        /// Requested sample rate.
        rate_hz: u32,
    },
}

/// Layout of one frame on the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameLayout {
    /// Number of time slots per frame.
    pub slots: u8,
    /// Width of each slot in bits (BCLK cycles).
    pub slot_width: u8,
    /// Significant bits of the sample inside each slot.
    pub sample_width: u8,
}

impl FrameLayout {
    /// Lay out a stream of `channels` × `format`.
    ///
    /// `fixed_slot_width` forces every slot to that many bits (a PDM mic
    /// board clocks 32-bit slots whatever the sample format); `None` uses
    /// the format's physical width. The slot count is at least
    /// `min_slots`, so a mono stream still occupies a full I2S frame.
    ///
    /// # Errors
    ///
    /// [`ClockError::SlotTooNarrow`] if a fixed slot is narrower than the format.
    pub fn for_stream(
        channels: u8,
        format: SampleFormat,
        fixed_slot_width: Option<u8>,
        min_slots: u8,
    ) -> Result<Self, ClockError> {
        let slot_width = match fixed_slot_width {
            Some(width) if width < format.physical_bits() => {
                return Err(ClockError::SlotTooNarrow {
                    slot_width: width,
                    format,
                })
            }
            Some(width) => width,
            None => format.physical_bits(),
        };
        Ok(Self {
            slots: channels.max(min_slots),
            slot_width,
            sample_width: format.sample_bits(),
        })
    }

    /// Bits per frame = BCLK cycles per FSYNC period.
    #[must_use]
    pub fn frame_bits(&self) -> u16 {
        u16::from(self.slots).saturating_mul(u16::from(self.slot_width))
    }
}

/// Clock frequencies implied by a sample rate and a [`FrameLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Frame sync frequency (= sample rate) in Hz.
    pub fsync_hz: u32,
    /// Bit clock in Hz.
    pub bclk_hz: u32,
    /// Master clock in Hz, when the board drives one.
    pub mclk_hz: Option<u32>,
}

impl ClockPlan {
    /// Derive the clocks for `rate_hz` over `layout`.
    ///
    /// `mclk_fs` is the MCLK/fs ratio (e.g. 256) when the interface must
    /// output a master clock; `None` leaves MCLK to the codec.
    ///
    /// # Errors
    ///
    /// [`ClockError::Overflow`] if BCLK or MCLK exceeds `u32::MAX` Hz.
    pub fn derive(
        rate_hz: u32,
        layout: &FrameLayout,
        mclk_fs: Option<u16>,
    ) -> Result<Self, ClockError> {
        let overflow = ClockError::Overflow { rate_hz };
        let bclk_hz = rate_hz
            .checked_mul(u32::from(layout.frame_bits()))
            .ok_or(overflow)?;
        let mclk_hz = match mclk_fs {
            Some(ratio) => Some(rate_hz.checked_mul(u32::from(ratio)).ok_or(overflow)?),
            None => None,
        };
        Ok(Self {
            fsync_hz: rate_hz,
            bclk_hz,
            mclk_hz,
        })
    }
}
