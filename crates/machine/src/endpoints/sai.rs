//! Serial Audio Interface (SAI) block as a link interface endpoint.
//!
//! Models one STM32H7 SAI sub-block: the frame is built from `slot_count`
//! slots of `slot_size` bits, and in master mode BCLK (or MCLK, when the
//! board routes one out) is divided down from the SAI kernel clock with the
//! 6-bit MCKDIV field.
//!
//! # Limits (RM0433 §51.4)
//!
//! | Field   | Range |
//! |---------|-------|
//! | FRL+1   | 8–256 bits per frame |
//! | NBSLOT+1| 1–16 slots |
//! | SLOTSZ  | 16, 24 (= data size) or 32 bits |
//! | MCKDIV  | 1–63 |
//!
//! The divider must be exact: a rate the kernel clock cannot divide down to
//! is refused with [`EndpointFault::ClockUnreachable`] rather than played
//! off-pitch.

use platform::config::STANDARD_RATES;
use platform::{
    Capabilities, ChannelSet, ClockRole, DaiEndpoint, DaiError, DaiFormat, DaiProtocol,
    EndpointFault, FormatMask, RateSet, SampleRateHz,
};

/// Largest frame the FRL field can describe.
pub const MAX_FRAME_BITS: u16 = 256;
/// Smallest frame.
pub const MIN_FRAME_BITS: u16 = 8;
/// Largest slot count (NBSLOT + 1).
pub const MAX_SLOTS: u8 = 16;
/// Largest master clock divider (6-bit MCKDIV).
pub const MAX_MCKDIV: u32 = 63;
/// PLL3P output feeding SAI1 on the reference board (256 × 192 kHz).
pub const SAI1_KERNEL_CLOCK_HZ: u32 = 49_152_000;

/// SAI configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaiError {
    /// Frame length outside 8–256 bits.
    #[error("{bits}-bit frame outside 8..=256")]
    FrameLength {
        /// Requested frame length.
        bits: u16,
    },
    /// More than 16 slots.
    #[error("{slots} slots exceed 16")]
    TooManySlots {
        /// Requested slot count.
        slots: u8,
    },
    /// Slot size the block cannot produce.
    #[error("{bits}-bit slot not supported")]
    SlotSize {
        /// Requested slot width.
        bits: u8,
    },
    /// Protocol the block is not wired for.
    #[error("protocol not supported")]
    Protocol,
    /// Kernel clock cannot be divided down to the target exactly.
    #[error("{target_hz} Hz not reachable from kernel clock")]
    ClockDivider {
        /// BCLK or MCLK target.
        target_hz: u32,
    },
    /// Request outside the constraints set at startup.
    #[error("format outside constraints")]
    OutsideConstraints,
}

impl DaiError for SaiError {
    fn fault(&self) -> EndpointFault {
        match self {
            Self::ClockDivider { .. } => EndpointFault::ClockUnreachable,
            _ => EndpointFault::UnsupportedFormat,
        }
    }
}

/// Block master/slave mode (MODE field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaiMode {
    /// Block drives SCK and FS.
    Master,
    /// Block follows external SCK and FS.
    Slave,
}

/// Register-level configuration of one programmed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SaiBlockConfig {
    /// MODE.
    pub mode: SaiMode,
    /// FRL + 1.
    pub frame_length: u16,
    /// NBSLOT + 1.
    pub slot_count: u8,
    /// Slot width in bits.
    pub slot_size: u8,
    /// DS, in bits.
    pub data_size: u8,
    /// MCKDIV in master mode.
    pub mckdiv: Option<u8>,
    /// MCLK output enabled.
    pub mclk_out: bool,
}

/// One SAI sub-block acting as the link interface.
#[derive(Debug, Clone)]
pub struct SaiInterface {
    name: &'static str,
    capabilities: Capabilities,
    kernel_clock_hz: u32,
    block: Option<SaiBlockConfig>,
    constraints: Option<Capabilities>,
}

impl SaiInterface {
    /// Sub-block `name` clocked from `kernel_clock_hz`.
    pub fn new(name: &'static str, kernel_clock_hz: u32, capabilities: Capabilities) -> Self {
        Self {
            name,
            capabilities,
            kernel_clock_hz,
            block: None,
            constraints: None,
        }
    }

    /// SAI1 block A on the STM32H743 reference board.
    ///
    /// Advertises every standard rate whose 256 fs MCLK divides the 49.152 MHz
    /// kernel clock (8 kHz to 192 kHz, 48 kHz family), 1–16 channels and every
    /// sample format.
    pub fn stm32h7_sai1() -> Self {
        let mut rates = RateSet::new();
        for &hz in &STANDARD_RATES {
            let reachable = hz
                .checked_mul(256)
                .and_then(|mclk| divider(SAI1_KERNEL_CLOCK_HZ, mclk))
                .is_some();
            if let (true, Ok(rate)) = (reachable, SampleRateHz::new(hz)) {
                // Fewer reachable rates than STANDARD_RATES.
                let _ = rates.insert(rate);
            }
        }
        let channels = ChannelSet::range(1, MAX_SLOTS).unwrap_or(ChannelSet::STEREO);
        Self::new(
            "sai1-a",
            SAI1_KERNEL_CLOCK_HZ,
            Capabilities::new(rates, channels, FormatMask::ALL),
        )
    }

    /// Currently programmed block, if any.
    pub fn block(&self) -> Option<&SaiBlockConfig> {
        self.block.as_ref()
    }

    /// Constraints received at startup.
    pub fn constraints(&self) -> Option<&Capabilities> {
        self.constraints.as_ref()
    }

    fn configure(&self, format: &DaiFormat) -> Result<SaiBlockConfig, SaiError> {
        if let Some(allowed) = &self.constraints {
            allowed
                .permits(format.clocks.fsync_hz, format.channels, format.format)
                .map_err(|_| SaiError::OutsideConstraints)?;
        }
        if format.protocol == DaiProtocol::DspA {
            return Err(SaiError::Protocol);
        }

        let layout = format.layout;
        let frame_length = layout.frame_bits();
        if !(MIN_FRAME_BITS..=MAX_FRAME_BITS).contains(&frame_length) {
            return Err(SaiError::FrameLength { bits: frame_length });
        }
        if layout.slots > MAX_SLOTS {
            return Err(SaiError::TooManySlots {
                slots: layout.slots,
            });
        }
        if !matches!(layout.slot_width, 16 | 24 | 32) {
            return Err(SaiError::SlotSize {
                bits: layout.slot_width,
            });
        }

        let (mode, mckdiv) = match format.role {
            ClockRole::Provider => {
                let target_hz = format.clocks.mclk_hz.unwrap_or(format.clocks.bclk_hz);
                let div = divider(self.kernel_clock_hz, target_hz)
                    .ok_or(SaiError::ClockDivider { target_hz })?;
                (SaiMode::Master, Some(div))
            }
            ClockRole::Consumer => (SaiMode::Slave, None),
        };

        Ok(SaiBlockConfig {
            mode,
            frame_length,
            slot_count: layout.slots,
            slot_size: layout.slot_width,
            data_size: layout.sample_width,
            mckdiv,
            mclk_out: format.clocks.mclk_hz.is_some(),
        })
    }
}

/// Exact divider `kernel / target` in `1..=MAX_MCKDIV`.
fn divider(kernel_hz: u32, target_hz: u32) -> Option<u8> {
    if target_hz == 0 || kernel_hz.checked_rem(target_hz)? != 0 {
        return None;
    }
    let div = kernel_hz.checked_div(target_hz)?;
    if (1..=MAX_MCKDIV).contains(&div) {
        u8::try_from(div).ok()
    } else {
        None
    }
}

impl DaiEndpoint for SaiInterface {
    type Error = SaiError;

    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    fn set_capability_constraints(&mut self, allowed: &Capabilities) -> Result<(), Self::Error> {
        self.constraints = Some(allowed.clone());
        Ok(())
    }

    fn set_format(&mut self, format: &DaiFormat) -> Result<(), Self::Error> {
        let block = self.configure(format)?;
        debug!(
            "{}: frame {} bits, {} slots, mckdiv {}",
            self.name,
            block.frame_length,
            block.slot_count,
            block.mckdiv.unwrap_or(0)
        );
        self.block = Some(block);
        Ok(())
    }

    fn clear_format(&mut self) -> Result<(), Self::Error> {
        self.block = None;
        Ok(())
    }
}
