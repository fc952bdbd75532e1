//! ES9038Q2M link endpoint
//!
//! Communicates with the chip via I²C. Uses the blocking
//! `embedded_hal::i2c::I2c` trait: endpoint commands are issued under the
//! link lock and must complete before the next one.
//!
//! # I²C Address
//!
//! | ADDR pin | Address |
//! |----------|---------|
//! | GND      | `0x48`  |
//! | VDD      | `0x49`  |

use embedded_hal::i2c::I2c;
use platform::config::STANDARD_RATES;
use platform::{
    Capabilities, ChannelSet, ClockInversion, ClockRole, DaiEndpoint, DaiError, DaiFormat,
    DaiProtocol, EndpointFault, FormatMask, RateSet,
};

use super::registers::*;

/// Default I²C address (ADDR pin = GND)
pub const I2C_ADDR: u8 = 0x48;

/// Highest PCM rate the I²S input accepts.
const MAX_RATE_HZ: u32 = 384_000;

/// ES9038Q2M endpoint error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
pub enum DacError<E> {
    /// I²C transfer failed.
    #[error("I2C bus error")]
    Bus(E),
    /// Protocol, polarity or word length the input port cannot take.
    #[error("serial format not supported")]
    Unsupported,
}

impl<E: embedded_hal::i2c::Error> DaiError for DacError<E> {
    fn fault(&self) -> EndpointFault {
        match self {
            Self::Bus(_) => EndpointFault::Bus,
            Self::Unsupported => EndpointFault::UnsupportedFormat,
        }
    }
}

/// ES9038Q2M DAC as a codec endpoint
pub struct Es9038q2m<I> {
    i2c: I,
    address: u8,
    attenuation: u8,
    constraints: Option<Capabilities>,
}

impl<I: I2c> Es9038q2m<I> {
    /// Create a driver for the chip at [`I2C_ADDR`].
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, I2C_ADDR)
    }

    /// Create a driver for a chip strapped to `address`.
    pub fn with_address(i2c: I, address: u8) -> Self {
        Self {
            i2c,
            address,
            attenuation: VOLUME_0DB,
            constraints: None,
        }
    }

    /// Attenuation restored on every `set_format` (0x00 = 0 dB, 0xFF = mute).
    #[must_use]
    pub fn with_attenuation(mut self, attenuation: u8) -> Self {
        self.attenuation = attenuation;
        self
    }

    /// Constraints received at startup.
    pub fn constraints(&self) -> Option<&Capabilities> {
        self.constraints.as_ref()
    }

    /// Give back the bus.
    pub fn release(self) -> I {
        self.i2c
    }

    /// Write a single register over I²C.
    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), DacError<I::Error>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(DacError::Bus)
    }

    fn write_volume(&mut self, attenuation: u8) -> Result<(), DacError<I::Error>> {
        self.write_reg(REG_VOLUME_LEFT, attenuation)?;
        self.write_reg(REG_VOLUME_RIGHT, attenuation)
    }

    /// Mute, then soft reset (register 0x00 bit 0, self-clearing).
    ///
    /// The mute comes first: the chip resets to 0 dB.
    pub fn reset(&mut self) -> Result<(), DacError<I::Error>> {
        self.write_volume(VOLUME_MUTE)?;
        self.write_reg(REG_SYSTEM, SYSTEM_SOFT_RESET)
    }

    /// REG_INPUT_CONFIG value for `format`.
    fn input_config(format: &DaiFormat) -> Result<u8, DacError<I::Error>> {
        let mode = match format.protocol {
            DaiProtocol::I2s => INPUT_MODE_I2S,
            DaiProtocol::LeftJustified => INPUT_MODE_LEFT_JUSTIFIED,
            DaiProtocol::DspA => return Err(DacError::Unsupported),
        };
        if format.inversion != ClockInversion::NormalBitNormalFrame || format.layout.slots != 2 {
            return Err(DacError::Unsupported);
        }
        let word = match format.layout.slot_width {
            16 => INPUT_WORD_16BIT,
            24 => INPUT_WORD_24BIT,
            32 => INPUT_WORD_32BIT,
            _ => return Err(DacError::Unsupported),
        };
        Ok(word | mode)
    }
}

impl<I: I2c> DaiEndpoint for Es9038q2m<I> {
    type Error = DacError<I::Error>;

    fn name(&self) -> &str {
        "es9038q2m"
    }

    fn capabilities(&self) -> Capabilities {
        let mut rates = RateSet::new();
        for &hz in STANDARD_RATES.iter().filter(|&&hz| hz <= MAX_RATE_HZ) {
            if let Ok(rate) = platform::SampleRateHz::new(hz) {
                let _ = rates.insert(rate);
            }
        }
        Capabilities::new(rates, ChannelSet::MONO_STEREO, FormatMask::ALL)
    }

    fn set_capability_constraints(&mut self, allowed: &Capabilities) -> Result<(), Self::Error> {
        self.constraints = Some(allowed.clone());
        Ok(())
    }

    fn set_format(&mut self, format: &DaiFormat) -> Result<(), Self::Error> {
        let input = Self::input_config(format)?;
        let master = match format.role {
            ClockRole::Consumer => MASTER_MODE_SLAVE,
            ClockRole::Provider => MASTER_MODE_ENABLE,
        };
        self.write_reg(REG_INPUT_CONFIG, input)?;
        self.write_reg(REG_MASTER_MODE, master)?;
        self.write_volume(self.attenuation)?;
        debug!("ES9038Q2M: input config {}, master mode {}", input, master);
        Ok(())
    }

    fn clear_format(&mut self) -> Result<(), Self::Error> {
        self.write_volume(VOLUME_MUTE)
    }
}
