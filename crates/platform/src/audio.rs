//! Endpoint command interface
//!
//! A link is made of one serial-audio *interface* (the SoC side: SAI, I2S
//! controller) and one or more *codecs*. Both sides are driven through the
//! same [`DaiEndpoint`] trait so the machine layer never needs to know which
//! kind of device it is talking to.

use crate::audio_config::{ClockPlan, FrameLayout};
use crate::audio_types::SampleFormat;
use crate::constraints::Capabilities;

/// Position of an endpoint on a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndpointRole {
    /// Host-side serial audio interface.
    Interface,
    /// Converter on the far side of the serial link.
    Codec,
}

/// Who generates the bit clock and frame sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRole {
    /// Drives BCLK and FSYNC (clock master).
    Provider,
    /// Follows BCLK and FSYNC (clock slave).
    Consumer,
}

/// Framing of samples on the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DaiProtocol {
    /// Philips I2S: data one BCLK after the FSYNC edge.
    #[default]
    I2s,
    /// Left-justified: data on the FSYNC edge.
    LeftJustified,
    /// DSP mode A (short frame sync, TDM).
    DspA,
}

/// Clock polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClockInversion {
    /// Normal bit clock, normal frame sync.
    #[default]
    NormalBitNormalFrame,
    /// Normal bit clock, inverted frame sync.
    NormalBitInvertedFrame,
    /// Inverted bit clock, normal frame sync.
    InvertedBitNormalFrame,
    /// Inverted bit clock, inverted frame sync.
    InvertedBitInvertedFrame,
}

/// Everything one endpoint needs to program its serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaiFormat {
    /// Frame protocol.
    pub protocol: DaiProtocol,
    /// Clock polarity.
    pub inversion: ClockInversion,
    /// This endpoint's clock role.
    pub role: ClockRole,
    /// Slot layout shared by every endpoint.
    pub layout: FrameLayout,
    /// Clock frequencies shared by every endpoint.
    pub clocks: ClockPlan,
    /// Sample encoding.
    pub format: SampleFormat,
    /// Active channels (≤ `layout.slots`).
    pub channels: u8,
}

/// Coarse classification of an endpoint failure.
///
/// Drivers have their own error types; the machine layer only needs to know
/// what kind of failure it was, the same way `embedded_hal::i2c::Error::kind`
/// classifies bus errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EndpointFault {
    /// Control bus (I2C/SPI) transfer failed.
    Bus,
    /// The endpoint cannot carry this format or layout.
    UnsupportedFormat,
    /// The requested clocks cannot be generated from the available sources.
    ClockUnreachable,
    /// The endpoint is in use and cannot be reconfigured now.
    Busy,
    /// Anything else.
    Other,
}

impl EndpointFault {
    /// Short name for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bus => "bus error",
            Self::UnsupportedFormat => "unsupported format",
            Self::ClockUnreachable => "clock unreachable",
            Self::Busy => "busy",
            Self::Other => "other",
        }
    }
}

impl core::fmt::Display for EndpointFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint driver error.
pub trait DaiError: core::fmt::Debug {
    /// Classify this error.
    fn fault(&self) -> EndpointFault;
}

impl DaiError for core::convert::Infallible {
    fn fault(&self) -> EndpointFault {
        match *self {}
    }
}

impl DaiError for EndpointFault {
    fn fault(&self) -> EndpointFault {
        *self
    }
}

/// A serial-audio endpoint: interface or codec.
///
/// Commands are blocking. They are issued under the link lock, in a fixed
/// order (interface first, then codecs), and must not be called concurrently.
pub trait DaiEndpoint {
    /// Error type
    type Error: DaiError;

    /// Driver name, e.g. `"sai1-a"` or `"es9038q2m"`.
    fn name(&self) -> &str;

    /// Parameter space this endpoint can carry.
    fn capabilities(&self) -> Capabilities;

    /// Narrow the endpoint to the link-wide allowed set before a stream opens.
    fn set_capability_constraints(&mut self, allowed: &Capabilities) -> Result<(), Self::Error>;

    /// Program the serial port for one stream configuration.
    fn set_format(&mut self, format: &DaiFormat) -> Result<(), Self::Error>;

    /// Return to the unconfigured state.
    fn clear_format(&mut self) -> Result<(), Self::Error>;
}

impl<T: DaiEndpoint + ?Sized> DaiEndpoint for &mut T {
    type Error = T::Error;

    fn name(&self) -> &str {
        T::name(self)
    }

    fn capabilities(&self) -> Capabilities {
        T::capabilities(self)
    }

    fn set_capability_constraints(&mut self, allowed: &Capabilities) -> Result<(), Self::Error> {
        T::set_capability_constraints(self, allowed)
    }

    fn set_format(&mut self, format: &DaiFormat) -> Result<(), Self::Error> {
        T::set_format(self, format)
    }

    fn clear_format(&mut self) -> Result<(), Self::Error> {
        T::clear_format(self)
    }
}
