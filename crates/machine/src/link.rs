//! Resolved audio links
//!
//! An [`AudioLink`] is the product of [`resolve`](crate::topology::resolve):
//! exactly one interface driver, one or more codec drivers in resolver order,
//! and the immutable [`LinkTopology`] describing them. It exists only fully
//! resolved; the endpoint set never changes afterwards.

use heapless::{String, Vec};
use platform::config::{LABEL_LEN, MAX_CODECS, NAME_LEN, PREFIX_LEN};
use platform::{
    Capabilities, ClockInversion, ClockPlan, ClockRole, DaiFormat, DaiProtocol, EndpointRole,
    FrameLayout, SampleFormat, StreamDirection, I2S_MIN_SLOTS,
};

use crate::error::TopologyFault;

/// Endpoint or link name.
pub type EndpointName = String<NAME_LEN>;
/// Per-codec name prefix.
pub type EndpointPrefix = String<PREFIX_LEN>;
/// Display label, `"<prefix> <name>"` for prefixed codecs.
pub type EndpointLabel = String<LABEL_LEN>;

/// Identity of one endpoint on a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointInfo {
    /// Driver name as reported by the endpoint.
    pub name: EndpointName,
    /// Interface or codec.
    pub role: EndpointRole,
    /// Codec prefix, unique within the link.
    pub prefix: Option<EndpointPrefix>,
    /// Name used in logs and errors.
    pub label: EndpointLabel,
    /// What the endpoint advertised at resolve time.
    pub capabilities: Capabilities,
}

impl EndpointInfo {
    /// Build from a driver name, an optional prefix and its capabilities.
    ///
    /// # Errors
    ///
    /// [`TopologyFault::NameTooLong`] if the name or prefix overflows.
    pub fn new(
        name: &str,
        role: EndpointRole,
        prefix: Option<&str>,
        capabilities: Capabilities,
    ) -> Result<Self, TopologyFault> {
        let name = EndpointName::try_from(name).map_err(|_| TopologyFault::NameTooLong)?;
        let prefix = prefix
            .map(|p| EndpointPrefix::try_from(p).map_err(|_| TopologyFault::NameTooLong))
            .transpose()?;
        let label = make_label(&name, prefix.as_deref())?;
        Ok(Self {
            name,
            role,
            prefix,
            label,
            capabilities,
        })
    }
}

fn make_label(name: &str, prefix: Option<&str>) -> Result<EndpointLabel, TopologyFault> {
    let mut label = EndpointLabel::new();
    if let Some(prefix) = prefix {
        label.push_str(prefix).map_err(|_| TopologyFault::NameTooLong)?;
        label.push(' ').map_err(|_| TopologyFault::NameTooLong)?;
    }
    label.push_str(name).map_err(|_| TopologyFault::NameTooLong)?;
    Ok(label)
}

/// Directions a link carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkDirections {
    /// Host → codec.
    pub playback: bool,
    /// Codec → host.
    pub capture: bool,
}

impl LinkDirections {
    /// Playback and capture.
    pub const BOTH: Self = Self {
        playback: true,
        capture: true,
    };
    /// Capture only (microphone boards).
    pub const CAPTURE_ONLY: Self = Self {
        playback: false,
        capture: true,
    };
    /// Playback only (amplifier boards).
    pub const PLAYBACK_ONLY: Self = Self {
        playback: true,
        capture: false,
    };

    /// `true` if streams in `direction` may open.
    #[must_use]
    pub const fn allows(self, direction: StreamDirection) -> bool {
        match direction {
            StreamDirection::Playback => self.playback,
            StreamDirection::Capture => self.capture,
        }
    }
}

impl Default for LinkDirections {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Board-fixed framing and clocking rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockPolicy {
    /// Frame protocol.
    pub protocol: DaiProtocol,
    /// Clock polarity.
    pub inversion: ClockInversion,
    /// Fixed slot width in bits; `None` follows the sample format.
    pub slot_width: Option<u8>,
    /// Minimum slots per frame.
    pub min_slots: u8,
    /// MCLK/fs ratio when the interface drives MCLK.
    pub mclk_fs: Option<u16>,
}

impl ClockPolicy {
    /// Plain I2S, slot width following the format, no MCLK.
    pub const I2S: Self = Self {
        protocol: DaiProtocol::I2s,
        inversion: ClockInversion::NormalBitNormalFrame,
        slot_width: None,
        min_slots: I2S_MIN_SLOTS,
        mclk_fs: None,
    };

    /// I2S with every slot forced to `width` bits.
    #[must_use]
    pub const fn i2s_fixed_slots(width: u8) -> Self {
        Self {
            slot_width: Some(width),
            ..Self::I2S
        }
    }

    /// Also drive MCLK at `ratio` × fs.
    #[must_use]
    pub const fn with_mclk(self, ratio: u16) -> Self {
        Self {
            mclk_fs: Some(ratio),
            ..self
        }
    }
}

impl Default for ClockPolicy {
    fn default() -> Self {
        Self::I2S
    }
}

/// Immutable description of a resolved link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTopology {
    /// Sound card name, e.g. `"TFA9912"`.
    pub card: EndpointName,
    /// Link name, e.g. `"tfa98xx"`.
    pub name: EndpointName,
    /// Stream name, e.g. `"Audio"`.
    pub stream_name: EndpointName,
    /// The interface endpoint.
    pub interface: EndpointInfo,
    /// Codec endpoints in resolver order.
    pub codecs: Vec<EndpointInfo, MAX_CODECS>,
    /// Board constraints ∩ every endpoint's capabilities.
    pub allowed: Capabilities,
    /// Directions this link carries.
    pub directions: LinkDirections,
    /// Framing and clocking rules.
    pub clocking: ClockPolicy,
}

impl LinkTopology {
    /// Label of codec `index`, if it exists.
    #[must_use]
    pub fn codec_label(&self, index: usize) -> Option<&str> {
        self.codecs.get(index).map(|c| c.label.as_str())
    }
}

/// Requested stream parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwParams {
    /// Sample rate in Hz.
    pub rate: u32,
    /// Channel count.
    pub channels: u8,
    /// Sample format.
    pub format: SampleFormat,
}

impl HwParams {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(rate: u32, channels: u8, format: SampleFormat) -> Self {
        Self {
            rate,
            channels,
            format,
        }
    }
}

/// The configuration committed to every endpoint by the last successful
/// negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedConfig {
    /// What was asked for.
    pub params: HwParams,
    /// Slot layout.
    pub layout: FrameLayout,
    /// Derived clocks.
    pub clocks: ClockPlan,
    /// Frame protocol.
    pub protocol: DaiProtocol,
    /// Clock polarity.
    pub inversion: ClockInversion,
    /// Interface clock role.
    pub interface_role: ClockRole,
    /// Clock role per codec, in resolver order.
    pub codec_roles: Vec<ClockRole, MAX_CODECS>,
}

impl NegotiatedConfig {
    /// The command sent to an endpoint playing `role`.
    #[must_use]
    pub fn format_for(&self, role: ClockRole) -> DaiFormat {
        DaiFormat {
            protocol: self.protocol,
            inversion: self.inversion,
            role,
            layout: self.layout,
            clocks: self.clocks,
            format: self.params.format,
            channels: self.params.channels,
        }
    }

    /// Clock role of codec `index`.
    #[must_use]
    pub fn codec_role(&self, index: usize) -> Option<ClockRole> {
        self.codec_roles.get(index).copied()
    }
}

/// One interface, one or more codecs, and the negotiated state between them.
#[derive(Debug)]
pub struct AudioLink<I, C> {
    pub(crate) topology: LinkTopology,
    pub(crate) interface: I,
    pub(crate) codecs: Vec<C, MAX_CODECS>,
    pub(crate) negotiated: Option<NegotiatedConfig>,
}

impl<I, C> AudioLink<I, C> {
    /// Static description of this link.
    pub fn topology(&self) -> &LinkTopology {
        &self.topology
    }

    /// The interface driver.
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Codec driver `index`, in resolver order.
    pub fn codec(&self, index: usize) -> Option<&C> {
        self.codecs.get(index)
    }

    /// Driver access for settings outside the link's format, such as
    /// volume. Changing the serial format here bypasses negotiation.
    pub fn interface_mut(&mut self) -> &mut I {
        &mut self.interface
    }

    /// Mutable codec driver `index`.
    pub fn codec_mut(&mut self, index: usize) -> Option<&mut C> {
        self.codecs.get_mut(index)
    }

    /// Number of codecs (≥ 1).
    pub fn codec_count(&self) -> usize {
        self.codecs.len()
    }

    /// Configuration committed by the last successful negotiation.
    pub fn negotiated(&self) -> Option<&NegotiatedConfig> {
        self.negotiated.as_ref()
    }

    /// Give back the drivers.
    pub fn into_parts(self) -> (I, Vec<C, MAX_CODECS>) {
        (self.interface, self.codecs)
    }
}
