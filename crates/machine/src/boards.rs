//! Board profiles
//!
//! Static descriptions of known machine boards, matched by compatible
//! string. Each profile turns into a [`LinkConfig`] that a registry can
//! resolve.
//!
//! | Compatible | Card | Codecs | Rates (Hz) | Directions |
//! |------------|------|--------|------------|------------|
//! | `nxp,imx-audio-tfa98xx` | TFA9912 | 2 × TFA98xx smart amp | 8k 16k 32k 44.1k 48k | both |
//! | `fsl,imx-audio-sph064x` | imx-sph064x | dummy (PDM mic) | 32k 48k 64k | capture |

use platform::{Capabilities, ChannelSet, FormatMask, RateSet, SampleFormat};

use crate::error::{MachineError, TopologyFault};
use crate::link::{ClockPolicy, LinkDirections};
use crate::topology::{ComponentReference, LinkConfig};

/// Static description of one machine board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardProfile {
    /// Compatible string the board is matched by.
    pub compatible: &'static str,
    /// Sound card name.
    pub card: &'static str,
    /// Link name.
    pub link: &'static str,
    /// Stream name.
    pub stream: &'static str,
    /// Property holding the interface reference.
    pub interface_property: &'static str,
    /// Property holding the codec references.
    pub codec_property: &'static str,
    /// Number of codec references, indices `0..codec_count`.
    pub codec_count: u8,
    /// Per-codec prefixes; empty for index defaults.
    pub codec_prefixes: &'static [&'static str],
    /// Rates the board is wired and clocked for.
    pub rates: &'static [u32],
    /// Channel counts.
    pub channels: &'static [u8],
    /// Sample formats.
    pub formats: &'static [SampleFormat],
    /// Directions wired up.
    pub directions: LinkDirections,
    /// Framing and clocking.
    pub clocking: ClockPolicy,
}

/// i.MX + two NXP TFA98xx smart amplifiers.
pub const TFA98XX: BoardProfile = BoardProfile {
    compatible: "nxp,imx-audio-tfa98xx",
    card: "TFA9912",
    link: "tfa98xx",
    stream: "Audio",
    interface_property: "audio-cpu",
    codec_property: "audio-codec",
    codec_count: 2,
    codec_prefixes: &["0", "1"],
    rates: &[8_000, 16_000, 32_000, 44_100, 48_000],
    channels: &[1, 2],
    formats: &SampleFormat::ALL,
    directions: LinkDirections::BOTH,
    // two slots per frame, each as wide as the sample
    clocking: ClockPolicy::I2S,
};

/// i.MX + Knowles SPH064x PDM microphone behind a dummy codec.
pub const SPH064X: BoardProfile = BoardProfile {
    compatible: "fsl,imx-audio-sph064x",
    card: "imx-sph064x",
    link: "sph064x hifi",
    stream: "sph064x hifi",
    interface_property: "audio-cpu",
    codec_property: "snd-soc-dummy",
    codec_count: 1,
    codec_prefixes: &[],
    rates: &[32_000, 48_000, 64_000],
    channels: &[1, 2],
    formats: &[SampleFormat::S16Le, SampleFormat::S24Le, SampleFormat::S32Le],
    directions: LinkDirections::CAPTURE_ONLY,
    // two 32-bit slots whatever the format
    clocking: ClockPolicy::i2s_fixed_slots(32),
};

/// Every known board.
pub const BOARDS: [BoardProfile; 2] = [TFA98XX, SPH064X];

/// Board matching `compatible`.
pub fn find(compatible: &str) -> Option<&'static BoardProfile> {
    BOARDS.iter().find(|b| b.compatible == compatible)
}

impl BoardProfile {
    /// Board-level constraint set.
    pub fn constraints(&self) -> Result<Capabilities, MachineError> {
        let rates = RateSet::from_rates(self.rates)
            .map_err(|_| MachineError::Topology(TopologyFault::NoCommonConfiguration))?;
        let channels = ChannelSet::from_counts(self.channels)
            .map_err(|_| MachineError::Topology(TopologyFault::NoCommonConfiguration))?;
        Ok(Capabilities::new(
            rates,
            channels,
            FormatMask::from_formats(self.formats),
        ))
    }

    /// The link configuration this board describes. The card is named
    /// after the profile; a board description can rename it with
    /// [`LinkConfig::with_card`].
    pub fn link_config(&self) -> Result<LinkConfig, MachineError> {
        let interface = ComponentReference::interface(self.interface_property, 0)?;
        let mut config = LinkConfig::new(self.link, self.stream, interface)?.with_card(self.card)?;
        for index in 0..self.codec_count {
            config = config.with_codec(ComponentReference::codec(self.codec_property, index)?)?;
        }
        if !self.codec_prefixes.is_empty() {
            config = config.with_codec_prefixes(self.codec_prefixes)?;
        }
        Ok(config
            .with_constraints(self.constraints()?)
            .with_directions(self.directions)
            .with_clocking(self.clocking))
    }
}
