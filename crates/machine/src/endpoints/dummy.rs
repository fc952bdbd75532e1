//! Placeholder codec for links whose far end needs no control.
//!
//! PDM microphones and other bus-less converters have no registers to
//! program, but a link still needs one codec endpoint. [`DummyCodec`]
//! accepts every format and records the last one so callers can inspect
//! what the link negotiated.

use core::convert::Infallible;

use platform::{Capabilities, ChannelSet, DaiEndpoint, DaiFormat, FormatMask, RateSet};

/// Name the dummy codec reports.
pub const DUMMY_CODEC_NAME: &str = "snd-soc-dummy-dai";

/// Codec endpoint that accepts everything.
#[derive(Debug, Clone, Default)]
pub struct DummyCodec {
    format: Option<DaiFormat>,
}

impl DummyCodec {
    /// Unconfigured.
    pub const fn new() -> Self {
        Self { format: None }
    }

    /// Last format accepted, until cleared.
    pub fn format(&self) -> Option<&DaiFormat> {
        self.format.as_ref()
    }
}

impl DaiEndpoint for DummyCodec {
    type Error = Infallible;

    fn name(&self) -> &str {
        DUMMY_CODEC_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new(
            RateSet::standard(),
            ChannelSet::range(1, platform::ChannelCount::MAX).unwrap_or(ChannelSet::STEREO),
            FormatMask::ALL,
        )
    }

    fn set_capability_constraints(&mut self, _allowed: &Capabilities) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_format(&mut self, format: &DaiFormat) -> Result<(), Infallible> {
        self.format = Some(*format);
        Ok(())
    }

    fn clear_format(&mut self) -> Result<(), Infallible> {
        self.format = None;
        Ok(())
    }
}
