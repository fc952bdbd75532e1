//! Mock implementations for testing
//!
//! This module provides a recording [`DaiEndpoint`] for use in unit and
//! integration tests of the machine layer.

#![cfg(any(test, feature = "std"))]

use crate::*;

/// Mock endpoint
///
/// Records every command it receives and can be told to reject
/// `set_format` or `set_capability_constraints` with a chosen fault.
#[derive(Debug, Clone)]
pub struct MockEndpoint {
    /// Driver name.
    pub name: &'static str,
    /// Advertised capabilities.
    pub caps: Capabilities,
    /// Format currently programmed (`None` after `clear_format`).
    pub format: Option<DaiFormat>,
    /// Last constraint set received.
    pub constraints: Option<Capabilities>,
    /// Number of `set_format` calls, including rejected ones.
    pub set_format_calls: usize,
    /// Number of `clear_format` calls.
    pub clear_calls: usize,
    /// Fail `set_format` with this fault.
    pub reject_format: Option<EndpointFault>,
    /// Fail `set_capability_constraints` with this fault.
    pub reject_constraints: Option<EndpointFault>,
    /// Fail `clear_format` with this fault.
    pub reject_clear: Option<EndpointFault>,
}

impl MockEndpoint {
    /// Create new mock endpoint
    pub fn new(name: &'static str, caps: Capabilities) -> Self {
        Self {
            name,
            caps,
            format: None,
            constraints: None,
            set_format_calls: 0,
            clear_calls: 0,
            reject_format: None,
            reject_constraints: None,
            reject_clear: None,
        }
    }

    /// Reject every `set_format` with `fault`.
    #[must_use]
    pub fn rejecting_format(mut self, fault: EndpointFault) -> Self {
        self.reject_format = Some(fault);
        self
    }

    /// Clock role of the programmed format, if any.
    pub fn role(&self) -> Option<ClockRole> {
        self.format.map(|f| f.role)
    }
}

/// Mock endpoint error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError(pub EndpointFault);

impl DaiError for MockError {
    fn fault(&self) -> EndpointFault {
        self.0
    }
}

impl DaiEndpoint for MockEndpoint {
    type Error = MockError;

    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> Capabilities {
        self.caps.clone()
    }

    fn set_capability_constraints(&mut self, allowed: &Capabilities) -> Result<(), Self::Error> {
        if let Some(fault) = self.reject_constraints {
            return Err(MockError(fault));
        }
        self.constraints = Some(allowed.clone());
        Ok(())
    }

    fn set_format(&mut self, format: &DaiFormat) -> Result<(), Self::Error> {
        self.set_format_calls = self.set_format_calls.saturating_add(1);
        if let Some(fault) = self.reject_format {
            return Err(MockError(fault));
        }
        self.format = Some(*format);
        Ok(())
    }

    fn clear_format(&mut self) -> Result<(), Self::Error> {
        self.clear_calls = self.clear_calls.saturating_add(1);
        if let Some(fault) = self.reject_clear {
            return Err(MockError(fault));
        }
        self.format = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn format() -> DaiFormat {
        let layout = FrameLayout::for_stream(2, SampleFormat::S16Le, None, 2).unwrap();
        DaiFormat {
            protocol: DaiProtocol::I2s,
            inversion: ClockInversion::NormalBitNormalFrame,
            role: ClockRole::Consumer,
            layout,
            clocks: ClockPlan::derive(48_000, &layout, None).unwrap(),
            format: SampleFormat::S16Le,
            channels: 2,
        }
    }

    #[test]
    fn test_mock_endpoint_records_commands() {
        let mut ep = MockEndpoint::new("codec", Capabilities::default());

        ep.set_format(&format()).unwrap();
        assert_eq!(ep.role(), Some(ClockRole::Consumer));
        assert_eq!(ep.set_format_calls, 1);

        ep.clear_format().unwrap();
        assert_eq!(ep.format, None);
        assert_eq!(ep.clear_calls, 1);
    }

    #[test]
    fn test_mock_endpoint_rejects() {
        let mut ep = MockEndpoint::new("codec", Capabilities::default())
            .rejecting_format(EndpointFault::Bus);

        assert_eq!(ep.set_format(&format()), Err(MockError(EndpointFault::Bus)));
        assert_eq!(ep.format, None);
        assert_eq!(ep.set_format_calls, 1);
    }
}
