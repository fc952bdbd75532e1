//! Machine layer errors

use platform::{EndpointFault, SampleFormat, StreamDirection};

use crate::link::EndpointLabel;
use crate::topology::ComponentReference;

/// Request parameter that fell outside the link's allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    /// Sample rate (Hz).
    Rate(u32),
    /// Channel count.
    Channels(u8),
    /// Sample format.
    Format(SampleFormat),
    /// Stream direction not carried by this link.
    Direction(StreamDirection),
}

impl core::fmt::Display for Parameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Rate(hz) => write!(f, "rate {hz} Hz"),
            Self::Channels(n) => write!(f, "{n} channels"),
            Self::Format(format) => write!(f, "format {format}"),
            Self::Direction(dir) => write!(f, "{dir} direction"),
        }
    }
}

impl From<platform::Mismatch> for Parameter {
    fn from(mismatch: platform::Mismatch) -> Self {
        match mismatch {
            platform::Mismatch::Rate(hz) => Self::Rate(hz),
            platform::Mismatch::Channels(n) => Self::Channels(n),
            platform::Mismatch::Format(format) => Self::Format(format),
        }
    }
}

/// Structural defect in a link description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopologyFault {
    /// No codec reference was supplied.
    NoCodecs,
    /// More codec references than a link can hold.
    TooManyCodecs,
    /// The same component is referenced twice.
    DuplicateComponent,
    /// Two codecs would carry the same display label.
    DuplicateLabel,
    /// Prefixes were given, but not one per codec.
    PrefixMismatch,
    /// A reference's role does not match its position.
    RoleMismatch,
    /// A name or prefix does not fit its fixed-capacity buffer.
    NameTooLong,
    /// The endpoints share no rate, channel count or format.
    NoCommonConfiguration,
}

impl core::fmt::Display for TopologyFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::NoCodecs => "no codec references",
            Self::TooManyCodecs => "too many codec references",
            Self::DuplicateComponent => "component referenced twice",
            Self::DuplicateLabel => "duplicate codec label",
            Self::PrefixMismatch => "codec prefix count does not match codec count",
            Self::RoleMismatch => "reference role does not match its position",
            Self::NameTooLong => "name or prefix too long",
            Self::NoCommonConfiguration => "endpoints share no common configuration",
        })
    }
}

/// Outcome of reverting endpoints after a partial commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rollback {
    /// Nothing had been committed before the failure.
    NotNeeded,
    /// Every committed endpoint was reverted.
    Completed,
    /// At least one endpoint refused the revert; hardware state is unknown.
    Incomplete,
}

impl core::fmt::Display for Rollback {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::NotNeeded => "no rollback needed",
            Self::Completed => "rolled back",
            Self::Incomplete => "rollback incomplete",
        })
    }
}

/// How a caller should treat an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    /// Logged and tolerated; the operation continues.
    Anomaly,
    /// Try again later (a component is still probing).
    Retryable,
    /// Reject this request; the link stays usable.
    Recoverable,
    /// Abort the stream.
    Severe,
    /// The link cannot be built.
    Fatal,
}

/// Machine layer error
#[derive(Debug, Clone, PartialEq, Eq, thiserror_no_std::Error)]
pub enum MachineError {
    /// A referenced component is missing or not yet bound to its driver.
    #[error("component {reference} not ready")]
    ComponentNotReady {
        /// The unresolved reference.
        reference: ComponentReference,
    },

    /// The link description is structurally invalid.
    #[error("invalid topology: {0}")]
    Topology(TopologyFault),

    /// A requested parameter is outside the link's allowed set.
    #[error("unsupported {parameter}")]
    UnsupportedParameter {
        /// The offending parameter.
        parameter: Parameter,
    },

    /// An endpoint refused a command.
    #[error("endpoint {endpoint} rejected command: {cause} ({rollback})")]
    EndpointRejected {
        /// Label of the refusing endpoint.
        endpoint: EndpointLabel,
        /// Classified driver error.
        cause: EndpointFault,
        /// What happened to endpoints committed earlier.
        rollback: Rollback,
    },

    /// A stop arrived with no active stream in that direction.
    #[error("{direction} use counter underflow")]
    CounterUnderflow {
        /// Direction of the unmatched stop.
        direction: StreamDirection,
    },
}

impl MachineError {
    /// `true` if the same call may succeed later without changes.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ComponentNotReady { .. })
    }

    /// Classify for the caller.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::ComponentNotReady { .. } => Severity::Retryable,
            Self::Topology(_) => Severity::Fatal,
            Self::UnsupportedParameter { .. } => Severity::Recoverable,
            Self::EndpointRejected { .. } => Severity::Severe,
            Self::CounterUnderflow { .. } => Severity::Anomaly,
        }
    }
}

impl From<TopologyFault> for MachineError {
    fn from(fault: TopologyFault) -> Self {
        Self::Topology(fault)
    }
}
