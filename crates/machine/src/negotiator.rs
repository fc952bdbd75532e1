//! Constraint negotiation
//!
//! # Startup
//!
//! [`AudioLink::restrict_capabilities`] pushes the link-wide allowed set to
//! every endpoint before any data flows.
//!
//! # Configure
//!
//! [`AudioLink::negotiate`] validates a request against the allowed set,
//! derives one frame layout and clock plan for the whole link, and commits
//! it: interface first, then each codec in resolver order. The interface
//! always provides BCLK and FSYNC; every codec consumes them.
//!
//! If an endpoint refuses, the endpoints already committed are reverted in
//! reverse order, to the previous configuration when there was one and to
//! the unconfigured state otherwise:
//!
//! ```text
//! commit:  interface → codec 0 → codec 1 ✗
//! revert:              codec 0 → interface
//! ```
//!
//! The outcome of the revert is reported in
//! [`MachineError::EndpointRejected::rollback`]. A completed revert leaves
//! the previous [`NegotiatedConfig`] in place; an incomplete one clears it,
//! since the hardware state no longer matches anything recorded.

use platform::{
    Capabilities, ClockError, ClockPlan, ClockRole, DaiEndpoint, DaiError, EndpointFault,
    FrameLayout,
};

use crate::error::{MachineError, Parameter, Rollback};
use crate::link::{AudioLink, EndpointLabel, HwParams, NegotiatedConfig};

fn rejected(label: &EndpointLabel, cause: EndpointFault, rollback: Rollback) -> MachineError {
    MachineError::EndpointRejected {
        endpoint: label.clone(),
        cause,
        rollback,
    }
}

fn unsupported(parameter: Parameter) -> MachineError {
    MachineError::UnsupportedParameter { parameter }
}

impl<I: DaiEndpoint, C: DaiEndpoint> AudioLink<I, C> {
    /// Push the allowed set to every endpoint, interface first.
    ///
    /// Returns the allowed set: board constraints ∩ every endpoint's
    /// capabilities, as enumerated rate, channel and format sets.
    pub fn restrict_capabilities(&mut self) -> Result<Capabilities, MachineError> {
        let allowed = &self.topology.allowed;

        self.interface
            .set_capability_constraints(allowed)
            .map_err(|e| {
                rejected(
                    &self.topology.interface.label,
                    e.fault(),
                    Rollback::NotNeeded,
                )
            })?;

        for (codec, info) in self.codecs.iter_mut().zip(&self.topology.codecs) {
            codec
                .set_capability_constraints(allowed)
                .map_err(|e| rejected(&info.label, e.fault(), Rollback::NotNeeded))?;
        }

        debug!(
            "link {}: constraints applied ({} rates)",
            self.topology.name.as_str(),
            allowed.rates.len()
        );
        Ok(allowed.clone())
    }

    /// Compute the configuration `params` would commit, without touching
    /// any endpoint.
    pub fn plan(&self, params: HwParams) -> Result<NegotiatedConfig, MachineError> {
        self.topology
            .allowed
            .permits(params.rate, params.channels, params.format)
            .map_err(|m| unsupported(m.into()))?;

        let policy = self.topology.clocking;
        let layout = FrameLayout::for_stream(
            params.channels,
            params.format,
            policy.slot_width,
            policy.min_slots,
        )
        .map_err(|e| clock_parameter(e, params))?;
        let clocks = ClockPlan::derive(params.rate, &layout, policy.mclk_fs)
            .map_err(|e| clock_parameter(e, params))?;

        Ok(NegotiatedConfig {
            params,
            layout,
            clocks,
            protocol: policy.protocol,
            inversion: policy.inversion,
            interface_role: ClockRole::Provider,
            codec_roles: self.codecs.iter().map(|_| ClockRole::Consumer).collect(),
        })
    }

    /// Commit `params` to every endpoint.
    ///
    /// Identical requests re-issue the same commands and return an equal
    /// configuration.
    pub fn negotiate(&mut self, params: HwParams) -> Result<NegotiatedConfig, MachineError> {
        let next = self.plan(params)?;

        if let Err(e) = self
            .interface
            .set_format(&next.format_for(next.interface_role))
        {
            let fault = e.fault();
            warn!(
                "link {}: {} rejected format ({})",
                self.topology.name.as_str(),
                self.topology.interface.label.as_str(),
                fault.as_str()
            );
            return Err(rejected(
                &self.topology.interface.label,
                fault,
                Rollback::NotNeeded,
            ));
        }

        let mut failure = None;
        for (index, codec) in self.codecs.iter_mut().enumerate() {
            let role = next.codec_role(index).unwrap_or(ClockRole::Consumer);
            if let Err(e) = codec.set_format(&next.format_for(role)) {
                failure = Some((index, e.fault()));
                break;
            }
        }

        if let Some((index, fault)) = failure {
            let label = self
                .topology
                .codecs
                .get(index)
                .map(|c| c.label.clone())
                .unwrap_or_default();
            warn!(
                "link {}: {} rejected format ({})",
                self.topology.name.as_str(),
                label.as_str(),
                fault.as_str()
            );
            let rollback = self.revert(index);
            return Err(rejected(&label, fault, rollback));
        }

        info!(
            "link {}: {} Hz, {} ch, {} committed (bclk {} Hz)",
            self.topology.name.as_str(),
            params.rate,
            params.channels,
            params.format.as_str(),
            next.clocks.bclk_hz
        );
        self.negotiated = Some(next.clone());
        Ok(next)
    }

    /// Revert the interface and the first `committed` codecs, newest first.
    fn revert(&mut self, committed: usize) -> Rollback {
        let previous = self.negotiated.clone();
        let mut complete = true;

        for index in (0..committed).rev() {
            let Some(codec) = self.codecs.get_mut(index) else {
                continue;
            };
            let result = match &previous {
                Some(prev) => {
                    let role = prev.codec_role(index).unwrap_or(ClockRole::Consumer);
                    codec.set_format(&prev.format_for(role))
                }
                None => codec.clear_format(),
            };
            if result.is_err() {
                complete = false;
            }
        }

        let result = match &previous {
            Some(prev) => self
                .interface
                .set_format(&prev.format_for(prev.interface_role)),
            None => self.interface.clear_format(),
        };
        if result.is_err() {
            complete = false;
        }

        if complete {
            info!("link {}: rolled back", self.topology.name.as_str());
            Rollback::Completed
        } else {
            error!(
                "link {}: rollback incomplete, configuration cleared",
                self.topology.name.as_str()
            );
            self.negotiated = None;
            Rollback::Incomplete
        }
    }

    /// Return every endpoint to the unconfigured state and forget the
    /// negotiated configuration. Codecs are cleared newest first, then the
    /// interface; every endpoint is attempted even after a failure.
    ///
    /// Returns the first failure.
    pub fn release_hardware(&mut self) -> Result<(), MachineError> {
        let mut first = None;

        for (codec, info) in self.codecs.iter_mut().zip(&self.topology.codecs).rev() {
            if let Err(e) = codec.clear_format() {
                warn!("{}: clear failed ({})", info.label.as_str(), e.fault().as_str());
                if first.is_none() {
                    first = Some(rejected(&info.label, e.fault(), Rollback::NotNeeded));
                }
            }
        }
        if let Err(e) = self.interface.clear_format() {
            let label = &self.topology.interface.label;
            warn!("{}: clear failed ({})", label.as_str(), e.fault().as_str());
            if first.is_none() {
                first = Some(rejected(label, e.fault(), Rollback::NotNeeded));
            }
        }

        self.negotiated = None;
        first.map_or(Ok(()), Err)
    }
}

fn clock_parameter(err: ClockError, params: HwParams) -> MachineError {
    debug!(
        "request {} Hz / {} ch / {} does not fit the frame",
        params.rate,
        params.channels,
        params.format.as_str()
    );
    match err {
        ClockError::SlotTooNarrow { format, .. } => unsupported(Parameter::Format(format)),
        ClockError::Overflow { rate_hz } => unsupported(Parameter::Rate(rate_hz)),
    }
}
