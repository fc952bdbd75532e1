//! Topology resolution
//!
//! Turns a [`LinkConfig`] (component references handed over by a
//! configuration provider) into a fully bound [`AudioLink`]. Resolution is
//! all-or-nothing: the interface is resolved first, then each codec in the
//! order given, and the first component that is missing or not yet bound to
//! its driver aborts the whole link with
//! [`MachineError::ComponentNotReady`]. The caller retries once the
//! component has probed.
//!
//! Every node acquired from the [`ComponentRegistry`] is held by a
//! [`NodeGuard`] and released on every exit path, success included: the
//! link keeps the bound drivers, not the nodes.

use heapless::Vec;
use platform::config::{MAX_CODECS, NAME_LEN};
use platform::{Capabilities, DaiEndpoint, EndpointRole};

use crate::error::{MachineError, TopologyFault};
use crate::link::{
    AudioLink, ClockPolicy, EndpointInfo, EndpointName, EndpointPrefix, LinkDirections,
    LinkTopology,
};

#[cfg(any(test, feature = "std"))]
pub mod mock;

/// Reference to a component through a named property, e.g. `audio-codec[1]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentReference {
    /// Property name, e.g. `"audio-cpu"`.
    pub property: heapless::String<NAME_LEN>,
    /// Index within the property.
    pub index: u8,
    /// Role the component must play.
    pub role: EndpointRole,
}

impl ComponentReference {
    /// Reference to an interface component.
    ///
    /// # Errors
    ///
    /// [`TopologyFault::NameTooLong`] if `property` does not fit.
    pub fn interface(property: &str, index: u8) -> Result<Self, TopologyFault> {
        Self::new(property, index, EndpointRole::Interface)
    }

    /// Reference to a codec component.
    ///
    /// # Errors
    ///
    /// [`TopologyFault::NameTooLong`] if `property` does not fit.
    pub fn codec(property: &str, index: u8) -> Result<Self, TopologyFault> {
        Self::new(property, index, EndpointRole::Codec)
    }

    fn new(property: &str, index: u8, role: EndpointRole) -> Result<Self, TopologyFault> {
        Ok(Self {
            property: heapless::String::try_from(property)
                .map_err(|_| TopologyFault::NameTooLong)?,
            index,
            role,
        })
    }

    /// Same property and index, regardless of role.
    fn same_target(&self, other: &Self) -> bool {
        self.property == other.property && self.index == other.index
    }
}

impl core::fmt::Display for ComponentReference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}[{}]", self.property, self.index)
    }
}

/// Input to [`resolve`]: what a configuration provider knows about one link.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkConfig {
    /// Link name.
    pub name: EndpointName,
    /// Stream name.
    pub stream_name: EndpointName,
    /// Sound card name, when the board provider names the card. Falls back
    /// to the link name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub card: Option<EndpointName>,
    /// The interface component.
    pub interface: ComponentReference,
    /// Codec components, in link order.
    pub codecs: Vec<ComponentReference, MAX_CODECS>,
    /// Per-position codec prefixes. Empty means `"0"`, `"1"`, ...
    #[cfg_attr(feature = "serde", serde(default))]
    pub codec_prefixes: Vec<EndpointPrefix, MAX_CODECS>,
    /// Board-level constraint, intersected with every endpoint.
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Option<Capabilities>,
    /// Directions the board wires up.
    #[cfg_attr(feature = "serde", serde(default))]
    pub directions: LinkDirections,
    /// Framing and clocking rules.
    #[cfg_attr(feature = "serde", serde(default))]
    pub clocking: ClockPolicy,
}

impl LinkConfig {
    /// A link with no codecs yet.
    ///
    /// # Errors
    ///
    /// [`TopologyFault::NameTooLong`] if a name does not fit.
    pub fn new(
        name: &str,
        stream_name: &str,
        interface: ComponentReference,
    ) -> Result<Self, TopologyFault> {
        Ok(Self {
            name: EndpointName::try_from(name).map_err(|_| TopologyFault::NameTooLong)?,
            stream_name: EndpointName::try_from(stream_name)
                .map_err(|_| TopologyFault::NameTooLong)?,
            card: None,
            interface,
            codecs: Vec::new(),
            codec_prefixes: Vec::new(),
            constraints: None,
            directions: LinkDirections::BOTH,
            clocking: ClockPolicy::I2S,
        })
    }

    /// Name the sound card.
    ///
    /// # Errors
    ///
    /// [`TopologyFault::NameTooLong`] if `card` does not fit.
    pub fn with_card(mut self, card: &str) -> Result<Self, TopologyFault> {
        self.card = Some(EndpointName::try_from(card).map_err(|_| TopologyFault::NameTooLong)?);
        Ok(self)
    }

    /// Append a codec reference.
    ///
    /// # Errors
    ///
    /// [`TopologyFault::TooManyCodecs`] past `MAX_CODECS`.
    pub fn with_codec(mut self, codec: ComponentReference) -> Result<Self, TopologyFault> {
        self.codecs
            .push(codec)
            .map_err(|_| TopologyFault::TooManyCodecs)?;
        Ok(self)
    }

    /// Replace the codec prefixes.
    ///
    /// # Errors
    ///
    /// [`TopologyFault::NameTooLong`] or [`TopologyFault::TooManyCodecs`].
    pub fn with_codec_prefixes(mut self, prefixes: &[&str]) -> Result<Self, TopologyFault> {
        self.codec_prefixes.clear();
        for prefix in prefixes {
            let prefix =
                EndpointPrefix::try_from(*prefix).map_err(|_| TopologyFault::NameTooLong)?;
            self.codec_prefixes
                .push(prefix)
                .map_err(|_| TopologyFault::TooManyCodecs)?;
        }
        Ok(self)
    }

    /// Board-level constraint.
    #[must_use]
    pub fn with_constraints(mut self, constraints: Capabilities) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Directions.
    #[must_use]
    pub fn with_directions(mut self, directions: LinkDirections) -> Self {
        self.directions = directions;
        self
    }

    /// Framing and clocking.
    #[must_use]
    pub fn with_clocking(mut self, clocking: ClockPolicy) -> Self {
        self.clocking = clocking;
        self
    }

    /// Structural checks that need no component.
    ///
    /// # Errors
    ///
    /// The first [`TopologyFault`] found.
    pub fn validate(&self) -> Result<(), TopologyFault> {
        if self.codecs.is_empty() {
            return Err(TopologyFault::NoCodecs);
        }
        if self.interface.role != EndpointRole::Interface
            || self.codecs.iter().any(|c| c.role != EndpointRole::Codec)
        {
            return Err(TopologyFault::RoleMismatch);
        }
        for (i, codec) in self.codecs.iter().enumerate() {
            if codec.same_target(&self.interface)
                || self.codecs.iter().take(i).any(|c| c.same_target(codec))
            {
                return Err(TopologyFault::DuplicateComponent);
            }
        }
        if !self.codec_prefixes.is_empty() && self.codec_prefixes.len() != self.codecs.len() {
            return Err(TopologyFault::PrefixMismatch);
        }
        for (i, prefix) in self.codec_prefixes.iter().enumerate() {
            if self.codec_prefixes.iter().take(i).any(|p| p == prefix) {
                return Err(TopologyFault::DuplicateLabel);
            }
        }
        Ok(())
    }

    /// Prefix for codec `index`: the configured one, else the index itself.
    fn prefix_for(&self, index: usize) -> Result<EndpointPrefix, TopologyFault> {
        if let Some(prefix) = self.codec_prefixes.get(index) {
            return Ok(prefix.clone());
        }
        let mut prefix = EndpointPrefix::new();
        core::fmt::write(&mut prefix, format_args!("{index}"))
            .map_err(|_| TopologyFault::NameTooLong)?;
        Ok(prefix)
    }
}

/// Where component references come from and how they bind to drivers.
///
/// Implemented by the board support layer (device tree walker, static
/// table, ...). `acquire` and `release` are balanced by [`resolve`].
pub trait ComponentRegistry {
    /// Handle to an acquired component node.
    type Node: Copy;
    /// Driver type bound to interface components.
    type Interface: DaiEndpoint;
    /// Driver type bound to codec components.
    type Codec: DaiEndpoint;

    /// Look up a reference. `None` if nothing is there (yet).
    fn acquire(&self, reference: &ComponentReference) -> Option<Self::Node>;

    /// Drop a node obtained from [`acquire`](Self::acquire).
    fn release(&self, node: Self::Node);

    /// The interface driver bound to `node`, if probing has finished.
    fn bind_interface(&self, node: Self::Node) -> Option<Self::Interface>;

    /// The codec driver bound to `node`, if probing has finished.
    fn bind_codec(&self, node: Self::Node) -> Option<Self::Codec>;
}

/// Releases an acquired node when dropped.
pub struct NodeGuard<'r, R: ComponentRegistry + ?Sized> {
    registry: &'r R,
    node: R::Node,
}

impl<'r, R: ComponentRegistry + ?Sized> NodeGuard<'r, R> {
    /// Acquire `reference`, or `ComponentNotReady`.
    pub fn acquire(registry: &'r R, reference: &ComponentReference) -> Result<Self, MachineError> {
        registry
            .acquire(reference)
            .map(|node| Self { registry, node })
            .ok_or_else(|| not_ready(reference))
    }

    /// The held node.
    pub fn node(&self) -> R::Node {
        self.node
    }
}

impl<R: ComponentRegistry + ?Sized> Drop for NodeGuard<'_, R> {
    fn drop(&mut self) {
        self.registry.release(self.node);
    }
}

fn not_ready(reference: &ComponentReference) -> MachineError {
    warn!(
        "component {}[{}] not ready",
        reference.property.as_str(),
        reference.index
    );
    MachineError::ComponentNotReady {
        reference: reference.clone(),
    }
}

/// Resolve `config` into a bound link.
///
/// # Errors
///
/// - [`MachineError::Topology`] for a structurally invalid config, or when
///   the endpoints share no configuration at all.
/// - [`MachineError::ComponentNotReady`] for the first reference (interface
///   first, then codecs in order) that is missing or unbound.
pub fn resolve<R: ComponentRegistry + ?Sized>(
    registry: &R,
    config: &LinkConfig,
) -> Result<AudioLink<R::Interface, R::Codec>, MachineError> {
    config.validate()?;

    let interface_node = NodeGuard::acquire(registry, &config.interface)?;
    let interface = registry
        .bind_interface(interface_node.node())
        .ok_or_else(|| not_ready(&config.interface))?;

    let mut codec_nodes: Vec<NodeGuard<'_, R>, MAX_CODECS> = Vec::new();
    let mut codecs: Vec<R::Codec, MAX_CODECS> = Vec::new();
    for reference in &config.codecs {
        let node = NodeGuard::acquire(registry, reference)?;
        let codec = registry
            .bind_codec(node.node())
            .ok_or_else(|| not_ready(reference))?;
        // Both vectors are sized like config.codecs.
        codec_nodes
            .push(node)
            .map_err(|_| TopologyFault::TooManyCodecs)?;
        codecs
            .push(codec)
            .map_err(|_| TopologyFault::TooManyCodecs)?;
    }

    let topology = describe(config, &interface, &codecs)?;
    info!(
        "link {} resolved: {} + {} codec(s)",
        topology.name.as_str(),
        topology.interface.label.as_str(),
        topology.codecs.len()
    );

    Ok(AudioLink {
        topology,
        interface,
        codecs,
        negotiated: None,
    })
}

fn describe<I: DaiEndpoint, C: DaiEndpoint>(
    config: &LinkConfig,
    interface: &I,
    codecs: &[C],
) -> Result<LinkTopology, TopologyFault> {
    let interface_info = EndpointInfo::new(
        interface.name(),
        EndpointRole::Interface,
        None,
        interface.capabilities(),
    )?;

    let mut allowed = match &config.constraints {
        Some(board) => board.intersect(&interface_info.capabilities),
        None => interface_info.capabilities.clone(),
    };

    let mut codec_infos: Vec<EndpointInfo, MAX_CODECS> = Vec::new();
    for (index, codec) in codecs.iter().enumerate() {
        let prefix = config.prefix_for(index)?;
        let info = EndpointInfo::new(
            codec.name(),
            EndpointRole::Codec,
            Some(prefix.as_str()),
            codec.capabilities(),
        )?;
        allowed = allowed.intersect(&info.capabilities);
        codec_infos
            .push(info)
            .map_err(|_| TopologyFault::TooManyCodecs)?;
    }

    if !allowed.is_satisfiable() {
        error!(
            "link {}: endpoints share no configuration",
            config.name.as_str()
        );
        return Err(TopologyFault::NoCommonConfiguration);
    }

    Ok(LinkTopology {
        card: config.card.clone().unwrap_or_else(|| config.name.clone()),
        name: config.name.clone(),
        stream_name: config.stream_name.clone(),
        interface: interface_info,
        codecs: codec_infos,
        allowed,
        directions: config.directions,
        clocking: config.clocking,
    })
}
