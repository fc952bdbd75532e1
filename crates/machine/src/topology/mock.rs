//! In-memory [`ComponentRegistry`] for tests

use core::cell::{Cell, RefCell};

use heapless::Vec;
use platform::mocks::MockEndpoint;

use super::{ComponentReference, ComponentRegistry};

/// Registry capacity.
const MAX_COMPONENTS: usize = 8;

/// Probe state of a registered component.
#[derive(Debug, Clone)]
pub enum ComponentState {
    /// Node present, driver bound.
    Bound(MockEndpoint),
    /// Node present, driver not (yet) bound.
    Unbound,
}

#[derive(Debug)]
struct Entry {
    reference: ComponentReference,
    state: ComponentState,
}

/// Mock registry
///
/// Hands out clones of the registered endpoints and counts outstanding
/// acquisitions, so tests can check that every node was released.
#[derive(Debug, Default)]
pub struct MockRegistry {
    entries: RefCell<Vec<Entry, MAX_COMPONENTS>>,
    outstanding: Cell<usize>,
    acquisitions: Cell<usize>,
}

impl MockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bound component. Replaces an earlier entry for the same reference.
    pub fn insert(&self, reference: ComponentReference, endpoint: MockEndpoint) -> &Self {
        self.set(reference, ComponentState::Bound(endpoint))
    }

    /// Register a component whose driver has not probed yet.
    pub fn insert_unbound(&self, reference: ComponentReference) -> &Self {
        self.set(reference, ComponentState::Unbound)
    }

    /// Forget a component.
    pub fn remove(&self, reference: &ComponentReference) {
        self.entries
            .borrow_mut()
            .retain(|e| e.reference != *reference);
    }

    fn set(&self, reference: ComponentReference, state: ComponentState) -> &Self {
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.iter_mut().find(|e| e.reference == reference) {
            entry.state = state;
        } else {
            // Tests register a handful of components; overflow is ignored.
            let _ = entries.push(Entry { reference, state });
        }
        self
    }

    /// Nodes acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding.get()
    }

    /// Total successful acquisitions.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.get()
    }

    fn bound(&self, node: usize) -> Option<MockEndpoint> {
        match self.entries.borrow().get(node).map(|e| &e.state) {
            Some(ComponentState::Bound(ep)) => Some(ep.clone()),
            _ => None,
        }
    }
}

impl ComponentRegistry for MockRegistry {
    type Node = usize;
    type Interface = MockEndpoint;
    type Codec = MockEndpoint;

    fn acquire(&self, reference: &ComponentReference) -> Option<usize> {
        let node = self
            .entries
            .borrow()
            .iter()
            .position(|e| e.reference == *reference)?;
        self.outstanding.set(self.outstanding.get().saturating_add(1));
        self.acquisitions.set(self.acquisitions.get().saturating_add(1));
        Some(node)
    }

    fn release(&self, _node: usize) {
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
    }

    fn bind_interface(&self, node: usize) -> Option<MockEndpoint> {
        self.bound(node)
    }

    fn bind_codec(&self, node: usize) -> Option<MockEndpoint> {
        self.bound(node)
    }
}
