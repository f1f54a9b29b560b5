//! Service lookup for step collaborators
//!
//! Registrations carry collaborator service ids, not service instances. The
//! executing host resolves them through a [`ServiceLocator`] when it builds
//! the step, so compiling the registry never instantiates a service.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Looks up services by id
pub trait ServiceLocator {
    type Handle;

    fn resolve(&self, id: &str) -> Option<Self::Handle>;
}

impl<H: Clone, S: BuildHasher> ServiceLocator for HashMap<String, H, S> {
    type Handle = H;

    fn resolve(&self, id: &str) -> Option<H> {
        self.get(id).cloned()
    }
}

impl<H: Clone> ServiceLocator for BTreeMap<String, H> {
    type Handle = H;

    fn resolve(&self, id: &str) -> Option<H> {
        self.get(id).cloned()
    }
}

impl<L: ServiceLocator + ?Sized> ServiceLocator for &L {
    type Handle = L::Handle;

    fn resolve(&self, id: &str) -> Option<L::Handle> {
        (**self).resolve(id)
    }
}
