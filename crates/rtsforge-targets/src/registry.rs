//! The target registry.
//!
//! Descriptors are registered explicitly; nothing here scans the file
//! system. A registry is filled during a load phase and then only read.
//! [`SharedRegistry`] covers hot reload by swapping whole snapshots.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::descriptor::TargetDescriptor;
use crate::error::{Result, TargetError};
use crate::resolve::{resolve, ResolvedRecipe};

/// All known target descriptors, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    descriptors: BTreeMap<String, Arc<TargetDescriptor>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor. Fails if the name is taken; the existing entry is
    /// left untouched in that case.
    pub fn register(&mut self, descriptor: TargetDescriptor) -> Result<Arc<TargetDescriptor>> {
        let name = descriptor.name().to_string();
        if self.descriptors.contains_key(&name) {
            return Err(TargetError::DuplicateTarget { name });
        }
        tracing::debug!(target_name = %name, parent = ?descriptor.parent(), "registering target");
        let descriptor = Arc::new(descriptor);
        self.descriptors.insert(name, Arc::clone(&descriptor));
        Ok(descriptor)
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<TargetDescriptor>> {
        self.descriptors
            .get(name)
            .ok_or_else(|| TargetError::UnknownTarget {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<TargetDescriptor>> {
        self.descriptors.values()
    }

    /// Descriptors whose parent is `name`.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<TargetDescriptor>> {
        self.descriptors
            .values()
            .filter(move |d| d.parent() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Flatten `name` and its ancestors into a build recipe.
    pub fn resolve(&self, name: &str) -> Result<ResolvedRecipe> {
        resolve(self, name)
    }
}

/// A registry that can be replaced while readers are resolving against it.
///
/// Readers take a snapshot and resolve against that; a concurrent
/// [`SharedRegistry::replace`] never affects an in-flight resolution.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: RwLock<Arc<TargetRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: TargetRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// The registry as of now.
    pub fn snapshot(&self) -> Arc<TargetRegistry> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a freshly loaded registry, returning the previous one.
    pub fn replace(&self, registry: TargetRegistry) -> Arc<TargetRegistry> {
        tracing::debug!(targets = registry.len(), "replacing registry snapshot");
        std::mem::replace(&mut *self.current.write(), Arc::new(registry))
    }

    /// Resolve against a single snapshot.
    pub fn resolve(&self, name: &str) -> Result<ResolvedRecipe> {
        self.snapshot().resolve(name)
    }
}
