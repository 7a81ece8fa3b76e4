//! Compiled-in adapter factories.
//!
//! The original plugin convention located an adapter class by dotted path
//! and loaded it from the bundle's source. Here adapters are compiled into
//! the host; a manifest's `adapter_class` selects a factory from this
//! catalog instead. Dotted paths keep working: resolution falls back to the
//! last path segment.

use std::collections::HashMap;
use std::sync::Arc;

use osprey_exec::ExecutionStrategy;
use tracing::debug;

use crate::adapter::{CommandAdapter, ToolAdapter};
use crate::error::PluginResult;
use crate::manifest::PluginManifest;

/// Builds one adapter from its manifest and the active strategy.
pub type AdapterFactory =
    fn(&PluginManifest, Arc<ExecutionStrategy>) -> PluginResult<Box<dyn ToolAdapter>>;

/// Registry of adapter factories, keyed by class name.
#[derive(Clone)]
pub struct AdapterCatalog {
    factories: HashMap<String, AdapterFactory>,
}

impl AdapterCatalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Catalog with the built-in adapters registered.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register("command", CommandAdapter::from_manifest);
        catalog.register("CommandAdapter", CommandAdapter::from_manifest);
        catalog
    }

    /// Register a factory under a class name. Re-registering replaces.
    pub fn register(&mut self, key: impl Into<String>, factory: AdapterFactory) {
        let key = key.into();
        debug!(key, "registered adapter factory");
        self.factories.insert(key, factory);
    }

    /// Look up the factory for a manifest's `adapter_class`.
    ///
    /// Tries the exact string first, then its last `.`-separated segment so
    /// dotted-path manifests resolve.
    #[must_use]
    pub fn resolve(&self, adapter_class: &str) -> Option<AdapterFactory> {
        if let Some(factory) = self.factories.get(adapter_class) {
            return Some(*factory);
        }
        adapter_class
            .rsplit('.')
            .next()
            .and_then(|segment| self.factories.get(segment))
            .copied()
    }

    /// Number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for AdapterCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for AdapterCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("AdapterCatalog").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_command_by_both_names() {
        let catalog = AdapterCatalog::builtin();
        assert!(catalog.resolve("command").is_some());
        assert!(catalog.resolve("CommandAdapter").is_some());
    }

    #[test]
    fn dotted_path_falls_back_to_last_segment() {
        let catalog = AdapterCatalog::builtin();
        assert!(catalog.resolve("sherlock.adapter.CommandAdapter").is_some());
        assert!(catalog.resolve("sherlock.adapter.UnknownAdapter").is_none());
    }

    #[test]
    fn unknown_class_is_none() {
        let catalog = AdapterCatalog::builtin();
        assert!(catalog.resolve("TelepathyAdapter").is_none());
    }

    #[test]
    fn empty_catalog_resolves_nothing() {
        let catalog = AdapterCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.resolve("command").is_none());
    }

    #[test]
    fn registration_adds_a_key() {
        let mut catalog = AdapterCatalog::new();
        catalog.register("command", CommandAdapter::from_manifest);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.resolve("plugins.x.command").is_some());
    }
}
