//! Registry of loaded adapters.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::adapter::ToolAdapter;

/// Loaded adapters, keyed by their manifest's registry key.
///
/// Built by one discovery run and read-only afterwards: re-running
/// discovery produces a whole new registry rather than patching this one.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn ToolAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an adapter under a key.
    ///
    /// Returns `false` and keeps the existing entry when the key is already
    /// taken — the first loaded plugin wins.
    pub fn insert(&mut self, key: impl Into<String>, adapter: Arc<dyn ToolAdapter>) -> bool {
        let key = key.into();
        if self.adapters.contains_key(&key) {
            warn!(key, "duplicate registry key, keeping the first adapter");
            return false;
        }
        self.adapters.insert(key, adapter);
        true
    }

    /// Adapter registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<dyn ToolAdapter>> {
        self.adapters.get(key)
    }

    /// Sorted registry keys.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of loaded adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// True when nothing loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Iterate over `(key, adapter)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ToolAdapter>)> {
        self.adapters.iter().map(|(key, adapter)| (key.as_str(), adapter))
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("names", &self.names())
            .finish()
    }
}
