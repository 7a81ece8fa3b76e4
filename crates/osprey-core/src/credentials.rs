//! Read-only credential lookup seam.
//!
//! Plugins declare the credential keys they need (`"hibp-api-key"`, ...);
//! the loader and adapters resolve them through [`CredentialStore`] instead
//! of reading the environment directly — direct environment access in a
//! bundle is flagged by the security scanner. Storage backends (OS keyring,
//! encrypted files) live outside this subsystem and are fronted through
//! [`StaticCredentialStore`] or their own trait impl.

use std::collections::HashMap;

use tracing::debug;

/// Narrow lookup interface for secrets.
pub trait CredentialStore: Send + Sync {
    /// Resolve a credential by its declared key, `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    /// True when the key resolves to a non-empty value.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl std::fmt::Debug for dyn CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

/// Environment-variable backed store, the first link of the lookup chain.
///
/// A key like `hibp-api-key` resolves from `HIBP_API_KEY`: uppercased, with
/// hyphens and spaces folded to underscores. Empty values count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    /// Environment variable name a key maps to.
    #[must_use]
    pub fn env_key(key: &str) -> String {
        key.trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' | '.' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        let var = Self::env_key(key);
        match std::env::var(&var) {
            Ok(value) if !value.is_empty() => {
                debug!(key, var, "credential resolved from environment");
                Some(value)
            },
            _ => None,
        }
    }
}

/// In-memory store.
///
/// Used by tests and by hosts that front an external secrets backend: they
/// resolve everything up front and hand the loader a fixed map.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    values: HashMap<String, String>,
}

impl StaticCredentialStore {
    /// Empty store (every lookup misses).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one credential.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl FromIterator<(String, String)> for StaticCredentialStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
