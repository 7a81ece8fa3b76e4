//! Per-invocation execution configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Options passed alongside one tool invocation.
///
/// `extra_env` is merged into the child environment after proxy resolution,
/// so an explicit entry can override a proxy variable for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Proxy for the tool's own network traffic; sanitized before use.
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// Additional child environment variables.
    #[serde(default)]
    pub extra_env: HashMap<String, String>,
}

impl RunConfig {
    /// Configuration with no proxy and no extra environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the proxy URL.
    #[must_use]
    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    /// Add one child environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let config = RunConfig::new();
        assert!(config.proxy_url.is_none());
        assert!(config.extra_env.is_empty());
    }

    #[test]
    fn deserializes_from_partial_json() {
        let config: RunConfig =
            serde_json::from_str(r#"{"proxy_url": "http://127.0.0.1:8080"}"#).unwrap();
        assert_eq!(config.proxy_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(config.extra_env.is_empty());
    }
}
