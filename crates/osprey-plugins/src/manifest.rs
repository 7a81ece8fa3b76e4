//! The `plugin.json` descriptor every bundle carries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use osprey_core::{ExecutionMode, PluginKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PluginError, PluginResult};

/// Identity and contract of one plugin bundle.
///
/// Parsed from the bundle's `plugin.json` at discovery time and immutable
/// thereafter. Unknown descriptor fields are dropped for forward
/// compatibility; unknown *values* of known fields (plugin type, execution
/// mode) are errors, never coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin name.
    pub name: String,
    /// Bundle version string.
    pub version: String,
    /// Trust tier; drives the scan pass policy.
    #[serde(rename = "plugin_type")]
    pub kind: PluginKind,
    /// Which catalog adapter runs this plugin. Manifests written against a
    /// dotted-path convention (`sherlock.adapter.SherlockAdapter`) resolve
    /// by their last segment.
    pub adapter_class: String,
    /// External tool the bundle wraps; required for `tool` plugins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Container image the plugin asks to register for its tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    /// Human-readable summary.
    #[serde(default)]
    pub description: String,
    /// Bundle author.
    #[serde(default)]
    pub author: String,
    /// Credential keys the adapter needs at run time.
    #[serde(default)]
    pub requires_credentials: Vec<String>,
    /// Execution modes the bundle claims to support. Informational; the
    /// operator picks the mode at startup.
    #[serde(default)]
    pub supported_modes: Vec<ExecutionMode>,
    /// Open adapter-specific key/value map (e.g. `default_args`).
    #[serde(default)]
    pub capabilities: HashMap<String, Value>,
}

impl PluginManifest {
    /// Parse and validate a descriptor from raw JSON.
    ///
    /// # Errors
    ///
    /// [`PluginError::Manifest`] naming the offending field when the JSON
    /// is malformed or validation fails.
    pub fn parse(raw: &str) -> PluginResult<Self> {
        Self::parse_named(raw, Path::new("<inline>"))
    }

    /// [`parse`](Self::parse) with the descriptor path carried in errors.
    ///
    /// # Errors
    ///
    /// [`PluginError::Manifest`] on malformed JSON or failed validation.
    pub fn parse_named(raw: &str, path: &Path) -> PluginResult<Self> {
        let manifest: Self = serde_json::from_str(raw).map_err(|err| PluginError::Manifest {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> PluginResult<()> {
        let reject = |message: &str| {
            Err(PluginError::Manifest {
                path: path.to_path_buf(),
                message: message.to_string(),
            })
        };

        if self.name.trim().is_empty() {
            return reject("'name' must be non-empty");
        }
        if self.kind == PluginKind::Tool
            && self.tool_name.as_deref().is_none_or(|t| t.trim().is_empty())
        {
            return reject("tool plugins must specify 'tool_name'");
        }
        Ok(())
    }

    /// Serialize back to descriptor JSON. `parse(to_json(m)) == m`.
    ///
    /// # Errors
    ///
    /// Propagates serialization failure (practically unreachable for this
    /// shape).
    pub fn to_json(&self) -> PluginResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| PluginError::Manifest {
            path: PathBuf::from("<serialize>"),
            message: err.to_string(),
        })
    }

    /// Key the loaded adapter registers under: `tool_name` for tool
    /// plugins, `name` for core plugins.
    #[must_use]
    pub fn registry_key(&self) -> &str {
        match self.kind {
            PluginKind::Tool => self.tool_name.as_deref().unwrap_or(&self.name),
            PluginKind::Core => &self.name,
        }
    }
}
