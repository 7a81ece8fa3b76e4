//! Plugin trust tiers and execution backend selection.

use serde::{Deserialize, Serialize};

/// Trust tier of a plugin bundle.
///
/// The tier drives the static-analysis pass policy: `Core` bundles extend
/// the host itself and must come back spotless, while `Tool` bundles run
/// their commands through an [`ExecutionMode`] backend and tolerate a small
/// number of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Wraps an external OSINT tool; commands run through an execution backend.
    Tool,
    /// Extends the host process directly; runs with full trust.
    Core,
}

impl PluginKind {
    /// Stable lowercase name, matching the manifest wire format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Core => "core",
        }
    }
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PluginKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool" => Ok(Self::Tool),
            "core" => Ok(Self::Core),
            other => Err(format!("unknown plugin kind '{other}' (expected tool or core)")),
        }
    }
}

/// Which isolation backend runs a tool's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Child process on the host, resolved from the search path.
    Native,
    /// Container run through the container-manager collaborator.
    Container,
    /// Native preferred, container as fallback.
    Hybrid,
}

impl ExecutionMode {
    /// Stable lowercase name, matching manifests and config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Container => "container",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "container" => Ok(Self::Container),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!(
                "unknown execution mode '{other}' (expected native, container, or hybrid)"
            )),
        }
    }
}
