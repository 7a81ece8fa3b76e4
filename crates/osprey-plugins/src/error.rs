//! Plugin error types.

use std::path::PathBuf;

use osprey_exec::ExecError;
use osprey_scan::ScanResult;

/// Errors from plugin discovery, loading, and execution.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The manifest descriptor is malformed or fails validation.
    #[error("invalid manifest at {path}: {message}")]
    Manifest {
        /// Path to the offending descriptor.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// The bundle failed its security scan.
    #[error("plugin '{name}' rejected by security scan ({} error(s), {} warning(s))",
        .report.errors.len(), .report.warnings.len())]
    SecurityRejected {
        /// Name of the rejected plugin.
        name: String,
        /// The merged scan verdict with every finding.
        report: ScanResult,
    },

    /// The manifest names an adapter the catalog does not provide.
    #[error("plugin '{name}': no adapter factory for '{adapter_class}'")]
    AdapterNotFound {
        /// Name of the plugin.
        name: String,
        /// The adapter class the manifest asked for.
        adapter_class: String,
    },

    /// No bundle directory was found for the manifest.
    #[error("no bundle directory found for plugin '{name}'")]
    BundleMissing {
        /// Name of the plugin.
        name: String,
    },

    /// The requested tool is not in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// An execution backend failed.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Filesystem failure while reading a bundle.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias for plugin results.
pub type PluginResult<T> = Result<T, PluginError>;
