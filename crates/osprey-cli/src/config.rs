//! Runtime configuration (`~/.osprey/config.toml`).

use std::path::{Path, PathBuf};

use osprey_core::ExecutionMode;
use osprey_plugins::executor::DEFAULT_PARALLELISM;
use osprey_scan::ScanPolicy;
use serde::Deserialize;
use tracing::debug;

/// Configuration loading errors. Fatal at startup, nowhere else.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("could not read config at {path}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this shape.
    #[error("could not parse config at {path}: {message}")]
    Parse {
        /// Path that failed.
        path: PathBuf,
        /// Parser diagnostics.
        message: String,
    },
}

/// Top-level runtime configuration.
///
/// Every section has working defaults; a missing config file is not an
/// error, a malformed one is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OspreyConfig {
    /// Plugin directory roots.
    pub plugins: PluginsConfig,
    /// Execution backend selection.
    pub execution: ExecutionConfig,
    /// Scanner scoring policy overrides.
    pub scanner: ScanPolicy,
    /// Logging defaults.
    pub logging: LoggingConfig,
}

/// `[plugins]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Bundled system plugin root, relative to the working directory or
    /// absolute.
    pub system_dir: PathBuf,
    /// User plugin root; defaults to `~/.osprey/plugins` when unset.
    pub user_dir: Option<PathBuf>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            system_dir: PathBuf::from("plugins"),
            user_dir: None,
        }
    }
}

/// `[execution]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Backend tools run through. `container` is the hardening setting;
    /// `hybrid` is the default.
    pub mode: ExecutionMode,
    /// Worker-pool size for batch runs.
    pub parallelism: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Hybrid,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level; `OSPREY_LOG` overrides at run time.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl OspreyConfig {
    /// Load configuration from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = OspreyConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.execution.mode, ExecutionMode::Hybrid);
        assert_eq!(config.execution.parallelism, DEFAULT_PARALLELISM);
        assert_eq!(config.logging.level, "info");
        assert!((config.scanner.tool_confidence_floor - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_overrides_some_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[execution]\nmode = \"container\"\n\n[scanner]\nwarning_penalty = 0.2\n",
        )
        .unwrap();

        let config = OspreyConfig::load(&path).unwrap();
        assert_eq!(config.execution.mode, ExecutionMode::Container);
        assert_eq!(config.execution.parallelism, DEFAULT_PARALLELISM);
        assert!((config.scanner.warning_penalty - 0.2).abs() < f64::EPSILON);
        assert!((config.scanner.error_penalty - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[execution]\nmode = \"chroot\"\n").unwrap();

        let err = OspreyConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
