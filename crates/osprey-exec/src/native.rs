//! Native backend: tools as child processes on the host.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use osprey_core::ExecutionMode;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::{ExecError, ExecResult};
use crate::proxy;

/// Runs tools as child processes, resolved from the search path.
///
/// The child inherits the parent environment plus the sanitized proxy
/// variables and any `extra_env`. stdout and stderr are merged; a non-zero
/// exit code is logged but not treated as fatal — adapters interpret their
/// own tool's output and exit semantics.
#[derive(Debug, Clone, Default)]
pub struct NativeExecutor {
    search_path: Option<OsString>,
}

impl NativeExecutor {
    /// Executor resolving tools from the process `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor resolving tools from an explicit search path instead of
    /// `PATH`. Used by tests and by hosts that pin a tool directory.
    #[must_use]
    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(path.into()),
        }
    }

    /// True when an executable named `tool` resolves on the search path.
    #[must_use]
    pub fn is_available(&self, tool: &str) -> bool {
        self.resolve(tool).is_some()
    }

    fn resolve(&self, tool: &str) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match &self.search_path {
            Some(paths) => which::which_in(tool, Some(paths), cwd).ok(),
            None => which::which(tool).ok(),
        }
    }

    /// Run the tool with the given arguments and return its combined output.
    ///
    /// # Errors
    ///
    /// [`ExecError::Unavailable`] when the tool does not resolve;
    /// [`ExecError::Launch`] when the child cannot be spawned.
    pub async fn execute(
        &self,
        tool: &str,
        args: &[String],
        config: &RunConfig,
    ) -> ExecResult<String> {
        let Some(binary) = self.resolve(tool) else {
            return Err(ExecError::Unavailable {
                tool: tool.to_string(),
                mode: ExecutionMode::Native,
            });
        };

        info!(tool, ?args, "executing native tool");

        let output = Command::new(&binary)
            .args(args)
            .envs(proxy::child_env(config))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ExecError::Launch {
                tool: tool.to_string(),
                source,
            })?;

        if !output.status.success() {
            warn!(tool, code = output.status.code(), "native tool exited non-zero");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut combined = stdout.into_owned();
        if !stderr.is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }
        Ok(combined)
    }
}
