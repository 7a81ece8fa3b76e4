//! Execution error types.

use osprey_core::ExecutionMode;

/// Errors from execution backends.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// No backend can run the named tool.
    #[error("tool '{tool}' is not available in {mode} mode")]
    Unavailable {
        /// The tool that could not be run.
        tool: String,
        /// The mode that was asked to run it.
        mode: ExecutionMode,
    },

    /// A plugin tried to remap a tool from the trusted built-in set.
    #[error("'{tool}' is a trusted built-in tool and its image cannot be overridden")]
    ReservedToolName {
        /// The reserved tool name.
        tool: String,
    },

    /// No container image is mapped to the tool.
    #[error("no container image is registered for tool '{tool}'")]
    UnknownImage {
        /// The unmapped tool name.
        tool: String,
    },

    /// The child process could not be spawned.
    #[error("failed to launch '{tool}'")]
    Launch {
        /// The tool that failed to launch.
        tool: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The container runtime reported a failure.
    #[error("container runtime error: {0}")]
    ContainerRuntime(String),
}

/// Convenience alias for execution results.
pub type ExecResult<T> = Result<T, ExecError>;
