//! The closed set of execution backends handed to tool adapters.

use std::sync::Arc;

use osprey_core::ExecutionMode;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::container::ContainerExecutor;
use crate::error::{ExecError, ExecResult};
use crate::manager::ContainerManager;
use crate::native::NativeExecutor;

/// How tool command lines reach the outside world.
///
/// Exactly three variants, constructed once at startup and shared (behind an
/// `Arc`) by every adapter. Aside from the container backend's plugin image
/// map — written during plugin registration, read during execution — a
/// strategy is stateless per call and safe to use concurrently.
#[derive(Debug)]
pub enum ExecutionStrategy {
    /// Child processes on the host.
    Native(NativeExecutor),
    /// One-shot container runs.
    Container(ContainerExecutor),
    /// Native preferred, container as fallback.
    Hybrid {
        /// The preferred backend.
        native: NativeExecutor,
        /// The fallback backend.
        container: ContainerExecutor,
    },
}

impl ExecutionStrategy {
    /// Native-only strategy.
    #[must_use]
    pub fn native() -> Self {
        Self::Native(NativeExecutor::new())
    }

    /// Container-only strategy over the given manager.
    #[must_use]
    pub fn container(manager: Arc<dyn ContainerManager>) -> Self {
        Self::Container(ContainerExecutor::new(manager))
    }

    /// Hybrid strategy: default native executor, container fallback.
    #[must_use]
    pub fn hybrid(manager: Arc<dyn ContainerManager>) -> Self {
        Self::Hybrid {
            native: NativeExecutor::new(),
            container: ContainerExecutor::new(manager),
        }
    }

    /// Hybrid strategy from explicit parts. Used by tests that pin the
    /// native search path.
    #[must_use]
    pub fn hybrid_with(native: NativeExecutor, container: ContainerExecutor) -> Self {
        Self::Hybrid { native, container }
    }

    /// Strategy for a configured [`ExecutionMode`].
    #[must_use]
    pub fn for_mode(mode: ExecutionMode, manager: Arc<dyn ContainerManager>) -> Self {
        match mode {
            ExecutionMode::Native => Self::native(),
            ExecutionMode::Container => Self::container(manager),
            ExecutionMode::Hybrid => Self::hybrid(manager),
        }
    }

    /// The mode this strategy implements.
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Native(_) => ExecutionMode::Native,
            Self::Container(_) => ExecutionMode::Container,
            Self::Hybrid { .. } => ExecutionMode::Hybrid,
        }
    }

    /// True when some backend of this strategy can run the tool.
    #[must_use]
    pub fn is_available(&self, tool: &str) -> bool {
        match self {
            Self::Native(native) => native.is_available(tool),
            Self::Container(container) => container.is_available(tool),
            Self::Hybrid { native, container } => {
                native.is_available(tool) || container.is_available(tool)
            },
        }
    }

    /// Map a plugin-declared tool to a container image.
    ///
    /// On a pure-native strategy there is nothing to register; the request
    /// is accepted and ignored so loading stays mode-independent.
    ///
    /// # Errors
    ///
    /// [`ExecError::ReservedToolName`] when the tool is in the trusted set.
    pub fn register_image(&self, tool: &str, image: &str) -> ExecResult<()> {
        match self {
            Self::Native(_) => {
                debug!(tool, image, "native strategy, image registration ignored");
                Ok(())
            },
            Self::Container(container) | Self::Hybrid { container, .. } => {
                container.register_image(tool, image)
            },
        }
    }

    /// Run a tool's command line through this strategy.
    ///
    /// Hybrid prefers the native backend and falls back to the container
    /// backend only when the tool is not natively available.
    ///
    /// # Errors
    ///
    /// [`ExecError::Unavailable`] when no backend can run the tool, or the
    /// failing backend's own error.
    pub async fn execute(
        &self,
        tool: &str,
        args: &[String],
        config: &RunConfig,
    ) -> ExecResult<String> {
        match self {
            Self::Native(native) => native.execute(tool, args, config).await,
            Self::Container(container) => container.execute(tool, args, config).await,
            Self::Hybrid { native, container } => {
                if native.is_available(tool) {
                    info!(tool, "hybrid: using native backend");
                    native.execute(tool, args, config).await
                } else if container.is_available(tool) {
                    info!(tool, "hybrid: falling back to container backend");
                    container.execute(tool, args, config).await
                } else {
                    Err(ExecError::Unavailable {
                        tool: tool.to_string(),
                        mode: ExecutionMode::Hybrid,
                    })
                }
            },
        }
    }
}
