//! Container-manager collaborator seam.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ExecResult;

/// Narrow interface to a container runtime.
///
/// The container backend never talks to a runtime directly; it goes through
/// this trait so the real docker CLI can be swapped for a fake in tests and
/// for alternative runtimes in deployments.
#[async_trait]
pub trait ContainerManager: Send + Sync {
    /// True when the runtime is reachable.
    fn is_available(&self) -> bool;

    /// Run an image to completion and return its combined output.
    ///
    /// # Errors
    ///
    /// Returns an error when the runtime cannot be invoked at all; a
    /// non-zero container exit is not an error, its output is returned.
    async fn run(
        &self,
        image: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> ExecResult<String>;
}

impl std::fmt::Debug for dyn ContainerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerManager")
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}
