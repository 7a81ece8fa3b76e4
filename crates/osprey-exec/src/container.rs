//! Container backend: tools as one-shot container runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use osprey_core::ExecutionMode;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::{ExecError, ExecResult};
use crate::manager::ContainerManager;
use crate::proxy;

/// Built-in tool-name to image mapping. Reserved: plugins can add their own
/// tools but can never remap these.
const TRUSTED_IMAGES: &[(&str, &str)] = &[
    ("sherlock", "sherlock/sherlock"),
    ("theharvester", "secsi/theharvester"),
    ("h8mail", "khast3x/h8mail"),
    ("holehe", "holehe"),
    ("phoneinfoga", "sundowndev/phoneinfoga"),
    ("sublist3r", "sublist3r"),
    ("photon", "photon"),
    ("exiftool", "exiftool"),
];

/// Runs tools as containers through a [`ContainerManager`].
///
/// The trusted image map is fixed at compile time; images declared by
/// loaded plugins live in a separate map written during plugin registration
/// and read during execution. Safe to share across concurrent runs.
pub struct ContainerExecutor {
    manager: Arc<dyn ContainerManager>,
    registered: RwLock<HashMap<String, String>>,
}

impl ContainerExecutor {
    /// Executor backed by the given container manager.
    #[must_use]
    pub fn new(manager: Arc<dyn ContainerManager>) -> Self {
        Self {
            manager,
            registered: RwLock::new(HashMap::new()),
        }
    }

    /// True when `tool` belongs to the trusted built-in mapping.
    #[must_use]
    pub fn is_trusted(tool: &str) -> bool {
        TRUSTED_IMAGES.iter().any(|(name, _)| *name == tool)
    }

    /// Image mapped to `tool`, trusted mapping first.
    #[must_use]
    pub fn image_for(&self, tool: &str) -> Option<String> {
        if let Some((_, image)) = TRUSTED_IMAGES.iter().find(|(name, _)| *name == tool) {
            return Some((*image).to_string());
        }
        self.registered
            .read()
            .ok()
            .and_then(|map| map.get(tool).cloned())
    }

    /// Map a plugin-declared tool to a container image.
    ///
    /// Re-registering a plugin tool overwrites the previous image with a
    /// warning, matching registry-rebuild semantics.
    ///
    /// # Errors
    ///
    /// [`ExecError::ReservedToolName`] when `tool` is in the trusted set;
    /// the trusted mapping is left untouched.
    pub fn register_image(&self, tool: &str, image: &str) -> ExecResult<()> {
        if Self::is_trusted(tool) {
            return Err(ExecError::ReservedToolName {
                tool: tool.to_string(),
            });
        }

        if let Ok(mut map) = self.registered.write() {
            if let Some(previous) = map.insert(tool.to_string(), image.to_string()) {
                warn!(tool, previous, image, "plugin image mapping overwritten");
            } else {
                info!(tool, image, "registered plugin container image");
            }
        }
        Ok(())
    }

    /// True when the runtime is reachable and the tool has an image mapping.
    #[must_use]
    pub fn is_available(&self, tool: &str) -> bool {
        self.manager.is_available() && self.image_for(tool).is_some()
    }

    /// Run the tool's image with the given arguments.
    ///
    /// # Errors
    ///
    /// [`ExecError::Unavailable`] when the runtime is down,
    /// [`ExecError::UnknownImage`] when no image maps to the tool, or a
    /// runtime error from the manager.
    pub async fn execute(
        &self,
        tool: &str,
        args: &[String],
        config: &RunConfig,
    ) -> ExecResult<String> {
        if !self.manager.is_available() {
            return Err(ExecError::Unavailable {
                tool: tool.to_string(),
                mode: ExecutionMode::Container,
            });
        }
        let Some(image) = self.image_for(tool) else {
            return Err(ExecError::UnknownImage {
                tool: tool.to_string(),
            });
        };

        info!(tool, image, "executing tool in container");
        let env = proxy::child_env(config);
        self.manager.run(&image, args, &env).await
    }
}

impl std::fmt::Debug for ContainerExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerExecutor")
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeContainerManager;

    #[test]
    fn trusted_tools_are_always_mapped() {
        let executor = ContainerExecutor::new(Arc::new(FakeContainerManager::up("ok")));
        assert_eq!(executor.image_for("sherlock").as_deref(), Some("sherlock/sherlock"));
        assert_eq!(executor.image_for("h8mail").as_deref(), Some("khast3x/h8mail"));
        assert_eq!(executor.image_for("unknown"), None);
    }

    #[test]
    fn reserved_name_registration_is_rejected() {
        let executor = ContainerExecutor::new(Arc::new(FakeContainerManager::up("ok")));
        let err = executor
            .register_image("sherlock", "attacker/image")
            .unwrap_err();
        assert!(matches!(err, ExecError::ReservedToolName { .. }));
        // The trusted mapping is unchanged.
        assert_eq!(executor.image_for("sherlock").as_deref(), Some("sherlock/sherlock"));
    }

    #[test]
    fn plugin_registration_round_trips() {
        let executor = ContainerExecutor::new(Arc::new(FakeContainerManager::up("ok")));
        assert!(!executor.is_available("newtool"));

        executor.register_image("newtool", "acme/newtool").unwrap();
        assert!(executor.is_available("newtool"));
        assert_eq!(executor.image_for("newtool").as_deref(), Some("acme/newtool"));
    }

    #[test]
    fn re_registration_overwrites() {
        let executor = ContainerExecutor::new(Arc::new(FakeContainerManager::up("ok")));
        executor.register_image("newtool", "acme/v1").unwrap();
        executor.register_image("newtool", "acme/v2").unwrap();
        assert_eq!(executor.image_for("newtool").as_deref(), Some("acme/v2"));
    }

    #[test]
    fn unavailable_runtime_means_unavailable_tool() {
        let executor = ContainerExecutor::new(Arc::new(FakeContainerManager::down()));
        assert!(!executor.is_available("sherlock"));
    }

    #[tokio::test]
    async fn execute_runs_the_mapped_image() {
        let manager = Arc::new(FakeContainerManager::up("3 profiles found"));
        let executor = ContainerExecutor::new(manager.clone());

        let output = executor
            .execute("sherlock", &["alice".to_string()], &RunConfig::new())
            .await
            .unwrap();
        assert_eq!(output, "3 profiles found");
        assert_eq!(manager.runs(), 1);
        assert_eq!(manager.last_image().as_deref(), Some("sherlock/sherlock"));
    }

    #[tokio::test]
    async fn execute_on_down_runtime_is_unavailable() {
        let executor = ContainerExecutor::new(Arc::new(FakeContainerManager::down()));
        let err = executor
            .execute("sherlock", &[], &RunConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn execute_unknown_tool_is_unknown_image() {
        let executor = ContainerExecutor::new(Arc::new(FakeContainerManager::up("ok")));
        let err = executor
            .execute("ghost", &[], &RunConfig::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::UnknownImage { .. }));
    }

    #[tokio::test]
    async fn proxy_env_reaches_the_manager() {
        let manager = Arc::new(FakeContainerManager::up("ok"));
        let executor = ContainerExecutor::new(manager.clone());

        let config = RunConfig::new().with_proxy_url("http://127.0.0.1:8080");
        executor
            .execute("sherlock", &[], &config)
            .await
            .unwrap();
        let env = manager.last_env();
        assert_eq!(env.get("ALL_PROXY").map(String::as_str), Some("http://127.0.0.1:8080"));
    }
}
