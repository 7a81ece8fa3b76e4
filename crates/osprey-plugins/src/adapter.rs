//! The adapter seam between loaded plugins and the host.

use std::sync::Arc;

use async_trait::async_trait;
use osprey_core::ToolResult;
use osprey_exec::{ExecutionStrategy, RunConfig};
use serde_json::Value;
use tracing::debug;

use crate::error::PluginResult;
use crate::manifest::PluginManifest;

/// What every loaded plugin exposes to the host.
///
/// Adapters receive an [`ExecutionStrategy`] at construction and run their
/// tool exclusively through it. `execute` never fails out-of-band: run
/// problems are folded into [`ToolResult::error`] so one misbehaving tool
/// cannot take down a batch.
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// Name of the tool this adapter runs.
    fn tool_name(&self) -> &str;

    /// The manifest the adapter was built from.
    fn manifest(&self) -> &PluginManifest;

    /// True when the bound strategy can run the tool right now.
    fn can_run(&self) -> bool;

    /// Investigate one target and return everything found.
    async fn execute(&self, target: &str, config: &RunConfig) -> ToolResult;
}

impl std::fmt::Debug for dyn ToolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAdapter")
            .field("tool_name", &self.tool_name())
            .finish_non_exhaustive()
    }
}

/// Generic adapter that passes the target straight to the tool.
///
/// Runs `tool_name target [default_args...]` through the strategy and wraps
/// the combined output in a [`ToolResult`]; entity extraction belongs to
/// specialized adapters. The optional `default_args` come from the
/// manifest's `capabilities` map as an array of strings.
pub struct CommandAdapter {
    manifest: PluginManifest,
    tool: String,
    default_args: Vec<String>,
    strategy: Arc<ExecutionStrategy>,
}

impl CommandAdapter {
    /// Catalog factory for [`CommandAdapter`].
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature matches [`crate::AdapterFactory`].
    pub fn from_manifest(
        manifest: &PluginManifest,
        strategy: Arc<ExecutionStrategy>,
    ) -> PluginResult<Box<dyn ToolAdapter>> {
        let tool = manifest.registry_key().to_string();
        let default_args = manifest
            .capabilities
            .get("default_args")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Box::new(Self {
            manifest: manifest.clone(),
            tool,
            default_args,
            strategy,
        }))
    }
}

#[async_trait]
impl ToolAdapter for CommandAdapter {
    fn tool_name(&self) -> &str {
        &self.tool
    }

    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn can_run(&self) -> bool {
        self.strategy.is_available(&self.tool)
    }

    async fn execute(&self, target: &str, config: &RunConfig) -> ToolResult {
        let mut args = Vec::with_capacity(self.default_args.len().saturating_add(1));
        args.push(target.to_string());
        args.extend(self.default_args.iter().cloned());

        debug!(tool = %self.tool, target, "command adapter dispatching");
        match self.strategy.execute(&self.tool, &args, config).await {
            Ok(raw_output) => {
                let mut result = ToolResult::ok(&self.tool, raw_output);
                result.metadata.insert(
                    "mode".to_string(),
                    Value::String(self.strategy.mode().to_string()),
                );
                result
            },
            Err(err) => ToolResult::failed(&self.tool, err.to_string()),
        }
    }
}

impl std::fmt::Debug for CommandAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandAdapter")
            .field("tool", &self.tool)
            .field("default_args", &self.default_args)
            .finish_non_exhaustive()
    }
}
