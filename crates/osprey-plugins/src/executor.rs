//! Bounded concurrent execution of loaded adapters.

use std::sync::Arc;

use futures::future::join_all;
use osprey_core::ToolResult;
use osprey_exec::RunConfig;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::{PluginError, PluginResult};
use crate::registry::AdapterRegistry;

/// Default number of adapters running at once.
pub const DEFAULT_PARALLELISM: usize = 4;

/// One tool invocation request.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    /// Registry key of the adapter to run.
    pub tool: String,
    /// Investigation target handed to the adapter.
    pub target: String,
    /// Per-invocation execution options.
    pub config: RunConfig,
}

impl ToolRequest {
    /// Request with default run options.
    #[must_use]
    pub fn new(tool: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            target: target.into(),
            config: RunConfig::default(),
        }
    }
}

/// Outcome of one request in a batch.
#[derive(Debug)]
pub struct ToolRun {
    /// Registry key the request named.
    pub tool: String,
    /// The adapter's result, or why it never ran.
    pub outcome: PluginResult<ToolResult>,
}

/// Dispatches adapter runs through a bounded worker pool.
///
/// Each request is executed in isolation: an unknown tool or a failing
/// adapter yields an error in its own [`ToolRun`] and never cancels
/// siblings. Results come back in request order.
pub struct BatchExecutor {
    registry: Arc<AdapterRegistry>,
    parallelism: usize,
}

impl BatchExecutor {
    /// Executor with [`DEFAULT_PARALLELISM`].
    #[must_use]
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            parallelism: DEFAULT_PARALLELISM,
        }
    }

    /// Override the worker-pool size (clamped to at least 1).
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Run a batch of requests and return their outcomes in request order.
    pub async fn run(&self, requests: Vec<ToolRequest>) -> Vec<ToolRun> {
        let semaphore = Arc::new(Semaphore::new(self.parallelism));
        debug!(
            requests = requests.len(),
            parallelism = self.parallelism,
            "dispatching tool batch"
        );

        let tasks = requests.into_iter().map(|request| {
            let semaphore = Arc::clone(&semaphore);
            let registry = Arc::clone(&self.registry);
            async move {
                // A closed semaphore is impossible here; fall through to a
                // sequential run if it ever is.
                let _permit = semaphore.acquire().await;

                let outcome = match registry.get(&request.tool) {
                    Some(adapter) => {
                        let result = adapter.execute(&request.target, &request.config).await;
                        if let Some(error) = &result.error {
                            warn!(tool = %request.tool, error, "tool run reported failure");
                        }
                        Ok(result)
                    },
                    None => Err(PluginError::UnknownTool(request.tool.clone())),
                };

                ToolRun {
                    tool: request.tool,
                    outcome,
                }
            }
        });

        join_all(tasks).await
    }
}

impl std::fmt::Debug for BatchExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExecutor")
            .field("parallelism", &self.parallelism)
            .field("registry", &self.registry)
            .finish()
    }
}
