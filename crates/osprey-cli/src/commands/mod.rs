//! Subcommand implementations.

use std::sync::Arc;

use osprey_core::{EnvCredentialStore, ExecutionMode, OspreyHome};
use osprey_exec::{DockerCli, ExecutionStrategy};
use osprey_plugins::{AdapterCatalog, PluginLoader};
use osprey_scan::SecurityScanner;

use crate::config::OspreyConfig;

pub mod plugins;
pub mod run;

/// Strategy for the configured (or overridden) execution mode.
///
/// The docker daemon is only probed when a container-capable mode asks
/// for it.
pub(crate) fn build_strategy(mode: ExecutionMode) -> Arc<ExecutionStrategy> {
    match mode {
        ExecutionMode::Native => Arc::new(ExecutionStrategy::native()),
        ExecutionMode::Container | ExecutionMode::Hybrid => {
            let manager = Arc::new(DockerCli::probe());
            Arc::new(ExecutionStrategy::for_mode(mode, manager))
        },
    }
}

/// Loader over the configured plugin roots.
pub(crate) fn build_loader(
    config: &OspreyConfig,
    home: &OspreyHome,
    strategy: Arc<ExecutionStrategy>,
) -> PluginLoader {
    let user_dir = config
        .plugins
        .user_dir
        .clone()
        .unwrap_or_else(|| home.plugins_dir());
    PluginLoader::new(
        vec![config.plugins.system_dir.clone(), user_dir],
        SecurityScanner::new(config.scanner),
        strategy,
        AdapterCatalog::builtin(),
        Arc::new(EnvCredentialStore),
    )
}
