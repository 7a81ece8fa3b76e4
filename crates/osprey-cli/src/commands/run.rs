//! `osprey run <tool> <target>`.

use osprey_core::{ExecutionMode, OspreyHome};
use osprey_exec::RunConfig;
use tracing::info;

use crate::commands::{build_loader, build_strategy};
use crate::config::OspreyConfig;

/// Load all plugins and run one tool against a target.
pub async fn run(
    config: &OspreyConfig,
    home: &OspreyHome,
    tool: &str,
    target: &str,
    proxy_url: Option<String>,
    mode_override: Option<ExecutionMode>,
) -> anyhow::Result<()> {
    let mode = mode_override.unwrap_or(config.execution.mode);
    let strategy = build_strategy(mode);
    let loader = build_loader(config, home, strategy);
    let registry = loader.load_all();

    let adapter = registry.get(tool).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown tool '{tool}' (loaded: {})",
            registry.names().join(", ")
        )
    })?;

    if !adapter.can_run() {
        anyhow::bail!("tool '{tool}' is not available in {mode} mode");
    }

    let mut run_config = RunConfig::new();
    if let Some(proxy_url) = proxy_url {
        run_config = run_config.with_proxy_url(proxy_url);
    }

    info!(tool, target, %mode, "running tool");
    let result = adapter.execute(target, &run_config).await;

    if !result.raw_output.is_empty() {
        println!("{}", result.raw_output);
    }
    if let Some(error) = &result.error {
        anyhow::bail!("tool '{tool}' failed: {error}");
    }
    Ok(())
}
