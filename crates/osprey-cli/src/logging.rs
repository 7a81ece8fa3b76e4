//! Logging initialization for the `osprey` binary.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Log output format, selected by the global `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable output with colors.
    Pretty,
    /// Structured JSON lines.
    Json,
}

/// Initialize the global subscriber. Called once from `main`.
///
/// Filter precedence: `OSPREY_LOG` environment variable, then `--verbose`
/// (forces `debug`), then the configured level. Logs go to stderr so tool
/// output on stdout stays clean.
pub fn init(level: &str, format: LogFormat, verbose: bool) -> anyhow::Result<()> {
    let directive = if let Ok(directive) = std::env::var("OSPREY_LOG") {
        directive
    } else if verbose {
        "debug".to_string()
    } else {
        level.to_string()
    };

    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{directive}'"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}
