//! Osprey CLI - plugin vetting and sandboxed OSINT tool runs.
//!
//! The binary wires the subsystem together: layered TOML config, logging,
//! an execution strategy for the configured mode, and the plugin loader
//! over the system and user plugin roots.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use osprey_core::{ExecutionMode, OspreyHome, PluginKind};

mod commands;
mod config;
mod logging;

use config::OspreyConfig;
use logging::LogFormat;

/// Osprey - OSINT plugin vetting and sandboxed execution
#[derive(Parser)]
#[command(name = "osprey")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (default: ~/.osprey/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and vet plugin bundles
    Plugins {
        #[command(subcommand)]
        command: PluginCommands,
    },

    /// Load all plugins and run one tool against a target
    Run {
        /// Registry key of the tool to run
        tool: String,

        /// Investigation target (username, domain, email, ...)
        target: String,

        /// Proxy URL for the tool's network traffic
        #[arg(long)]
        proxy_url: Option<String>,

        /// Override the configured execution mode
        #[arg(long)]
        mode: Option<ExecutionMode>,
    },
}

#[derive(Subcommand)]
enum PluginCommands {
    /// List discovered bundles with their scan verdicts
    List {
        /// Emit machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Scan one bundle directory and print every finding
    Vet {
        /// Bundle directory to scan
        dir: PathBuf,

        /// Scan under a specific trust tier instead of the bundle's own
        #[arg(long)]
        kind: Option<PluginKind>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let home = OspreyHome::resolve().context("resolving osprey home directory")?;
    let config_path = cli.config.clone().unwrap_or_else(|| home.config_path());
    let config = OspreyConfig::load(&config_path)?;

    logging::init(&config.logging.level, cli.format, cli.verbose)?;

    match cli.command {
        Commands::Plugins { command } => match command {
            PluginCommands::List { json } => commands::plugins::list(&config, &home, json),
            PluginCommands::Vet { dir, kind } => commands::plugins::vet(&config, &dir, kind),
        },
        Commands::Run {
            tool,
            target,
            proxy_url,
            mode,
        } => commands::run::run(&config, &home, &tool, &target, proxy_url, mode).await,
    }
}
