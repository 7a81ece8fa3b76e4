//! `osprey plugins list` and `osprey plugins vet`.

use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use osprey_core::{OspreyHome, PluginKind};
use osprey_plugins::{PluginManifest, python_sources};
use osprey_scan::{ScanResult, SecurityScanner};
use serde_json::json;

use crate::commands::{build_loader, build_strategy};
use crate::config::OspreyConfig;

/// List every discovered bundle with its scan verdict.
pub fn list(config: &OspreyConfig, home: &OspreyHome, json: bool) -> anyhow::Result<()> {
    let strategy = build_strategy(config.execution.mode);
    let loader = build_loader(config, home, strategy);

    let mut rows = Vec::new();
    for manifest in loader.discover() {
        let report = loader
            .scan_report(&manifest)
            .with_context(|| format!("scanning bundle '{}'", manifest.name))?;
        rows.push((manifest, report));
    }

    if json {
        let value: Vec<_> = rows
            .iter()
            .map(|(manifest, report)| {
                json!({
                    "name": manifest.name,
                    "version": manifest.version,
                    "kind": manifest.kind,
                    "tool": manifest.registry_key(),
                    "passed": report.passed,
                    "confidence": report.confidence,
                    "errors": report.errors,
                    "warnings": report.warnings,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("no plugin bundles found");
        return Ok(());
    }

    println!(
        "{:<20} {:<8} {:<10} {:<8} {}",
        "NAME".bold(),
        "KIND".bold(),
        "VERSION".bold(),
        "VERDICT".bold(),
        "CONFIDENCE".bold()
    );
    for (manifest, report) in &rows {
        let verdict = if report.passed {
            "pass".green()
        } else {
            "FAIL".red().bold()
        };
        println!(
            "{:<20} {:<8} {:<10} {:<8} {:.2}",
            manifest.name,
            manifest.kind.to_string(),
            manifest.version,
            verdict,
            report.confidence
        );
    }
    Ok(())
}

/// Scan one bundle directory and print every finding.
pub fn vet(config: &OspreyConfig, dir: &Path, kind_override: Option<PluginKind>) -> anyhow::Result<()> {
    anyhow::ensure!(dir.is_dir(), "'{}' is not a directory", dir.display());

    let kind = match kind_override {
        Some(kind) => kind,
        None => bundle_kind(dir).unwrap_or(PluginKind::Tool),
    };

    let scanner = SecurityScanner::new(config.scanner);
    let sources = python_sources(dir);
    anyhow::ensure!(!sources.is_empty(), "no Python sources under '{}'", dir.display());

    let report = ScanResult::merge(
        sources
            .iter()
            .map(|path| scanner.scan_file(path, kind)),
    );

    for violation in report.all_violations() {
        let severity = match violation.severity {
            osprey_scan::Severity::Error => "error".red().bold(),
            osprey_scan::Severity::Warning => "warning".yellow(),
        };
        println!(
            "{severity} [{}] line {}: {}",
            violation.rule, violation.line, violation.message
        );
        if !violation.snippet.is_empty() {
            println!("    {}", violation.snippet.dimmed());
        }
    }

    let verdict = if report.passed {
        "pass".green().bold()
    } else {
        "FAIL".red().bold()
    };
    println!(
        "\n{verdict} as {kind} plugin (confidence {:.2}, {} finding(s))",
        report.confidence,
        report.violation_count()
    );

    if !report.passed {
        std::process::exit(1);
    }
    Ok(())
}

/// Kind declared in the bundle's own descriptor, if it has one.
fn bundle_kind(dir: &Path) -> Option<PluginKind> {
    let raw = std::fs::read_to_string(dir.join("plugin.json")).ok()?;
    PluginManifest::parse(&raw).ok().map(|manifest| manifest.kind)
}
