//! Resolve command - prints the merged facts for a deployment

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::info;

use facter::infrastructure::load_registry_dir;
use facter::{FactsResolutionEngine, FacterConfig, Registry, ResolvedFacts};

use crate::cli::IdentityArgs;

/// Output format for resolved facts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => anyhow::bail!("Unsupported output format: {} (expected json or yaml)", other),
        }
    }
}

pub fn execute(
    identity: &IdentityArgs,
    registry_dir: &str,
    format: &str,
    config: FacterConfig,
) -> Result<()> {
    let format = OutputFormat::parse(format)?;
    let identity = identity.to_identity()?;

    let registry = Registry::with_scope_prefix(config.scope_prefix.clone());
    let summary = load_registry_dir(Path::new(registry_dir), &registry)
        .with_context(|| format!("Failed to load registry from {}", registry_dir))?;
    info!(
        "Loaded {} client(s), {} portfolio(s), {} zone(s), {} app(s) from {} file(s)",
        summary.clients, summary.portfolios, summary.zones, summary.apps, summary.files
    );

    let engine = FactsResolutionEngine::new(registry, config);
    let resolved = engine
        .resolve(&identity)
        .with_context(|| format!("Failed to resolve facts for {}", identity))?;

    print_resolved(&resolved, format)?;
    print_summary(&resolved);
    Ok(())
}

fn print_resolved(resolved: &ResolvedFacts, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(resolved)?,
        OutputFormat::Yaml => serde_yaml::to_string(resolved)?,
    };
    println!("{}", rendered);
    Ok(())
}

/// Summary goes to stderr so stdout stays machine-readable
fn print_summary(resolved: &ResolvedFacts) {
    for warning in resolved.warnings() {
        eprintln!(
            "{} skipped app pattern {}: {}",
            "⚠".yellow(),
            warning.app_regex.yellow(),
            warning.message
        );
    }
    eprintln!(
        "{} {} → {} / {} / {}",
        "✅".green(),
        resolved.prn().bold(),
        resolved.environment().bright_yellow(),
        resolved.zone(),
        resolved.region_alias()
    );
    eprintln!("   digest: {}", resolved.digest().dimmed());
}
