//! Registry commands - tenant tables and account zones

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use facter::infrastructure::{load_registry_dir, table_name, FactsKind};
use facter::{FacterConfig, Registry};

pub fn tables(client: &str, config: &FacterConfig) -> Result<()> {
    println!("{} {}", "Tables for".bold(), client.bright_cyan());
    for kind in FactsKind::ALL {
        println!(
            "  {:<12} {}",
            kind.name(),
            table_name(kind, client, &config.scope_prefix)
        );
    }
    Ok(())
}

pub fn zones(client: &str, account_id: &str, registry_dir: &str, config: &FacterConfig) -> Result<()> {
    let registry = Registry::with_scope_prefix(config.scope_prefix.clone());
    load_registry_dir(Path::new(registry_dir), &registry)
        .with_context(|| format!("Failed to load registry from {}", registry_dir))?;

    let zones = registry
        .zones_for_account(client, account_id)
        .with_context(|| format!("Failed to list zones for {}", client))?;

    if zones.is_empty() {
        println!(
            "{} No zones registered for account {}",
            "⚠".yellow(),
            account_id
        );
        return Ok(());
    }

    println!("{} {}", "Zones for account".bold(), account_id.bright_cyan());
    for zone in zones {
        let regions: Vec<&str> = zone.region_facts.keys().map(String::as_str).collect();
        println!("  {:<16} regions: {}", zone.zone.bright_green(), regions.join(", "));
    }
    Ok(())
}
