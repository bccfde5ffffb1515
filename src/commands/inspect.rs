//! Inspection commands - PRN parsing, branch derivation, storage paths
//!
//! None of these read the registry.

use anyhow::{Context, Result};
use colored::Colorize;

use facter::domain::ClientFacts;
use facter::path_builder::storage_facts;
use facter::{FacterConfig, IdentityParser};

use crate::cli::IdentityArgs;

pub fn parse(client: &str, prn: &str) -> Result<()> {
    let (identity, scope) = IdentityParser::new()
        .parse(client, prn)
        .with_context(|| format!("Invalid PRN: {}", prn))?;

    println!("{} {}", "Scope:".bold(), scope.name().bright_green());
    println!("  client:    {}", identity.client());
    let fields = [
        ("portfolio", identity.portfolio().map(str::to_string)),
        ("app", identity.app().map(str::to_string)),
        ("branch", identity.branch().map(str::to_string)),
        ("short", identity.branch_short_name()),
        ("build", identity.build().map(str::to_string)),
        ("component", identity.component().map(str::to_string)),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            println!("  {:<10} {}", format!("{}:", name), value);
        }
    }
    println!("  prn:       {}", identity.prn().bright_cyan());
    Ok(())
}

pub fn derive_env(branch: &str, config: &FacterConfig) -> Result<()> {
    let derived = config.environment_deriver().derive(branch);
    println!("{} {}", "Environment:".bold(), derived.environment.bright_yellow());
    println!("{} {}", "Region:".bold(), derived.region_alias.bright_yellow());
    Ok(())
}

/// Storage facts using only config and the client name
pub fn paths(identity: &IdentityArgs, config: &FacterConfig) -> Result<()> {
    let identity = identity.to_identity()?;
    let client = ClientFacts {
        client: identity.client().to_string(),
        ..Default::default()
    };

    println!(
        "{} {} ({})",
        "Storage facts for".bold(),
        identity.prn().bright_cyan(),
        config.storage.mode.name()
    );
    for (key, value) in storage_facts(config, &client, &identity) {
        println!("  {:<28} {}", key, value);
    }
    Ok(())
}
