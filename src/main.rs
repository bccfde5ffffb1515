use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{inspect, registry, resolve};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    // stdout carries the facts; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve {
            identity,
            registry_dir,
            format,
        } => {
            resolve::execute(&identity, &registry_dir, &format, config)?;
        }
        Commands::Parse { client, prn } => {
            inspect::parse(&client, &prn)?;
        }
        Commands::DeriveEnv { branch } => {
            inspect::derive_env(&branch, &config)?;
        }
        Commands::Paths { identity } => {
            inspect::paths(&identity, &config)?;
        }
        Commands::Tables { client } => {
            registry::tables(&client, &config)?;
        }
        Commands::Zones {
            client,
            account_id,
            registry_dir,
        } => {
            registry::zones(&client, &account_id, &registry_dir, &config)?;
        }
    }

    Ok(())
}
