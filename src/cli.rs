//! CLI definitions for facter
//!
//! This module contains all CLI argument parsing structures using clap.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "facter",
    version,
    about = "Deployment facts registry and resolution engine",
    long_about = "Resolves the merged deployment facts (account, region, portfolio, app,\nartefact paths and tags) for a deployment identity."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Facter configuration file (YAML)
    #[arg(long, global = true, env = "FACTER_CONFIG")]
    pub config: Option<String>,
}

/// Identity given either as a PRN or as separate fields
#[derive(Args, Debug, Clone)]
pub struct IdentityArgs {
    /// Client (tenant) name
    #[arg(long, env = "FACTER_CLIENT")]
    pub client: String,

    /// PRN (prn:<portfolio>:<app>:<branch>:<build>:<component>)
    #[arg(long, conflicts_with_all = ["portfolio", "app", "branch", "build", "component"])]
    pub prn: Option<String>,

    /// Portfolio name
    #[arg(long)]
    pub portfolio: Option<String>,

    /// App name
    #[arg(long)]
    pub app: Option<String>,

    /// Branch name (e.g. feature1/dev-sin)
    #[arg(long)]
    pub branch: Option<String>,

    /// Build number or tag
    #[arg(long)]
    pub build: Option<String>,

    /// Component name
    #[arg(long)]
    pub component: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the merged facts for a deployment
    Resolve {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Directory of registry seed files (*.yaml, *.yml)
        #[arg(long, env = "FACTER_REGISTRY_DIR")]
        registry_dir: String,

        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Parse a PRN and show its scope and components
    Parse {
        /// Client (tenant) name
        #[arg(long, env = "FACTER_CLIENT")]
        client: String,

        /// PRN to parse
        prn: String,
    },

    /// Derive environment and region alias from a branch name
    DeriveEnv {
        /// Branch name
        branch: String,
    },

    /// Show the artefact storage facts for a deployment
    Paths {
        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Show the facts table names of a client
    Tables {
        /// Client (tenant) name
        #[arg(long, env = "FACTER_CLIENT")]
        client: String,
    },

    /// List the zones a client has registered for an account
    Zones {
        /// Client (tenant) name
        #[arg(long, env = "FACTER_CLIENT")]
        client: String,

        /// AWS account id
        #[arg(long)]
        account_id: String,

        /// Directory of registry seed files (*.yaml, *.yml)
        #[arg(long, env = "FACTER_REGISTRY_DIR")]
        registry_dir: String,
    },
}
