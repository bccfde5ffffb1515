//! Command implementations for the facter binary

pub mod inspect;
pub mod registry;
pub mod resolve;

use anyhow::{Context, Result};
use std::path::Path;

use facter::{FacterConfig, Identity, IdentityParser};

use crate::cli::IdentityArgs;

/// Load the configuration named on the command line (or defaults)
pub fn load_config(path: Option<&str>) -> Result<FacterConfig> {
    FacterConfig::load(path.map(Path::new)).with_context(|| match path {
        Some(path) => format!("Failed to load facter config: {}", path),
        None => "Invalid default facter config".to_string(),
    })
}

impl IdentityArgs {
    /// Build the identity from a PRN or from the separate fields
    pub fn to_identity(&self) -> Result<Identity> {
        match &self.prn {
            Some(prn) => {
                let (identity, _) = IdentityParser::new()
                    .parse(&self.client, prn)
                    .with_context(|| format!("Invalid PRN: {}", prn))?;
                Ok(identity)
            }
            None => Identity::new(
                &self.client,
                self.portfolio.as_deref(),
                self.app.as_deref(),
                self.branch.as_deref(),
                self.build.as_deref(),
                self.component.as_deref(),
            )
            .context("Invalid deployment identity"),
        }
    }
}
