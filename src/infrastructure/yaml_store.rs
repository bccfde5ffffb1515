//! Registry seed directories
//!
//! Every `*.yaml` / `*.yml` file under a directory may hold any of four
//! record lists:
//!
//! ```yaml
//! Clients:
//!   - Client: acme
//!     BucketRegion: us-east-1
//! Portfolios:
//!   - Client: acme
//!     Portfolio: core
//! Zones:
//!   - Client: acme
//!     Zone: z1
//!     RegionFacts:
//!       use1: { AwsRegion: us-east-1 }
//! Apps:
//!   - ClientPortfolio: acme:core
//!     AppRegex: "prn:core:api.*"
//!     Zone: z1
//!     Region: use1
//! ```
//!
//! Files are read in path order. The apps table keeps registrations sorted
//! by `AppRegex`, so first-match order is the lexical order of the patterns
//! and not the order they appear in the files.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::registry::Registry;
use crate::domain::{AppFacts, ClientFacts, FactsDocument, FactsRecord, PortfolioFacts, ZoneFacts};
use crate::error::RepositoryError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SeedFile {
    #[serde(default)]
    clients: Vec<FactsDocument>,
    #[serde(default)]
    portfolios: Vec<FactsDocument>,
    #[serde(default)]
    zones: Vec<FactsDocument>,
    #[serde(default)]
    apps: Vec<FactsDocument>,
}

/// Counts of records loaded from a directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub files: usize,
    pub clients: usize,
    pub portfolios: usize,
    pub zones: usize,
    pub apps: usize,
}

/// Load every seed file under `dir` into `registry`
pub fn load_registry_dir(dir: &Path, registry: &Registry) -> Result<LoadSummary, RepositoryError> {
    if !dir.is_dir() {
        return Err(RepositoryError::Io {
            path: dir.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut summary = LoadSummary::default();

    for entry in walkdir::WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
        })
    {
        let path = entry.path();
        let path_str = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| RepositoryError::Io {
            path: path_str.clone(),
            message: e.to_string(),
        })?;

        // Empty files are allowed
        let seed: SeedFile = if content.trim().is_empty() {
            SeedFile::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| RepositoryError::Parse {
                path: path_str.clone(),
                message: e.to_string(),
            })?
        };

        for doc in &seed.clients {
            registry.put_client(&decode::<ClientFacts>(doc, &path_str)?)?;
        }
        for doc in &seed.portfolios {
            registry.put_portfolio(&decode::<PortfolioFacts>(doc, &path_str)?)?;
        }
        for doc in &seed.zones {
            registry.put_zone(&decode::<ZoneFacts>(doc, &path_str)?)?;
        }
        for doc in &seed.apps {
            registry.put_app(&decode::<AppFacts>(doc, &path_str)?)?;
        }

        debug!(
            path = %path_str,
            clients = seed.clients.len(),
            portfolios = seed.portfolios.len(),
            zones = seed.zones.len(),
            apps = seed.apps.len(),
            "Loaded seed file"
        );

        summary.files += 1;
        summary.clients += seed.clients.len();
        summary.portfolios += seed.portfolios.len();
        summary.zones += seed.zones.len();
        summary.apps += seed.apps.len();
    }

    info!(
        dir = %dir.display(),
        files = summary.files,
        apps = summary.apps,
        "Registry loaded"
    );
    Ok(summary)
}

fn decode<R: FactsRecord>(doc: &FactsDocument, path: &str) -> Result<R, RepositoryError> {
    R::from_document(doc).map_err(|message| RepositoryError::InvalidRecord {
        kind: R::KIND,
        path: path.to_string(),
        message,
    })
}
