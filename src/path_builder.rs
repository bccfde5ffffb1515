//! # Path Builder
//!
//! Storage key prefixes and bucket facts for a deployment identity.
//!
//! ## Layout
//!
//! ```text
//! artefacts<sep><client><sep><portfolio>[<sep><app>[<sep><branch>[<sep><build>]]]
//! files<sep><client><sep><portfolio>[<sep><app>[<sep><branch>[<sep><build>]]]
//! files<sep>shared
//! ```
//!
//! The branch segment is the branch short name. The separator is supplied
//! by the storage backend (`/` for object storage, the OS separator for a
//! local volume). A granularity whose identity fields are missing is left
//! out of the result rather than failing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let paths = ArtifactPathBuilder::new(&identity).build_paths("/");
//! println!("{}", paths["ArtifactKeyBuildPrefix"]);
//! ```

use std::collections::BTreeMap;

use crate::config::{FacterConfig, StorageMode};
use crate::domain::{ClientFacts, Identity};

const ARTEFACTS_ROOT: &str = "artefacts";
const FILES_ROOT: &str = "files";
const SHARED_SEGMENT: &str = "shared";

/// Key prefix facts for one identity
pub struct ArtifactPathBuilder<'a> {
    identity: &'a Identity,
}

impl<'a> ArtifactPathBuilder<'a> {
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }

    /// Every prefix fact available for this identity
    pub fn build_paths(&self, separator: &str) -> BTreeMap<String, String> {
        let mut paths = BTreeMap::new();

        let granular = [
            (Granularity::Portfolio, "ArtifactKeyPortfolioPrefix", "PortfolioFilesPrefix"),
            (Granularity::App, "ArtifactKeyAppPrefix", "AppFilesPrefix"),
            (Granularity::Branch, "ArtifactKeyBranchPrefix", "BranchFilesPrefix"),
            (Granularity::Build, "ArtifactKeyBuildPrefix", "BuildFilesPrefix"),
        ];
        for (granularity, artefact_key, files_key) in granular {
            if let Some(prefix) = self.artefacts_prefix(granularity, separator) {
                paths.insert(artefact_key.to_string(), prefix);
            }
            if let Some(prefix) = self.files_prefix(granularity, separator) {
                paths.insert(files_key.to_string(), prefix);
            }
        }

        if let Some(build) = paths.get("ArtifactKeyBuildPrefix").cloned() {
            paths.insert("ArtefactKeyBuildPrefix".to_string(), build);
        }

        if let Some(deepest) = self.deepest_artefacts_prefix(separator) {
            paths.insert("ArtefactsPrefix".to_string(), deepest.clone());
            paths.insert("ArtifactKeyPrefix".to_string(), deepest);
        }

        paths.insert(
            "SharedFilesPrefix".to_string(),
            [FILES_ROOT, SHARED_SEGMENT].join(separator),
        );

        paths
    }

    /// `artefacts/...` prefix down to a granularity
    pub fn artefacts_prefix(&self, granularity: Granularity, separator: &str) -> Option<String> {
        self.prefix(ARTEFACTS_ROOT, granularity, separator)
    }

    /// `files/...` prefix down to a granularity
    pub fn files_prefix(&self, granularity: Granularity, separator: &str) -> Option<String> {
        self.prefix(FILES_ROOT, granularity, separator)
    }

    fn deepest_artefacts_prefix(&self, separator: &str) -> Option<String> {
        Granularity::ALL
            .iter()
            .rev()
            .find_map(|g| self.artefacts_prefix(*g, separator))
    }

    fn prefix(&self, root: &str, granularity: Granularity, separator: &str) -> Option<String> {
        let id = self.identity;
        let branch = id.branch_short_name();
        let segments = [
            Some(id.client()),
            id.portfolio(),
            id.app(),
            branch.as_deref(),
            id.build(),
        ];

        let mut parts = vec![root];
        for segment in &segments[..=granularity.depth()] {
            parts.push((*segment)?);
        }
        Some(parts.join(separator))
    }
}

/// Depth of a storage prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Portfolio,
    App,
    Branch,
    Build,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Portfolio,
        Granularity::App,
        Granularity::Branch,
        Granularity::Build,
    ];

    /// Index of the deepest identity segment (client is 0)
    fn depth(&self) -> usize {
        match self {
            Self::Portfolio => 1,
            Self::App => 2,
            Self::Branch => 3,
            Self::Build => 4,
        }
    }
}

/// Artefact bucket location for a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketLocation {
    pub name: String,
    pub region: String,
    pub url: String,
}

impl BucketLocation {
    /// Resolve the bucket from client facts, falling back to config
    ///
    /// Name: `ArtefactBucketName`, else the configured pattern with the
    /// client's `Scope` (or the configured scope prefix).
    /// Region: `BucketRegion`, else the configured bucket region.
    pub fn resolve(config: &FacterConfig, client: &ClientFacts) -> Self {
        let scope_prefix = client.scope.as_deref().unwrap_or(&config.scope_prefix);
        let name = client
            .artefact_bucket_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                config
                    .storage
                    .artefact_bucket_name(scope_prefix, &client.client)
            });
        let region = client
            .bucket_region
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| config.storage.bucket_region.clone());
        let url = store_url(config, &name, &region);

        Self { name, region, url }
    }

    /// Bucket facts under both spellings plus the files bucket
    pub fn facts(&self) -> BTreeMap<String, String> {
        let mut facts = BTreeMap::new();
        for (prefix, url_key) in [
            ("Artefacts", "ArtefactsBucketUrl"),
            ("Artifact", "ArtifactBaseUrl"),
            ("Files", "FilesBucketUrl"),
        ] {
            facts.insert(format!("{}BucketName", prefix), self.name.clone());
            facts.insert(format!("{}BucketRegion", prefix), self.region.clone());
            facts.insert(url_key.to_string(), self.url.clone());
        }
        facts
    }
}

/// Base URL of a bucket for the configured storage mode
pub fn store_url(config: &FacterConfig, bucket: &str, region: &str) -> String {
    match config.storage.mode {
        StorageMode::S3 => format!("https://s3-{}.amazonaws.com/{}", region, bucket),
        StorageMode::Local => {
            let volume = config.storage.volume.as_deref().unwrap_or("");
            [volume, bucket].join(StorageMode::Local.separator())
        }
    }
}

/// Prefix and bucket facts merged into a resolved document
pub fn storage_facts(
    config: &FacterConfig,
    client: &ClientFacts,
    identity: &Identity,
) -> BTreeMap<String, String> {
    let mut facts = BucketLocation::resolve(config, client).facts();
    facts.extend(ArtifactPathBuilder::new(identity).build_paths(config.storage.mode.separator()));
    facts
}
