//! Artefact storage configuration.

use serde::{Deserialize, Serialize};

/// Where artefacts live: object storage or a local volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    #[default]
    S3,
    Local,
}

impl StorageMode {
    /// Key separator for this storage backend
    pub fn separator(&self) -> &'static str {
        match self {
            Self::S3 => "/",
            Self::Local => std::path::MAIN_SEPARATOR_STR,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Local => "local",
        }
    }
}

/// Storage configuration for artefact and files buckets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend
    #[serde(default)]
    pub mode: StorageMode,

    /// Local volume root (required in local mode)
    #[serde(default)]
    pub volume: Option<String>,

    /// Default bucket region when the client does not set one
    #[serde(default = "default_bucket_region")]
    pub bucket_region: String,

    /// Bucket name pattern (supports: {scope}, {client})
    #[serde(default = "default_artefact_bucket_pattern")]
    pub artefact_bucket_pattern: String,
}

fn default_bucket_region() -> String {
    "ap-southeast-1".to_string()
}

fn default_artefact_bucket_pattern() -> String {
    "{scope}{client}-core-automation-artefacts".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: StorageMode::default(),
            volume: None,
            bucket_region: default_bucket_region(),
            artefact_bucket_pattern: default_artefact_bucket_pattern(),
        }
    }
}

impl StorageConfig {
    /// Expand the bucket pattern for a client
    pub fn artefact_bucket_name(&self, scope_prefix: &str, client: &str) -> String {
        self.artefact_bucket_pattern
            .replace("{scope}", scope_prefix)
            .replace("{client}", client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_per_mode() {
        assert_eq!(StorageMode::S3.separator(), "/");
        assert_eq!(
            StorageMode::Local.separator(),
            std::path::MAIN_SEPARATOR.to_string()
        );
    }

    #[test]
    fn test_bucket_pattern_expansion() {
        let storage = StorageConfig::default();
        assert_eq!(
            storage.artefact_bucket_name("tst-", "acme"),
            "tst-acme-core-automation-artefacts"
        );
        assert_eq!(
            storage.artefact_bucket_name("", "acme"),
            "acme-core-automation-artefacts"
        );
    }
}
