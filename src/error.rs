//! Centralized error types for facter
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Terminal failures of a facts resolution.
///
/// Every variant names the identity being resolved and the key that was
/// missing so callers can print an actionable message. None of these are
/// retried by the engine.
#[derive(Error, Debug)]
pub enum FactsError {
    #[error("Invalid identity {identity}: {source}")]
    InvalidIdentity {
        identity: String,
        #[source]
        source: IdentityError,
    },

    #[error("Client facts not found for {client} (resolving {identity})")]
    ClientFactsNotFound { identity: String, client: String },

    #[error("Portfolio facts not found for {client}:{portfolio} (resolving {identity})")]
    PortfolioFactsNotFound {
        identity: String,
        client: String,
        portfolio: String,
    },

    #[error("App facts not found for {identity}. Contact DevOps to register this app.")]
    NoMatchingApp {
        identity: String,
        candidate: String,
        skipped_patterns: Vec<String>,
    },

    #[error("Zone not found for {identity} (app pattern {app_regex})")]
    ZoneMissingOnApp { identity: String, app_regex: String },

    #[error("{field} not found for {identity} (app pattern {app_regex}) and it cannot be derived from the branch")]
    RegionMissingOnApp {
        identity: String,
        app_regex: String,
        field: &'static str,
    },

    #[error("Zone facts not found for {client}:{zone} (resolving {identity})")]
    ZoneFactsNotFound {
        identity: String,
        client: String,
        zone: String,
    },

    #[error("Region {region} has not been enabled for {zone} (resolving {identity})")]
    RegionNotEnabledForZone {
        identity: String,
        zone: String,
        region: String,
    },

    #[error("Malformed {kind} facts for {key} (resolving {identity}): {message}")]
    MalformedFacts {
        identity: String,
        kind: &'static str,
        key: String,
        message: String,
    },

    #[error("Repository error while resolving {identity}: {source}")]
    Repository {
        identity: String,
        #[source]
        source: RepositoryError,
    },
}

/// Reasons an identity (PRN or field tuple) is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity must be provided")]
    Empty,

    #[error("client must be provided")]
    MissingClient,

    #[error("identity must start with 'prn', found '{prefix}'")]
    InvalidPrefix { prefix: String },

    #[error("unsupported scope with {parts} parts")]
    UnsupportedScope { parts: usize },

    #[error("a {scope} identity has {expected} parts, found {found}")]
    WrongPartCount {
        scope: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("not a valid {scope} PRN")]
    FailedValidation { scope: &'static str },

    #[error("{field} is set but {missing} is empty")]
    Sparse {
        field: &'static str,
        missing: &'static str,
    },

    #[error("invalid {field} value '{value}'")]
    InvalidComponent { field: &'static str, value: String },

    #[error("{field} is required at this scope")]
    MissingComponent { field: &'static str },
}

/// Facts storage errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{table} lock poisoned")]
    Poisoned { table: String },

    #[error("Record in {table} is missing key attribute {attribute}")]
    MissingKey { table: String, attribute: &'static str },

    #[error("Invalid {kind} record in {path}: {message}")]
    InvalidRecord {
        kind: &'static str,
        path: String,
        message: String,
    },

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required configuration missing: {field}")]
    MissingField { field: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_app_display() {
        let err = FactsError::NoMatchingApp {
            identity: "prn:core:api:main:42".to_string(),
            candidate: "prn:core:api:main:42".to_string(),
            skipped_patterns: vec![],
        };
        let msg = err.to_string();
        assert!(msg.contains("prn:core:api:main:42"));
        assert!(msg.contains("Contact DevOps"));
    }

    #[test]
    fn test_invalid_identity_keeps_source() {
        let err = FactsError::InvalidIdentity {
            identity: "prn:core".to_string(),
            source: IdentityError::MissingComponent { field: "app" },
        };
        assert!(err.to_string().contains("app is required"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_lookup_failures_name_identity() {
        let prn = "prn:core:app1:main:42";
        let errors = [
            FactsError::ClientFactsNotFound {
                identity: prn.to_string(),
                client: "acme".to_string(),
            },
            FactsError::PortfolioFactsNotFound {
                identity: prn.to_string(),
                client: "acme".to_string(),
                portfolio: "core".to_string(),
            },
            FactsError::MalformedFacts {
                identity: prn.to_string(),
                kind: "client",
                key: "acme".to_string(),
                message: "invalid type".to_string(),
            },
        ];
        for err in errors {
            assert!(err.to_string().contains(prn), "{}", err);
        }
    }

    #[test]
    fn test_region_missing_names_field() {
        let err = FactsError::RegionMissingOnApp {
            identity: "prn:core:api".to_string(),
            app_regex: "prn:core:api.*".to_string(),
            field: "Environment",
        };
        assert!(err.to_string().starts_with("Environment not found"));
    }
}
