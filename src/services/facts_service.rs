//! Facts service - PRN entry point to the resolution engine
//!
//! Parses a PRN for a client, requires it to address at least an app, and
//! resolves it.

use crate::config::FacterConfig;
use crate::domain::{IdentityParser, Scope};
use crate::error::{FactsError, IdentityError};
use crate::infrastructure::FactsRepository;

use super::resolution_engine::{FactsResolutionEngine, ResolvedFacts};

/// Service for resolving facts by PRN
pub struct FactsService<R> {
    parser: IdentityParser,
    engine: FactsResolutionEngine<R>,
}

impl<R: FactsRepository> FactsService<R> {
    pub fn new(repository: R, config: FacterConfig) -> Self {
        Self {
            parser: IdentityParser::new(),
            engine: FactsResolutionEngine::new(repository, config),
        }
    }

    /// Replace the PRN parser (e.g. one with custom scope validators)
    pub fn with_parser(mut self, parser: IdentityParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn engine(&self) -> &FactsResolutionEngine<R> {
        &self.engine
    }

    /// Resolve facts for `prn` within `client`
    ///
    /// The PRN must reach the app scope or deeper.
    pub fn get(&self, client: &str, prn: &str) -> Result<ResolvedFacts, FactsError> {
        let invalid = |source| FactsError::InvalidIdentity {
            identity: prn.to_string(),
            source,
        };

        let (identity, scope) = self.parser.parse(client, prn).map_err(invalid)?;
        if scope < Scope::App {
            let field = if scope < Scope::Portfolio { "portfolio" } else { "app" };
            return Err(invalid(IdentityError::MissingComponent { field }));
        }

        self.engine.resolve(&identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppFacts, ClientFacts, ContactFacts, PortfolioFacts, RegionFacts, ZoneFacts};
    use crate::infrastructure::Registry;
    use std::collections::BTreeMap;

    fn seeded_registry() -> Registry {
        let registry = Registry::default();
        registry
            .put_client(&ClientFacts {
                client: "acme".to_string(),
                ..Default::default()
            })
            .unwrap();
        registry
            .put_portfolio(&PortfolioFacts {
                client: "acme".to_string(),
                portfolio: "core".to_string(),
                owner: Some(ContactFacts {
                    name: Some("A".to_string()),
                    email: Some("a@x.com".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap();

        let mut regions = BTreeMap::new();
        regions.insert(
            "sin".to_string(),
            RegionFacts {
                aws_region: Some("ap-southeast-1".to_string()),
                ..Default::default()
            },
        );
        registry
            .put_zone(&ZoneFacts {
                client: "acme".to_string(),
                zone: "z1".to_string(),
                region_facts: regions,
                ..Default::default()
            })
            .unwrap();
        registry
            .put_app(&AppFacts {
                client_portfolio: "acme:core".to_string(),
                app_regex: "prn:core:api:.*".to_string(),
                zone: Some("z1".to_string()),
                ..Default::default()
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_get_by_prn() {
        let service = FactsService::new(seeded_registry(), FacterConfig::default());
        let resolved = service.get("acme", "prn:core:api:master:12").unwrap();

        assert_eq!(resolved.environment(), "prod");
        assert_eq!(resolved.region_alias(), "sin");
        assert_eq!(resolved.tags()["Owner"], "A <a@x.com>");
        assert_eq!(
            resolved.get("AwsRegion").and_then(|v| v.as_str()),
            Some("ap-southeast-1")
        );
    }

    #[test]
    fn test_prn_above_app_scope_rejected() {
        let service = FactsService::new(seeded_registry(), FacterConfig::default());

        assert!(matches!(
            service.get("acme", "prn:core").unwrap_err(),
            FactsError::InvalidIdentity {
                source: IdentityError::MissingComponent { field: "app" },
                ..
            }
        ));
        assert!(matches!(
            service.get("acme", "prn").unwrap_err(),
            FactsError::InvalidIdentity {
                source: IdentityError::MissingComponent { field: "portfolio" },
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_prn() {
        let service = FactsService::new(seeded_registry(), FacterConfig::default());
        assert!(matches!(
            service.get("acme", "arn:core:api").unwrap_err(),
            FactsError::InvalidIdentity {
                source: IdentityError::InvalidPrefix { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_app_scope_prn_without_branch() {
        let service = FactsService::new(seeded_registry(), FacterConfig::default());
        // No branch and no Region on the app: nothing to derive from
        assert!(matches!(
            service.get("acme", "prn:core:api").unwrap_err(),
            FactsError::RegionMissingOnApp { .. }
        ));
    }
}
