//! Tenant-scoped facts registry
//!
//! Backs [`FactsRepository`] with the cached tenant tables. Typed records
//! are written through their canonical documents so everything stored is
//! PascalCase.

use std::sync::Arc;
use tracing::debug;

use super::cache::TableCache;
use super::repository::FactsRepository;
use super::table::{FactsKind, FactsTable};
use crate::domain::{AppFacts, ClientFacts, FactsDocument, FactsRecord, PortfolioFacts, ZoneFacts};
use crate::error::RepositoryError;

/// Facts registry over a shared table cache
#[derive(Debug, Clone)]
pub struct Registry {
    cache: Arc<TableCache>,
}

impl Registry {
    pub fn new(cache: Arc<TableCache>) -> Self {
        Self { cache }
    }

    /// Registry with its own cache
    pub fn with_scope_prefix(scope_prefix: impl Into<String>) -> Self {
        Self::new(Arc::new(TableCache::new(scope_prefix)))
    }

    pub fn cache(&self) -> &Arc<TableCache> {
        &self.cache
    }

    /// Tenant table for a kind
    pub fn table(&self, kind: FactsKind, client: &str) -> Result<Arc<FactsTable>, RepositoryError> {
        self.cache.table(kind, client)
    }

    pub fn put_client(&self, facts: &ClientFacts) -> Result<(), RepositoryError> {
        self.put_record(FactsKind::Clients, &facts.client, facts)
    }

    pub fn put_portfolio(&self, facts: &PortfolioFacts) -> Result<(), RepositoryError> {
        self.put_record(FactsKind::Portfolios, &facts.client, facts)
    }

    pub fn put_zone(&self, facts: &ZoneFacts) -> Result<(), RepositoryError> {
        self.put_record(FactsKind::Zones, &facts.client, facts)
    }

    /// Apps are partitioned by `client:portfolio`; the tenant is the client part
    pub fn put_app(&self, facts: &AppFacts) -> Result<(), RepositoryError> {
        let client = facts
            .client_portfolio
            .split(':')
            .next()
            .unwrap_or_default();
        self.put_record(FactsKind::Apps, client, facts)
    }

    fn put_record<R: FactsRecord>(
        &self,
        kind: FactsKind,
        client: &str,
        record: &R,
    ) -> Result<(), RepositoryError> {
        let table = self.table(kind, client)?;
        let doc = record
            .to_document()
            .map_err(|message| RepositoryError::InvalidRecord {
                kind: R::KIND,
                path: table.name().to_string(),
                message,
            })?;
        debug!(table = %table.name(), kind = R::KIND, "Storing facts");
        table.put(doc)
    }

    /// Zones of a tenant deployed into an account
    pub fn zones_for_account(
        &self,
        client: &str,
        account_id: &str,
    ) -> Result<Vec<ZoneFacts>, RepositoryError> {
        let table = self.table(FactsKind::Zones, client)?;
        let mut zones = Vec::new();
        for doc in table.query(client)? {
            let zone = ZoneFacts::from_document(&doc).map_err(|message| {
                RepositoryError::InvalidRecord {
                    kind: ZoneFacts::KIND,
                    path: table.name().to_string(),
                    message,
                }
            })?;
            if zone.account_facts.aws_account_id.as_deref() == Some(account_id) {
                zones.push(zone);
            }
        }
        Ok(zones)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(TableCache::default()))
    }
}

impl FactsRepository for Registry {
    fn get_client_facts(&self, client: &str) -> Result<Option<FactsDocument>, RepositoryError> {
        self.table(FactsKind::Clients, client)?.get(client, None)
    }

    fn get_portfolio_facts(
        &self,
        client: &str,
        portfolio: &str,
    ) -> Result<Option<FactsDocument>, RepositoryError> {
        self.table(FactsKind::Portfolios, client)?
            .get(client, Some(portfolio))
    }

    fn get_app_facts_list(
        &self,
        client: &str,
        portfolio: &str,
    ) -> Result<Vec<FactsDocument>, RepositoryError> {
        let client_portfolio = format!("{}:{}", client, portfolio);
        self.table(FactsKind::Apps, client)?.query(&client_portfolio)
    }

    fn get_zone_facts(&self, client: &str, zone: &str) -> Result<Option<FactsDocument>, RepositoryError> {
        self.table(FactsKind::Zones, client)?.get(client, Some(zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountFacts;

    fn zone(name: &str, account: Option<&str>) -> ZoneFacts {
        ZoneFacts {
            client: "acme".to_string(),
            zone: name.to_string(),
            account_facts: AccountFacts {
                aws_account_id: account.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_through_tables() {
        let registry = Registry::with_scope_prefix("tst-");
        registry
            .put_client(&ClientFacts {
                client: "acme".to_string(),
                ..Default::default()
            })
            .unwrap();
        registry
            .put_app(&AppFacts {
                client_portfolio: "acme:core".to_string(),
                app_regex: "prn:core:api.*".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert!(registry.get_client_facts("acme").unwrap().is_some());
        assert!(registry.get_client_facts("globex").unwrap().is_none());
        assert_eq!(registry.get_app_facts_list("acme", "core").unwrap().len(), 1);
        assert!(registry.get_app_facts_list("acme", "other").unwrap().is_empty());
        assert_eq!(
            registry.table(FactsKind::Apps, "acme").unwrap().name(),
            "tst-acme-core-automation-apps"
        );
    }

    #[test]
    fn test_tenants_are_isolated() {
        let registry = Registry::default();
        registry.put_zone(&zone("z1", None)).unwrap();

        assert!(registry.get_zone_facts("acme", "z1").unwrap().is_some());
        assert!(registry.get_zone_facts("globex", "z1").unwrap().is_none());
    }

    #[test]
    fn test_zones_for_account() {
        let registry = Registry::default();
        registry.put_zone(&zone("z1", Some("111"))).unwrap();
        registry.put_zone(&zone("z2", Some("222"))).unwrap();
        registry.put_zone(&zone("z3", Some("111"))).unwrap();
        registry.put_zone(&zone("z4", None)).unwrap();

        let zones = registry.zones_for_account("acme", "111").unwrap();
        let names: Vec<_> = zones.iter().map(|z| z.zone.as_str()).collect();
        assert_eq!(names, vec!["z1", "z3"]);
        assert!(registry.zones_for_account("acme", "999").unwrap().is_empty());
    }

    #[test]
    fn test_shared_cache_sees_writes() {
        let cache = Arc::new(TableCache::default());
        let writer = Registry::new(Arc::clone(&cache));
        let reader = Registry::new(cache);

        writer.put_zone(&zone("z1", None)).unwrap();
        assert!(reader.get_zone_facts("acme", "z1").unwrap().is_some());
    }
}
