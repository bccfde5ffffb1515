//! Facts repository boundary
//!
//! The resolution engine reads facts only through this trait. Lookups are
//! synchronous; a returned error aborts the resolution it belongs to.

use std::sync::Arc;

use crate::domain::FactsDocument;
use crate::error::RepositoryError;

/// Read access to the four facts kinds of a tenant
pub trait FactsRepository: Send + Sync {
    /// Client facts by client name
    fn get_client_facts(&self, client: &str) -> Result<Option<FactsDocument>, RepositoryError>;

    /// Portfolio facts by (client, portfolio)
    fn get_portfolio_facts(
        &self,
        client: &str,
        portfolio: &str,
    ) -> Result<Option<FactsDocument>, RepositoryError>;

    /// Every app registration of a portfolio, in stored order
    fn get_app_facts_list(
        &self,
        client: &str,
        portfolio: &str,
    ) -> Result<Vec<FactsDocument>, RepositoryError>;

    /// Zone facts by (client, zone)
    fn get_zone_facts(&self, client: &str, zone: &str) -> Result<Option<FactsDocument>, RepositoryError>;
}

impl<T: FactsRepository + ?Sized> FactsRepository for &T {
    fn get_client_facts(&self, client: &str) -> Result<Option<FactsDocument>, RepositoryError> {
        (**self).get_client_facts(client)
    }

    fn get_portfolio_facts(
        &self,
        client: &str,
        portfolio: &str,
    ) -> Result<Option<FactsDocument>, RepositoryError> {
        (**self).get_portfolio_facts(client, portfolio)
    }

    fn get_app_facts_list(
        &self,
        client: &str,
        portfolio: &str,
    ) -> Result<Vec<FactsDocument>, RepositoryError> {
        (**self).get_app_facts_list(client, portfolio)
    }

    fn get_zone_facts(&self, client: &str, zone: &str) -> Result<Option<FactsDocument>, RepositoryError> {
        (**self).get_zone_facts(client, zone)
    }
}

impl<T: FactsRepository + ?Sized> FactsRepository for Arc<T> {
    fn get_client_facts(&self, client: &str) -> Result<Option<FactsDocument>, RepositoryError> {
        (**self).get_client_facts(client)
    }

    fn get_portfolio_facts(
        &self,
        client: &str,
        portfolio: &str,
    ) -> Result<Option<FactsDocument>, RepositoryError> {
        (**self).get_portfolio_facts(client, portfolio)
    }

    fn get_app_facts_list(
        &self,
        client: &str,
        portfolio: &str,
    ) -> Result<Vec<FactsDocument>, RepositoryError> {
        (**self).get_app_facts_list(client, portfolio)
    }

    fn get_zone_facts(&self, client: &str, zone: &str) -> Result<Option<FactsDocument>, RepositoryError> {
        (**self).get_zone_facts(client, zone)
    }
}
