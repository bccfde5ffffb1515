//! Process-wide cache of tenant tables
//!
//! Tables are created lazily the first time a (kind, tenant) pair is used
//! and live until [`TableCache::clear`]. Lookups take the read lock only;
//! creation rechecks under the write lock so concurrent first use never
//! builds two tables for the same pair.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::table::{table_name, FactsKind, FactsTable};
use crate::error::RepositoryError;

type CacheKey = (FactsKind, String);

/// Thread-safe (kind, tenant) → table map
#[derive(Debug)]
pub struct TableCache {
    scope_prefix: String,
    tables: RwLock<HashMap<CacheKey, Arc<FactsTable>>>,
}

impl TableCache {
    pub fn new(scope_prefix: impl Into<String>) -> Self {
        Self {
            scope_prefix: scope_prefix.into(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn scope_prefix(&self) -> &str {
        &self.scope_prefix
    }

    /// Table for a kind and tenant, creating it on first use
    pub fn table(&self, kind: FactsKind, client: &str) -> Result<Arc<FactsTable>, RepositoryError> {
        // Client tables are shared by every tenant
        let tenant = if kind.is_global() { "" } else { client };
        let key = (kind, tenant.to_string());

        {
            let tables = self.tables.read().map_err(|_| self.poisoned())?;
            if let Some(table) = tables.get(&key) {
                return Ok(Arc::clone(table));
            }
        }

        let mut tables = self.tables.write().map_err(|_| self.poisoned())?;
        if let Some(table) = tables.get(&key) {
            return Ok(Arc::clone(table));
        }

        let name = table_name(kind, client, &self.scope_prefix);
        debug!(table = %name, kind = %kind, "Creating facts table");
        let table = Arc::new(FactsTable::new(kind, name));
        tables.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Number of tables created so far
    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached table
    pub fn clear(&self) {
        match self.tables.write() {
            Ok(mut tables) => tables.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    fn poisoned(&self) -> RepositoryError {
        RepositoryError::Poisoned {
            table: "table cache".to_string(),
        }
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new("")
    }
}
