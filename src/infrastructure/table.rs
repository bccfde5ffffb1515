//! Tenant-scoped facts tables
//!
//! Each facts kind lives in its own table per tenant. A table is a
//! hash key → range key → document store; tables without a range key keep
//! their single item under an empty range key.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::FactsDocument;
use crate::error::RepositoryError;

type Items = BTreeMap<String, BTreeMap<String, FactsDocument>>;

/// The facts kinds, one table each
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FactsKind {
    Clients,
    Portfolios,
    Zones,
    Apps,
}

impl FactsKind {
    pub const ALL: [FactsKind; 4] = [
        FactsKind::Clients,
        FactsKind::Portfolios,
        FactsKind::Zones,
        FactsKind::Apps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Portfolios => "portfolios",
            Self::Zones => "zones",
            Self::Apps => "apps",
        }
    }

    /// Partition key attribute
    pub fn hash_key(&self) -> &'static str {
        match self {
            Self::Clients => "Client",
            Self::Portfolios => "Client",
            Self::Zones => "Client",
            Self::Apps => "ClientPortfolio",
        }
    }

    /// Sort key attribute, if the table has one
    pub fn range_key(&self) -> Option<&'static str> {
        match self {
            Self::Clients => None,
            Self::Portfolios => Some("Portfolio"),
            Self::Zones => Some("Zone"),
            Self::Apps => Some("AppRegex"),
        }
    }

    /// Client tables are global; every other kind is per tenant
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Clients)
    }
}

impl fmt::Display for FactsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical table name for a kind and tenant
///
/// - clients: `{scope}core-automation-clients`
/// - others: `{scope}{client}-core-automation-{kind}`
pub fn table_name(kind: FactsKind, client: &str, scope_prefix: &str) -> String {
    if kind.is_global() {
        format!("{}core-automation-{}", scope_prefix, kind.name())
    } else {
        format!("{}{}-core-automation-{}", scope_prefix, client, kind.name())
    }
}

/// In-memory keyed document table
#[derive(Debug)]
pub struct FactsTable {
    name: String,
    kind: FactsKind,
    items: RwLock<Items>,
}

impl FactsTable {
    pub fn new(kind: FactsKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            items: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FactsKind {
        self.kind
    }

    /// Exact key lookup
    pub fn get(&self, hash: &str, range: Option<&str>) -> Result<Option<FactsDocument>, RepositoryError> {
        let items = self.read()?;
        Ok(items
            .get(hash)
            .and_then(|partition| partition.get(range.unwrap_or("")))
            .cloned())
    }

    /// All items of a partition, in range key order
    pub fn query(&self, hash: &str) -> Result<Vec<FactsDocument>, RepositoryError> {
        let items = self.read()?;
        Ok(items
            .get(hash)
            .map(|partition| partition.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Insert or replace an item, keyed by its own key attributes
    pub fn put(&self, doc: FactsDocument) -> Result<(), RepositoryError> {
        let hash = self.key_value(&doc, self.kind.hash_key())?;
        let range = match self.kind.range_key() {
            Some(attribute) => self.key_value(&doc, attribute)?,
            None => String::new(),
        };
        let mut items = self.write()?;
        items.entry(hash).or_default().insert(range, doc);
        Ok(())
    }

    /// Remove an item, returning it if it existed
    pub fn delete(&self, hash: &str, range: Option<&str>) -> Result<Option<FactsDocument>, RepositoryError> {
        let mut items = self.write()?;
        let removed = items
            .get_mut(hash)
            .and_then(|partition| partition.remove(range.unwrap_or("")));
        if items.get(hash).map_or(false, BTreeMap::is_empty) {
            items.remove(hash);
        }
        Ok(removed)
    }

    /// Every item, in key order
    pub fn scan(&self) -> Result<Vec<FactsDocument>, RepositoryError> {
        let items = self.read()?;
        Ok(items
            .values()
            .flat_map(|partition| partition.values().cloned())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.read()
            .map(|items| items.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key_value(&self, doc: &FactsDocument, attribute: &'static str) -> Result<String, RepositoryError> {
        match doc.get(attribute) {
            Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
            _ => Err(RepositoryError::MissingKey {
                table: self.name.clone(),
                attribute,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Items>, RepositoryError> {
        self.items.read().map_err(|_| RepositoryError::Poisoned {
            table: self.name.clone(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Items>, RepositoryError> {
        self.items.write().map_err(|_| RepositoryError::Poisoned {
            table: self.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> FactsDocument {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_table_names() {
        assert_eq!(
            table_name(FactsKind::Clients, "acme", ""),
            "core-automation-clients"
        );
        assert_eq!(
            table_name(FactsKind::Clients, "acme", "tst-"),
            "tst-core-automation-clients"
        );
        assert_eq!(
            table_name(FactsKind::Apps, "acme", "tst-"),
            "tst-acme-core-automation-apps"
        );
        assert_eq!(
            table_name(FactsKind::Zones, "acme", ""),
            "acme-core-automation-zones"
        );
    }

    #[test]
    fn test_put_get_delete() {
        let table = FactsTable::new(FactsKind::Zones, "acme-core-automation-zones");
        table
            .put(doc(json!({"Client": "acme", "Zone": "z1", "AzCount": 2})))
            .unwrap();

        let found = table.get("acme", Some("z1")).unwrap().unwrap();
        assert_eq!(found["AzCount"], json!(2));
        assert!(table.get("acme", Some("z2")).unwrap().is_none());

        // Same key replaces
        table
            .put(doc(json!({"Client": "acme", "Zone": "z1", "AzCount": 3})))
            .unwrap();
        assert_eq!(table.len(), 1);

        let removed = table.delete("acme", Some("z1")).unwrap();
        assert_eq!(removed.unwrap()["AzCount"], json!(3));
        assert!(table.is_empty());
    }

    #[test]
    fn test_query_in_range_key_order() {
        let table = FactsTable::new(FactsKind::Apps, "acme-core-automation-apps");
        for regex in ["prn:core:web.*", "prn:core:api.*"] {
            table
                .put(doc(json!({"ClientPortfolio": "acme:core", "AppRegex": regex})))
                .unwrap();
        }
        table
            .put(doc(json!({"ClientPortfolio": "acme:other", "AppRegex": ".*"})))
            .unwrap();

        let apps = table.query("acme:core").unwrap();
        let regexes: Vec<_> = apps.iter().map(|a| a["AppRegex"].clone()).collect();
        assert_eq!(regexes, vec![json!("prn:core:api.*"), json!("prn:core:web.*")]);
        assert_eq!(table.scan().unwrap().len(), 3);
        assert!(table.query("acme:missing").unwrap().is_empty());
    }

    #[test]
    fn test_put_requires_key_attributes() {
        let table = FactsTable::new(FactsKind::Portfolios, "acme-core-automation-portfolios");
        let err = table.put(doc(json!({"Client": "acme"}))).unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::MissingKey { attribute: "Portfolio", .. }
        ));
    }

    #[test]
    fn test_single_key_table() {
        let table = FactsTable::new(FactsKind::Clients, "core-automation-clients");
        table.put(doc(json!({"Client": "acme"}))).unwrap();
        assert!(table.get("acme", None).unwrap().is_some());
    }
}
