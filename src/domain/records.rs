//! Canonical facts records
//!
//! Facts are stored and merged as PascalCase JSON documents. The typed
//! records below are views over those documents for the fields the
//! resolution engine reads; every other attribute is kept verbatim in
//! `extra`. [`FactsRecord::from_document`] is the only way a stored
//! document becomes a record, and it accepts PascalCase keys only.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A facts document: string keys to scalars, lists or nested documents
pub type FactsDocument = Map<String, Value>;

/// Resource tags
pub type Tags = BTreeMap<String, String>;

/// Key of the tag map in every facts document
pub const TAGS_KEY: &str = "Tags";

/// Conversion between stored documents and typed records
pub trait FactsRecord: Serialize + DeserializeOwned {
    /// Record kind used in error messages
    const KIND: &'static str;

    /// Deserialize a stored document.
    ///
    /// Rejects any top-level key that does not start with an upper-case
    /// letter.
    fn from_document(doc: &FactsDocument) -> Result<Self, String> {
        if let Some(key) = first_non_pascal_key(doc) {
            return Err(format!("key '{}' is not PascalCase", key));
        }
        serde_json::from_value(Value::Object(doc.clone())).map_err(|e| e.to_string())
    }

    /// Serialize back into a document
    fn to_document(&self) -> Result<FactsDocument, String> {
        match serde_json::to_value(self).map_err(|e| e.to_string())? {
            Value::Object(map) => Ok(map),
            other => Err(format!("{} serialized to a non-object: {}", Self::KIND, other)),
        }
    }
}

fn first_non_pascal_key(doc: &FactsDocument) -> Option<String> {
    doc.keys()
        .find(|k| !k.chars().next().map_or(false, |c| c.is_ascii_uppercase()))
        .cloned()
}

fn is_empty_tags(tags: &Tags) -> bool {
    tags.is_empty()
}

/// Tenant-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientFacts {
    /// Client slug (hash key). Example: "acme"
    pub client: String,

    /// Artefact bucket override. Example: "acme-core-automation-artefacts"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artefact_bucket_name: Option<String>,

    /// Region of the automation buckets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_region: Option<String>,

    /// Resource scope prefix. Example: "tst-"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_tags")]
    pub tags: Tags,

    #[serde(flatten)]
    pub extra: FactsDocument,
}

impl FactsRecord for ClientFacts {
    const KIND: &'static str = "client";
}

/// A person attached to a portfolio (contact or owner)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContactFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: FactsDocument,
}

impl ContactFacts {
    /// `Name <email>`, or whichever of the two is present, or empty
    pub fn display(&self) -> String {
        let name = self.name.as_deref().unwrap_or("");
        let email = self.email.as_deref().unwrap_or("");
        match (name.is_empty(), email.is_empty()) {
            (true, true) => String::new(),
            (true, false) => email.to_string(),
            (false, true) => name.to_string(),
            (false, false) => format!("{} <{}>", name, email),
        }
    }
}

/// Portfolio ownership and project metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PortfolioFacts {
    pub client: String,

    pub portfolio: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ContactFacts>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<ContactFacts>,

    #[serde(default, skip_serializing_if = "is_empty_tags")]
    pub tags: Tags,

    #[serde(flatten)]
    pub extra: FactsDocument,
}

impl FactsRecord for PortfolioFacts {
    const KIND: &'static str = "portfolio";
}

/// Account block of a zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_tags")]
    pub tags: Tags,

    #[serde(flatten)]
    pub extra: FactsDocument,
}

/// Per-region block of a zone, keyed by region alias
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegionFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_tags")]
    pub tags: Tags,

    #[serde(flatten)]
    pub extra: FactsDocument,
}

/// A deployment zone: one account and the regions enabled in it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneFacts {
    pub client: String,

    pub zone: String,

    #[serde(default)]
    pub account_facts: AccountFacts,

    #[serde(default)]
    pub region_facts: BTreeMap<String, RegionFacts>,

    #[serde(default, skip_serializing_if = "is_empty_tags")]
    pub tags: Tags,

    #[serde(flatten)]
    pub extra: FactsDocument,
}

impl FactsRecord for ZoneFacts {
    const KIND: &'static str = "zone";
}

impl ZoneFacts {
    /// Region block for an alias, if the region is enabled
    pub fn region(&self, alias: &str) -> Option<&RegionFacts> {
        self.region_facts.get(alias)
    }
}

/// App registration: which zone/region an app pattern deploys to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppFacts {
    /// `client:portfolio` (hash key)
    pub client_portfolio: String,

    /// Pattern matched against `prn:<portfolio>:<app>:<branch>:<build>` (range key)
    pub app_regex: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,

    /// Region alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub image_aliases: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "is_empty_tags")]
    pub tags: Tags,

    #[serde(flatten)]
    pub extra: FactsDocument,
}

impl FactsRecord for AppFacts {
    const KIND: &'static str = "app";
}

/// Tag map of a document, ignoring non-string values
pub fn document_tags(doc: &FactsDocument) -> Tags {
    doc.get(TAGS_KEY)
        .and_then(Value::as_object)
        .map(|tags| {
            tags.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
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
    fn test_app_facts_from_document_keeps_extra() {
        let d = doc(json!({
            "ClientPortfolio": "acme:core",
            "AppRegex": "prn:core:api.*",
            "Zone": "z1",
            "Region": "use1",
            "ImageAliases": {"base": "ami-1"},
            "Repository": "git@example.com:core/api.git"
        }));
        let app = AppFacts::from_document(&d).unwrap();
        assert_eq!(app.zone.as_deref(), Some("z1"));
        assert_eq!(app.region.as_deref(), Some("use1"));
        assert!(app.environment.is_none());
        assert_eq!(app.image_aliases["base"], "ami-1");
        assert_eq!(app.extra["Repository"], json!("git@example.com:core/api.git"));

        let back = app.to_document().unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_snake_case_keys_rejected() {
        let d = doc(json!({"client": "acme", "bucket_region": "us-east-1"}));
        let err = ClientFacts::from_document(&d).unwrap_err();
        assert!(err.contains("not PascalCase"));
    }

    #[test]
    fn test_missing_required_key_rejected() {
        let d = doc(json!({"AppRegex": "prn:core:.*"}));
        assert!(AppFacts::from_document(&d).is_err());
    }

    #[test]
    fn test_zone_without_account_facts() {
        let d = doc(json!({
            "Client": "acme",
            "Zone": "z1",
            "RegionFacts": {"use1": {"AzCount": 3}}
        }));
        let zone = ZoneFacts::from_document(&d).unwrap();
        assert!(zone.account_facts.aws_account_id.is_none());
        assert_eq!(zone.region("use1").unwrap().extra["AzCount"], json!(3));
        assert!(zone.region("sin").is_none());
    }

    #[test]
    fn test_contact_display() {
        let both = ContactFacts {
            name: Some("A".into()),
            email: Some("a@x.com".into()),
            ..Default::default()
        };
        assert_eq!(both.display(), "A <a@x.com>");

        let email_only = ContactFacts {
            email: Some("a@x.com".into()),
            ..Default::default()
        };
        assert_eq!(email_only.display(), "a@x.com");

        let name_only = ContactFacts {
            name: Some("A".into()),
            ..Default::default()
        };
        assert_eq!(name_only.display(), "A");

        assert_eq!(ContactFacts::default().display(), "");
    }

    #[test]
    fn test_document_tags_skips_non_strings() {
        let d = doc(json!({"Tags": {"Team": "core", "Count": 3}}));
        let tags = document_tags(&d);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags["Team"], "core");
    }
}
