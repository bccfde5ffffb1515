//! Facts resolution engine - merges every facts source for one deployment
//!
//! Resolution is a single linear pass over repository reads:
//!
//! ```text
//! Validate → LoadClient → LoadPortfolio → LoadApp → DeriveEnvironment
//!          → LoadZoneRegion → MergeCore → MergeTags → MergePaths → Done
//! ```
//!
//! Merge order (later wins): account ← region ← portfolio ← app ←
//! deployment facts, all with list concatenation. `Tags` is then replaced
//! by the layered tag map and the storage facts are merged last. Any stage
//! failure ends the resolution with no partial result.

use serde::{Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::FacterConfig;
use crate::domain::records::{document_tags, TAGS_KEY};
use crate::domain::{
    candidate_string, computed_tags, deep_merge, deep_merge_into, AppFacts, AppMatcher,
    ClientFacts, EnvironmentDeriver, FactsDocument, FactsRecord, Identity, PatternWarning,
    PortfolioFacts, TagLayers, Tags, ZoneFacts,
};
use crate::error::{FactsError, IdentityError, RepositoryError};
use crate::infrastructure::FactsRepository;
use crate::path_builder::storage_facts;

const ACCOUNT_FACTS_KEY: &str = "AccountFacts";
const REGION_FACTS_KEY: &str = "RegionFacts";

/// Stages of a resolution, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Validate,
    LoadClient,
    LoadPortfolio,
    LoadApp,
    DeriveEnvironment,
    LoadZoneRegion,
    MergeCore,
    MergeTags,
    MergePaths,
    Done,
}

impl ResolutionStage {
    /// Get human-readable name for the stage
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validate => "Validate",
            Self::LoadClient => "Load Client",
            Self::LoadPortfolio => "Load Portfolio",
            Self::LoadApp => "Load App",
            Self::DeriveEnvironment => "Derive Environment",
            Self::LoadZoneRegion => "Load Zone/Region",
            Self::MergeCore => "Merge Core",
            Self::MergeTags => "Merge Tags",
            Self::MergePaths => "Merge Paths",
            Self::Done => "Done",
        }
    }
}

/// The merged facts for one deployment
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFacts {
    prn: String,
    environment: String,
    region_alias: String,
    zone: String,
    document: FactsDocument,
    warnings: Vec<PatternWarning>,
}

impl ResolvedFacts {
    /// PRN of the resolved identity
    pub fn prn(&self) -> &str {
        &self.prn
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn region_alias(&self) -> &str {
        &self.region_alias
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn document(&self) -> &FactsDocument {
        &self.document
    }

    pub fn into_document(self) -> FactsDocument {
        self.document
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    /// Final layered tags
    pub fn tags(&self) -> Tags {
        document_tags(&self.document)
    }

    /// App patterns skipped while matching
    pub fn warnings(&self) -> &[PatternWarning] {
        &self.warnings
    }

    /// SHA-256 (hex) of the canonical JSON form of the document
    pub fn digest(&self) -> String {
        // Keys are ordered, so equal documents serialize identically
        let canonical = serde_json::to_vec(&self.document).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        format!("{:x}", hasher.finalize())
    }
}

impl Serialize for ResolvedFacts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

/// Environment and region chosen for a deployment
struct Placement {
    environment: String,
    region_alias: String,
}

/// Resolves deployment identities against a facts repository
pub struct FactsResolutionEngine<R> {
    repository: R,
    config: FacterConfig,
    deriver: EnvironmentDeriver,
    matcher: AppMatcher,
}

impl<R: FactsRepository> FactsResolutionEngine<R> {
    pub fn new(repository: R, config: FacterConfig) -> Self {
        let deriver = config.environment_deriver();
        Self {
            repository,
            config,
            deriver,
            matcher: AppMatcher::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &FacterConfig {
        &self.config
    }

    /// Resolve the facts for a deployment identity
    pub fn resolve(&self, identity: &Identity) -> Result<ResolvedFacts, FactsError> {
        let mut stage = ResolutionStage::Validate;
        match self.run(identity, &mut stage) {
            Ok(resolved) => {
                info!(
                    identity = %resolved.prn,
                    environment = %resolved.environment,
                    region = %resolved.region_alias,
                    zone = %resolved.zone,
                    "Facts resolved"
                );
                Ok(resolved)
            }
            Err(e) => {
                warn!(identity = %identity, stage = stage.name(), error = %e, "Facts resolution failed");
                Err(e)
            }
        }
    }

    fn run(&self, identity: &Identity, stage: &mut ResolutionStage) -> Result<ResolvedFacts, FactsError> {
        let prn = identity.prn();
        let client = identity.client();

        advance(stage, ResolutionStage::Validate, &prn);
        let (portfolio, _app) = require_app_scope(identity, &prn)?;

        advance(stage, ResolutionStage::LoadClient, &prn);
        let client_doc = self
            .repository
            .get_client_facts(client)
            .map_err(|e| repository_error(&prn, e))?
            .ok_or_else(|| FactsError::ClientFactsNotFound {
                identity: prn.clone(),
                client: client.to_string(),
            })?;
        let client_facts: ClientFacts = decode(&client_doc, &prn, client)?;

        advance(stage, ResolutionStage::LoadPortfolio, &prn);
        let portfolio_doc = self
            .repository
            .get_portfolio_facts(client, portfolio)
            .map_err(|e| repository_error(&prn, e))?
            .ok_or_else(|| FactsError::PortfolioFactsNotFound {
                identity: prn.clone(),
                client: client.to_string(),
                portfolio: portfolio.to_string(),
            })?;
        let portfolio_facts: PortfolioFacts =
            decode(&portfolio_doc, &prn, &format!("{}:{}", client, portfolio))?;

        advance(stage, ResolutionStage::LoadApp, &prn);
        let (app_doc, app_facts, warnings) = self.load_app(identity, &prn, portfolio)?;
        let zone_name = app_facts
            .zone
            .clone()
            .filter(|z| !z.is_empty())
            .ok_or_else(|| FactsError::ZoneMissingOnApp {
                identity: prn.clone(),
                app_regex: app_facts.app_regex.clone(),
            })?;

        advance(stage, ResolutionStage::DeriveEnvironment, &prn);
        let placement = self.place(identity, &prn, &app_facts)?;

        advance(stage, ResolutionStage::LoadZoneRegion, &prn);
        let zone_doc = self
            .repository
            .get_zone_facts(client, &zone_name)
            .map_err(|e| repository_error(&prn, e))?
            .ok_or_else(|| FactsError::ZoneFactsNotFound {
                identity: prn.clone(),
                client: client.to_string(),
                zone: zone_name.clone(),
            })?;
        let zone_facts: ZoneFacts = decode(&zone_doc, &prn, &format!("{}:{}", client, zone_name))?;
        let region_facts = zone_facts.region(&placement.region_alias).ok_or_else(|| {
            FactsError::RegionNotEnabledForZone {
                identity: prn.clone(),
                zone: zone_name.clone(),
                region: placement.region_alias.clone(),
            }
        })?;

        advance(stage, ResolutionStage::MergeCore, &prn);
        let account_doc = sub_document(&zone_doc, &[ACCOUNT_FACTS_KEY]);
        let region_doc = sub_document(&zone_doc, &[REGION_FACTS_KEY, placement.region_alias.as_str()]);
        let mut document = deep_merge(&account_doc, &region_doc, true);
        deep_merge_into(&mut document, &portfolio_doc, true);
        deep_merge_into(&mut document, &app_doc, true);
        deep_merge_into(&mut document, &deployment_facts(identity, &placement), true);

        advance(stage, ResolutionStage::MergeTags, &prn);
        let computed = computed_tags(
            &placement.environment,
            &placement.region_alias,
            portfolio_facts.owner.as_ref(),
            &portfolio_facts.contacts,
        );
        let tags = TagLayers {
            client: Some(&client_facts.tags),
            zone: Some(&zone_facts.tags),
            region: Some(&region_facts.tags),
            portfolio: Some(&portfolio_facts.tags),
            app: Some(&app_facts.tags),
            computed: Some(&computed),
        }
        .resolve();
        document.insert(TAGS_KEY.to_string(), string_map(&tags));

        advance(stage, ResolutionStage::MergePaths, &prn);
        let storage = storage_facts(&self.config, &client_facts, identity);
        deep_merge_into(&mut document, &string_map_document(&storage), true);

        advance(stage, ResolutionStage::Done, &prn);
        Ok(ResolvedFacts {
            prn,
            environment: placement.environment,
            region_alias: placement.region_alias,
            zone: zone_name,
            document,
            warnings,
        })
    }

    /// Fetch the app registrations of the portfolio and take the first match
    ///
    /// Registrations are decoded one at a time while matching. A record that
    /// fails to decode is skipped with a warning like an invalid pattern.
    fn load_app(
        &self,
        identity: &Identity,
        prn: &str,
        portfolio: &str,
    ) -> Result<(FactsDocument, AppFacts, Vec<PatternWarning>), FactsError> {
        let client = identity.client();
        let docs = self
            .repository
            .get_app_facts_list(client, portfolio)
            .map_err(|e| repository_error(prn, e))?;

        let candidate = candidate_string(identity);
        let mut warnings = Vec::new();
        let mut matched = None;

        for doc in docs {
            let app = match AppFacts::from_document(&doc) {
                Ok(app) => app,
                Err(message) => {
                    let app_regex = doc
                        .get("AppRegex")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{}:{}", client, portfolio));
                    warn!(identity = %prn, app_regex = %app_regex, error = %message, "Skipping malformed app facts");
                    warnings.push(PatternWarning {
                        app_regex,
                        message: format!("malformed app facts: {}", message),
                    });
                    continue;
                }
            };

            match self.matcher.matches(&app, &candidate) {
                Ok(true) => {
                    matched = Some((doc, app));
                    break;
                }
                Ok(false) => {}
                Err(warning) => warnings.push(warning),
            }
        }

        debug!(
            identity = %prn,
            candidate = %candidate,
            matched = matched.is_some(),
            skipped = warnings.len(),
            "Matched app registrations"
        );

        match matched {
            Some((doc, app)) => Ok((doc, app, warnings)),
            None => Err(FactsError::NoMatchingApp {
                identity: prn.to_string(),
                candidate,
                skipped_patterns: warnings.into_iter().map(|w| w.app_regex).collect(),
            }),
        }
    }

    /// App facts win field by field; the branch fills the gaps
    fn place(&self, identity: &Identity, prn: &str, app: &AppFacts) -> Result<Placement, FactsError> {
        let environment = app.environment.clone().filter(|e| !e.is_empty());
        let region_alias = app.region.clone().filter(|r| !r.is_empty());

        if let (Some(environment), Some(region_alias)) = (&environment, &region_alias) {
            return Ok(Placement {
                environment: environment.clone(),
                region_alias: region_alias.clone(),
            });
        }

        let branch = identity.branch().ok_or_else(|| FactsError::RegionMissingOnApp {
            identity: prn.to_string(),
            app_regex: app.app_regex.clone(),
            field: if region_alias.is_none() { "Region" } else { "Environment" },
        })?;

        let derived = self.deriver.derive(branch);
        debug!(
            identity = %prn,
            branch = %branch,
            environment = %derived.environment,
            region = %derived.region_alias,
            "Derived placement from branch"
        );

        Ok(Placement {
            environment: environment.unwrap_or(derived.environment),
            region_alias: region_alias.unwrap_or(derived.region_alias),
        })
    }
}

fn advance(stage: &mut ResolutionStage, next: ResolutionStage, prn: &str) {
    *stage = next;
    debug!(identity = %prn, stage = next.name(), "Resolution stage");
}

fn require_app_scope<'a>(identity: &'a Identity, prn: &str) -> Result<(&'a str, &'a str), FactsError> {
    let invalid = |field| FactsError::InvalidIdentity {
        identity: prn.to_string(),
        source: IdentityError::MissingComponent { field },
    };
    let portfolio = identity.portfolio().ok_or_else(|| invalid("portfolio"))?;
    let app = identity.app().ok_or_else(|| invalid("app"))?;
    Ok((portfolio, app))
}

fn repository_error(prn: &str, source: RepositoryError) -> FactsError {
    FactsError::Repository {
        identity: prn.to_string(),
        source,
    }
}

fn decode<T: FactsRecord>(doc: &FactsDocument, prn: &str, key: &str) -> Result<T, FactsError> {
    T::from_document(doc).map_err(|message| FactsError::MalformedFacts {
        identity: prn.to_string(),
        kind: T::KIND,
        key: key.to_string(),
        message,
    })
}

/// Nested document at `path`, or an empty one
fn sub_document(doc: &FactsDocument, path: &[&str]) -> FactsDocument {
    let mut current = doc;
    for key in path {
        match current.get(*key) {
            Some(Value::Object(next)) => current = next,
            _ => return FactsDocument::new(),
        }
    }
    current.clone()
}

/// Identity and placement fields, only those that are present
fn deployment_facts(identity: &Identity, placement: &Placement) -> FactsDocument {
    let branch_short = identity.branch_short_name();
    let fields = [
        ("Client", Some(identity.client())),
        ("Portfolio", identity.portfolio()),
        ("App", identity.app()),
        ("Branch", identity.branch()),
        ("BranchShortName", branch_short.as_deref()),
        ("Build", identity.build()),
        ("Component", identity.component()),
        ("Environment", Some(placement.environment.as_str())),
        ("Region", Some(placement.region_alias.as_str())),
    ];

    fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), Value::String(v.to_string()))))
        .collect()
}

fn string_map(map: &Tags) -> Value {
    Value::Object(string_map_document(map))
}

fn string_map_document(map: &Tags) -> FactsDocument {
    map.iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}
