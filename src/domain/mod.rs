//! Domain layer - pure facts logic
//!
//! Identities, records, merging and matching. No I/O happens here, so
//! everything can be unit tested without repositories.

pub mod app_matcher;
pub mod environment;
pub mod identity;
pub mod merge;
pub mod records;
pub mod tags;

// Re-export commonly used types
pub use app_matcher::{candidate_string, AppMatcher, MatchOutcome, PatternWarning};
pub use environment::{DerivedEnvironment, EnvironmentDeriver};
pub use identity::{Identity, IdentityParser, PatternValidator, Scope, ScopeValidator};
pub use merge::{deep_merge, deep_merge_into};
pub use records::{
    AccountFacts, AppFacts, ClientFacts, ContactFacts, FactsDocument, FactsRecord, PortfolioFacts,
    RegionFacts, Tags, ZoneFacts,
};
pub use tags::{computed_tags, resolve_tags, TagLayers};
