//! Deployment facts registry and resolution engine
//!
//! Layers:
//! - [`domain`]: identities, records, merge/match/derive logic (no I/O)
//! - [`infrastructure`]: tenant tables, table cache, seed loading
//! - [`services`]: the resolution engine and the PRN facade
//! - [`path_builder`]: artefact storage facts
//! - [`config`]: YAML configuration

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod path_builder;
pub mod services;

pub use config::FacterConfig;
pub use domain::{Identity, IdentityParser, Scope};
pub use error::{ConfigError, FactsError, IdentityError, RepositoryError};
pub use infrastructure::{FactsRepository, Registry, TableCache};
pub use services::{FactsResolutionEngine, FactsService, ResolvedFacts};
