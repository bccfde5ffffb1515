//! Infrastructure layer - facts storage adapters
//!
//! This module contains the storage side of the registry:
//! - Tenant table naming and in-memory tables
//! - The shared table cache
//! - The repository trait the engine reads through
//! - YAML seed directory loading

pub mod cache;
pub mod registry;
pub mod repository;
pub mod table;
pub mod yaml_store;

// Re-export commonly used types
pub use cache::TableCache;
pub use registry::Registry;
pub use repository::FactsRepository;
pub use table::{table_name, FactsKind, FactsTable};
pub use yaml_store::{load_registry_dir, LoadSummary};
