//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and the facts repository.

pub mod facts_service;
pub mod resolution_engine;

// Re-export commonly used types
pub use facts_service::FactsService;
pub use resolution_engine::{FactsResolutionEngine, ResolutionStage, ResolvedFacts};
