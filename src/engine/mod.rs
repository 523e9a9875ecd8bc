// ============================================================================
// Engine Module
// Contains the matching engine and its statistics
// ============================================================================

mod matching_engine;
mod stats;

pub use matching_engine::MatchingEngine;
pub use stats::{EngineStats, StatsReport};
