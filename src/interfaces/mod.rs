// ============================================================================
// Interfaces Module
// Contracts between the engine core and its collaborators
// ============================================================================

pub mod observer;

pub use observer::{
    EngineEvent, EngineObserver, EngineStatus, LineSink, LoggingObserver, NoOpObserver,
};
