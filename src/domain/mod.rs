// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod error;
pub mod instrument;
pub mod order;
pub mod order_book;
pub mod trade;

pub use config::EngineConfig;
pub use error::{EngineError, ValidationError};
pub use instrument::{Instrument, InstrumentState};
pub use order::{LimitType, Order, Side, TimeInForce};
pub use order_book::{BookSnapshot, DepthLevel, OrderBook};
pub use trade::Trade;
