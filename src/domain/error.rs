// ============================================================================
// Engine Errors
// Typed error kinds behind the engine's boolean surfaces
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the order validators.
///
/// `submit` reports these as a boolean `false`; the `Display` text is what
/// reaches the observability sink and the log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Order price is zero or negative
    #[error("price must be strictly positive, got {0}")]
    NonPositivePrice(Decimal),

    /// Order price does not sit on the instrument's tick grid
    #[error("price {price} is not a multiple of the instrument tick (price_decimal {price_decimal})")]
    PriceOffTick { price: Decimal, price_decimal: u32 },

    /// Order quantity is zero
    #[error("quantity must be strictly positive, got {0}")]
    NonPositiveQuantity(u64),

    /// Order quantity is not a whole number of lots
    #[error("quantity {quantity} is not a multiple of lot size {lot_size}")]
    QuantityNotLotMultiple { quantity: u64, lot_size: u64 },

    /// GTD order whose expiration is not in the future at submission
    #[error("GTD expiration {0} is not in the future")]
    ExpirationNotInFuture(DateTime<Utc>),
}

/// Errors surfaced by the matching engine and the instrument registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Submission whose routing triple matches no registered instrument
    #[error("no registered instrument matches ({instrument_id}, {market_code}, {currency})")]
    UnknownInstrument {
        instrument_id: i64,
        market_code: String,
        currency: String,
    },

    /// Registration of an already-known composite key
    #[error("instrument ({instrument_id}, {market_code}, {currency}) is already registered")]
    DuplicateInstrument {
        instrument_id: i64,
        market_code: String,
        currency: String,
    },

    /// A validator rejected the order
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
