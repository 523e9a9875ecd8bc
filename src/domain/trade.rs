// ============================================================================
// Trade Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An executed trade between a bid and an ask.
///
/// Trades are produced by the matching sweep, appended to the book's trade
/// log, and never modified.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// Trade identifier, monotonically increasing within the book
    pub trade_id: u64,

    /// Order id of the buy side
    pub buy_order_id: u64,

    /// Order id of the sell side
    pub sell_order_id: u64,

    /// Market Identification Code (MIC)
    pub market_code: String,

    /// Trading currency
    pub currency: String,

    /// Execution price (the resting ask's price on a cross)
    pub price: Decimal,

    /// Executed quantity
    pub quantity: u64,

    /// Execution timestamp
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    /// Notional value of the trade (`price × quantity`).
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
