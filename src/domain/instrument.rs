// ============================================================================
// Instrument Domain Model
// ============================================================================

use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum length of an instrument display name, in code points.
const NAME_MAX_CHARS: usize = 50;

/// Lifecycle state of a tradable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InstrumentState {
    /// Available for trading
    Active,
    /// Temporarily unavailable
    Inactive,
    /// Trading suspended
    Suspended,
    /// Removed from trading
    Delisted,
}

/// A tradable instrument of the venue.
///
/// Instruments are identified by the composite key
/// `(instrument_id, market_code, currency)` and are immutable once
/// registered; lifecycle transitions happen outside the core.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Instrument {
    /// Instrument identifier (ISIN-style numeric id)
    pub instrument_id: i64,
    /// Market Identification Code (MIC) of the listing venue
    pub market_code: String,
    /// Trading currency
    pub currency: String,
    /// Display name, bounded to 50 code points
    name: String,
    /// Issue number
    pub issue: i32,
    /// Lifecycle state
    pub state: InstrumentState,
    /// Reference price
    pub ref_price: Decimal,
    /// Trading group identifier
    pub trading_group_id: i32,
    /// Minimum tradable quantity unit; order quantities are multiples of it
    pub lot_size: u64,
    /// Number of price decimals; the tick is `10^-price_decimal`
    pub price_decimal: u32,
    /// Opaque auxiliary identifier carried from the venue reference data
    pub apf_id: i32,
}

impl Instrument {
    /// Create a new instrument.
    ///
    /// The display name is truncated to 50 code points; the rest of the
    /// fields are stored as given.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instrument_id: i64,
        market_code: impl Into<String>,
        currency: impl Into<String>,
        name: &str,
        issue: i32,
        state: InstrumentState,
        ref_price: Decimal,
        trading_group_id: i32,
        lot_size: u64,
        price_decimal: u32,
        apf_id: i32,
    ) -> Self {
        Self {
            instrument_id,
            market_code: market_code.into(),
            currency: currency.into(),
            name: name.chars().take(NAME_MAX_CHARS).collect(),
            issue,
            state,
            ref_price,
            trading_group_id,
            lot_size,
            price_decimal,
            apf_id,
        }
    }

    /// The bounded display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Composite identity of the instrument.
    pub fn key(&self) -> (i64, &str, &str) {
        (self.instrument_id, &self.market_code, &self.currency)
    }

    /// Smallest price increment for this instrument.
    pub fn tick(&self) -> Decimal {
        Decimal::new(1, self.price_decimal)
    }
}
