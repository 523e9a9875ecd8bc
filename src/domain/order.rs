// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::ValidationError;
use super::Instrument;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// Buy-side resting order
    Bid,
    /// Sell-side resting order
    Ask,
}

/// Pricing constraint of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LimitType {
    /// Order with a price limit
    Limit,
    /// No price limitation
    None,
}

/// Time validity of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeInForce {
    /// Valid for the current trading day; removed at the daily reset
    Day,
    /// Valid until the given expiration timestamp
    GoodTillDate(DateTime<Utc>),
}

// ============================================================================
// Order Entity
// ============================================================================

/// A trading order.
///
/// Orders are created by the submitter, validated by the engine against the
/// instrument's tick and lot constraints, and then rest in the book until
/// matched or expired. Only the matching sweep decrements `remaining_qty`;
/// it never increases.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    /// Order identifier, unique within the session (submitter's contract)
    pub order_id: u64,
    /// Submitting firm identifier
    pub firm_id: u64,
    /// Market Identification Code (MIC)
    pub market_code: String,
    /// Trading currency
    pub currency: String,
    /// Instrument identifier
    pub instrument_id: i64,
    /// Buy or sell
    pub side: Side,
    /// Limit price
    pub price: Decimal,
    /// Price limitation type
    pub limit_type: LimitType,
    /// Quantity at submission
    pub original_qty: u64,
    /// Quantity still unfilled; zero means fully executed
    pub remaining_qty: u64,
    /// Submission timestamp; the time component of price-time priority
    pub priority_ts: DateTime<Utc>,
    /// Time validity
    pub time_in_force: TimeInForce,
}

impl Order {
    /// Create a DAY order, valid until the end of the trading day.
    #[allow(clippy::too_many_arguments)]
    pub fn new_day(
        order_id: u64,
        market_code: impl Into<String>,
        currency: impl Into<String>,
        priority_ts: DateTime<Utc>,
        price: Decimal,
        quantity: u64,
        side: Side,
        limit_type: LimitType,
        instrument_id: i64,
        firm_id: u64,
    ) -> Self {
        Self {
            order_id,
            firm_id,
            market_code: market_code.into(),
            currency: currency.into(),
            instrument_id,
            side,
            price,
            limit_type,
            original_qty: quantity,
            remaining_qty: quantity,
            priority_ts,
            time_in_force: TimeInForce::Day,
        }
    }

    /// Create a GTD order, valid until `expiration`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_gtd(
        order_id: u64,
        market_code: impl Into<String>,
        currency: impl Into<String>,
        priority_ts: DateTime<Utc>,
        price: Decimal,
        quantity: u64,
        side: Side,
        limit_type: LimitType,
        instrument_id: i64,
        firm_id: u64,
        expiration: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            firm_id,
            market_code: market_code.into(),
            currency: currency.into(),
            instrument_id,
            side,
            price,
            limit_type,
            original_qty: quantity,
            remaining_qty: quantity,
            priority_ts,
            time_in_force: TimeInForce::GoodTillDate(expiration),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The routing triple identifying the instrument this order trades.
    pub fn routing(&self) -> (i64, &str, &str) {
        (self.instrument_id, &self.market_code, &self.currency)
    }

    /// Quantity filled so far.
    pub fn filled_qty(&self) -> u64 {
        self.original_qty - self.remaining_qty
    }

    /// Whether this order carries an expiration timestamp.
    pub fn is_gtd(&self) -> bool {
        matches!(self.time_in_force, TimeInForce::GoodTillDate(_))
    }

    /// Expiration timestamp, for GTD orders.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        match self.time_in_force {
            TimeInForce::GoodTillDate(expiration) => Some(expiration),
            TimeInForce::Day => None,
        }
    }

    /// Whether a GTD order has expired as of `now`. DAY orders never expire
    /// here; their end-of-day removal happens at the daily reset.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.time_in_force, TimeInForce::GoodTillDate(expiration) if expiration <= now)
    }

    // ========================================================================
    // Validators
    // ========================================================================

    /// Validate the order price against the instrument's tick grid.
    ///
    /// The price must be strictly positive and `price × 10^price_decimal`
    /// must be an integer within `epsilon`.
    pub fn validate_price(
        &self,
        instrument: &Instrument,
        epsilon: Decimal,
    ) -> Result<(), ValidationError> {
        if self.price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(self.price));
        }

        let scale = Decimal::from(10u64.pow(instrument.price_decimal));
        let scaled = self.price * scale;
        if (scaled - scaled.round()).abs() > epsilon {
            return Err(ValidationError::PriceOffTick {
                price: self.price,
                price_decimal: instrument.price_decimal,
            });
        }

        Ok(())
    }

    /// Validate the order quantity against the instrument's lot size.
    pub fn validate_quantity(&self, instrument: &Instrument) -> Result<(), ValidationError> {
        if self.original_qty == 0 {
            return Err(ValidationError::NonPositiveQuantity(self.original_qty));
        }

        if self.original_qty % instrument.lot_size != 0 {
            return Err(ValidationError::QuantityNotLotMultiple {
                quantity: self.original_qty,
                lot_size: instrument.lot_size,
            });
        }

        Ok(())
    }

    /// Validate that a GTD expiration is strictly in the future at
    /// submission time. DAY orders always pass.
    pub fn validate_expiry(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        match self.time_in_force {
            TimeInForce::GoodTillDate(expiration) if expiration <= now => {
                Err(ValidationError::ExpirationNotInFuture(expiration))
            },
            _ => Ok(()),
        }
    }
}
