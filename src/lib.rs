// ============================================================================
// Exchange Core Library
// Continuous-trading matching engine for a single venue
// ============================================================================

//! # exchange-core
//!
//! A continuous-trading matching engine for a single venue of equity-like
//! instruments.
//!
//! ## Features
//!
//! - **Price-time priority matching** with FIFO queues per price level
//! - **Instrument registry** validating orders against tick and lot
//!   constraints
//! - **Background worker** driving periodic sweeps, GTD/DAY expiry, and
//!   daily statistics rollover
//! - **Lock-free statistics** counters safe under concurrent submitters
//! - **Pluggable observability** through a plain-text event sink
//!
//! ## Example
//!
//! ```rust
//! use exchange_core::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! // Venue reference data
//! let registry = Arc::new(InstrumentRegistry::new());
//! registry.register(Instrument::new(
//!     1, "XPAR", "EUR", "ACME SA", 2024, InstrumentState::Active,
//!     Decimal::new(15000, 2), 5, 100, 2, 0,
//! ));
//!
//! // Shared book and the engine driving it
//! let book = Arc::new(OrderBook::new());
//! let engine = MatchingEngine::new(
//!     EngineConfig::default(),
//!     Arc::clone(&registry),
//!     Arc::clone(&book),
//!     Arc::new(NoOpObserver),
//! );
//!
//! // A bid resting at 155.00 for 300 (three lots of 100)
//! let accepted = engine.submit(Order::new_day(
//!     1001, "XPAR", "EUR", chrono::Utc::now(),
//!     Decimal::new(15500, 2), 300, Side::Bid, LimitType::Limit, 1, 7,
//! ));
//! assert!(accepted);
//!
//! let snapshot = book.snapshot();
//! assert_eq!(snapshot.best_bid(), Some(Decimal::new(15500, 2)));
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod registry;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        BookSnapshot, DepthLevel, EngineConfig, EngineError, Instrument, InstrumentState,
        LimitType, Order, OrderBook, Side, TimeInForce, Trade, ValidationError,
    };
    pub use crate::engine::{EngineStats, MatchingEngine, StatsReport};
    pub use crate::interfaces::{
        EngineEvent, EngineObserver, EngineStatus, LineSink, LoggingObserver, NoOpObserver,
    };
    pub use crate::registry::InstrumentRegistry;
}

#[cfg(test)]
mod scenario_tests {
    use super::prelude::*;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn instrument(instrument_id: i64) -> Instrument {
        Instrument::new(
            instrument_id,
            "XPAR",
            "EUR",
            "TEST INSTRUMENT",
            2024,
            InstrumentState::Active,
            Decimal::new(15000, 2),
            5,
            100,
            2,
            0,
        )
    }

    fn venue() -> (MatchingEngine, Arc<OrderBook>, Arc<InstrumentRegistry>) {
        let registry = Arc::new(InstrumentRegistry::new());
        registry.register(instrument(1));
        let book = Arc::new(OrderBook::new());
        let engine = MatchingEngine::new(
            EngineConfig::default(),
            Arc::clone(&registry),
            Arc::clone(&book),
            Arc::new(NoOpObserver),
        );
        (engine, book, registry)
    }

    fn day_order(
        order_id: u64,
        side: Side,
        price_cents: i64,
        quantity: u64,
        priority_ts: DateTime<Utc>,
    ) -> Order {
        Order::new_day(
            order_id,
            "XPAR",
            "EUR",
            priority_ts,
            Decimal::new(price_cents, 2),
            quantity,
            side,
            LimitType::Limit,
            1,
            7,
        )
    }

    /// Scenario 1: a bid at 155.00 crossed by an ask at 148.00 trades 200
    /// at the resting ask's price.
    #[test]
    fn scenario_basic_cross() {
        let (engine, book, _registry) = venue();
        let t0 = Utc::now();

        assert!(engine.submit(day_order(1001, Side::Bid, 15500, 300, t0)));
        assert!(engine.submit(day_order(2001, Side::Ask, 14800, 200, t0)));

        let trades = book.trades();
        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.buy_order_id, 1001);
        assert_eq!(trade.sell_order_id, 2001);
        assert_eq!(trade.quantity, 200);
        assert_eq!(trade.price, Decimal::new(14800, 2));

        let snapshot = book.snapshot();
        assert!(snapshot.asks.is_empty());
        assert_eq!(snapshot.bid_orders.len(), 1);
        let remainder = &snapshot.bid_orders[0];
        assert_eq!(remainder.order_id, 1001);
        assert_eq!(remainder.remaining_qty, 100);

        // Conservation: filled quantity equals the traded quantity
        assert_eq!(remainder.original_qty - remainder.remaining_qty, 200);
    }

    /// Scenario 2: bids at the same price queue in submission order behind
    /// the partially filled remainder.
    #[test]
    fn scenario_time_priority_at_same_price() {
        let (engine, book, _registry) = venue();
        let t0 = Utc::now();

        engine.submit(day_order(1001, Side::Bid, 15500, 300, t0));
        engine.submit(day_order(2001, Side::Ask, 14800, 200, t0));
        engine.submit(day_order(
            1002,
            Side::Bid,
            15500,
            200,
            t0 + Duration::milliseconds(200),
        ));
        engine.submit(day_order(
            1003,
            Side::Bid,
            15500,
            200,
            t0 + Duration::milliseconds(300),
        ));

        let snapshot = book.snapshot();
        let ids: Vec<u64> = snapshot.bid_orders.iter().map(|o| o.order_id).collect();
        assert_eq!(ids, vec![1001, 1002, 1003]);
        assert_eq!(snapshot.bid_orders[0].remaining_qty, 100);

        // Priority ordering holds at this quiescent point: prices
        // non-increasing, timestamps ascending within a price
        for pair in snapshot.bid_orders.windows(2) {
            assert!(pair[0].price >= pair[1].price);
            if pair[0].price == pair[1].price {
                assert!(pair[0].priority_ts <= pair[1].priority_ts);
            }
        }
    }

    /// Scenario 3: a GTD ask expires at the sweep after its expiration and
    /// leaves the trade log untouched.
    #[test]
    fn scenario_gtd_expiry() {
        let (engine, book, _registry) = venue();
        let t0 = Utc::now();

        let gtd = Order::new_gtd(
            3001,
            "XPAR",
            "EUR",
            t0,
            Decimal::new(15200, 2),
            100,
            Side::Ask,
            LimitType::Limit,
            1,
            7,
            t0 + Duration::hours(1),
        );
        assert!(engine.submit(gtd));

        let removed = book.expire_gtd(t0 + Duration::hours(2));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].order_id, 3001);
        assert!(book.last_trade().is_none());
        assert!(engine.list_gtd().is_empty());
    }

    /// Scenario 4: off-tick price and off-lot quantity are both rejected
    /// without touching the book.
    #[test]
    fn scenario_lot_and_tick_rejection() {
        let (engine, book, _registry) = venue();
        let t0 = Utc::now();

        let off_tick = Order::new_day(
            4001,
            "XPAR",
            "EUR",
            t0,
            Decimal::new(150005, 3), // 150.005 on a 0.01 grid
            100,
            Side::Bid,
            LimitType::Limit,
            1,
            7,
        );
        assert!(!engine.submit(off_tick));

        assert!(!engine.submit(day_order(4002, Side::Bid, 15000, 150, t0)));

        let snapshot = book.snapshot();
        assert!(snapshot.bid_orders.is_empty());
        assert!(snapshot.ask_orders.is_empty());
    }

    /// Scenario 5: the first registration wins; the duplicate is refused.
    #[test]
    fn scenario_duplicate_registration() {
        let registry = InstrumentRegistry::new();
        assert!(registry.register(instrument(1)));
        assert!(!registry.register(instrument(1)));
        assert_eq!(registry.list().len(), 1);
    }

    /// Scenario 6: same price, different instruments: no trade, both
    /// orders stay in place.
    #[test]
    fn scenario_incompatible_top_of_book() {
        let registry = Arc::new(InstrumentRegistry::new());
        registry.register(instrument(1));
        registry.register(instrument(2));
        let book = Arc::new(OrderBook::new());
        let engine = MatchingEngine::new(
            EngineConfig::default(),
            Arc::clone(&registry),
            Arc::clone(&book),
            Arc::new(NoOpObserver),
        );
        let t0 = Utc::now();

        let mut bid_a = day_order(1, Side::Bid, 10000, 100, t0);
        bid_a.instrument_id = 1;
        let mut ask_b = day_order(2, Side::Ask, 10000, 100, t0);
        ask_b.instrument_id = 2;

        assert!(engine.submit(bid_a));
        assert!(engine.submit(ask_b));

        assert_eq!(book.match_orders().len(), 0);
        let snapshot = book.snapshot();
        assert_eq!(snapshot.bid_orders.len(), 1);
        assert_eq!(snapshot.ask_orders.len(), 1);
    }

    /// Statistics totals never decrease across trading activity.
    #[test]
    fn stats_monotonic_over_activity() {
        let (engine, _book, _registry) = venue();
        let t0 = Utc::now();

        let mut previous_total = 0u64;
        for i in 0..5u64 {
            engine.submit(day_order(10 + i, Side::Bid, 15000, 100, t0));
            engine.submit(day_order(20 + i, Side::Ask, 15000, 100, t0));

            let report = engine.detailed_stats();
            assert!(report.total_trade_count >= previous_total);
            previous_total = report.total_trade_count;
        }
        assert_eq!(previous_total, 5);
    }
}
