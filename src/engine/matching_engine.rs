// ============================================================================
// Matching Engine
// Continuous trading: order submission, periodic matching, expiry, stats
// ============================================================================

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::domain::{EngineConfig, EngineError, Order, OrderBook, Trade};
use crate::engine::stats::{EngineStats, StatsReport};
use crate::interfaces::{EngineEvent, EngineObserver, EngineStatus};
use crate::registry::InstrumentRegistry;

/// Elapsed wall time between two instants, saturating to zero if the clock
/// moved backwards.
fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    (now - since).to_std().unwrap_or_default()
}

fn build_status(
    running: bool,
    registry: &InstrumentRegistry,
    book: &OrderBook,
    stats: &EngineStats,
) -> EngineStatus {
    let report = stats.report();
    EngineStatus {
        timestamp: Utc::now(),
        running,
        daily_trade_count: report.daily_trade_count,
        daily_notional: report.daily_notional,
        total_trade_count: report.total_trade_count,
        instrument_count: registry.len(),
        bid_levels: book.bid_level_count(),
        ask_levels: book.ask_level_count(),
    }
}

/// Fold a sweep's trades into the statistics and notify the observer.
fn record_trades(stats: &EngineStats, observer: &dyn EngineObserver, trades: &[Trade]) {
    if trades.is_empty() {
        return;
    }
    for trade in trades {
        stats.record_trade(trade);
    }
    observer.on_event(&EngineEvent::TradesMatched {
        timestamp: Utc::now(),
        count: trades.len(),
    });
}

// ============================================================================
// Worker
// ============================================================================

/// State shared with the background worker thread.
struct Worker {
    config: EngineConfig,
    registry: Arc<InstrumentRegistry>,
    book: Arc<OrderBook>,
    stats: Arc<EngineStats>,
    observer: Arc<dyn EngineObserver>,
    running: Arc<AtomicBool>,
}

impl Worker {
    fn run(self) {
        let started = Utc::now();
        let mut last_gtd_check = started;
        let mut last_status = started;

        while self.running.load(Ordering::Acquire) {
            let iteration = catch_unwind(AssertUnwindSafe(|| {
                self.tick(&mut last_gtd_check, &mut last_status);
            }));
            if let Err(panic) = iteration {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(error = %message, "worker iteration failed, engine continues");
            }

            thread::sleep(self.config.worker_tick_interval);
        }
    }

    /// One iteration of the worker loop.
    fn tick(&self, last_gtd_check: &mut DateTime<Utc>, last_status: &mut DateTime<Utc>) {
        let now = Utc::now();

        // Daily rollover: reset daily statistics and expire DAY orders,
        // whose lifetime is the trading day.
        if elapsed(self.stats.last_daily_reset(), now) >= self.config.daily_reset_interval {
            self.stats.reset_daily(now);
            let expired = self.book.expire_day();
            tracing::info!(day_orders_expired = expired.len(), "daily statistics reset");
            self.observer.on_event(&EngineEvent::DailyReset {
                timestamp: now,
                day_orders_expired: expired.len(),
            });
        }

        // Matching sweep. The attempt counter advances even when nothing
        // trades.
        self.stats.record_attempt();
        let trades = self.book.match_orders();
        record_trades(&self.stats, self.observer.as_ref(), &trades);

        // Periodic GTD expiry sweep
        if elapsed(*last_gtd_check, now) >= self.config.gtd_check_interval {
            let expired = self.book.expire_gtd(now);
            let remaining = self.book.gtd_orders().len();
            self.observer.on_event(&EngineEvent::GtdSweep {
                timestamp: now,
                expired: expired.iter().map(|order| order.order_id).collect(),
                remaining,
            });
            *last_gtd_check = now;
        }

        // Periodic status snapshot
        if elapsed(*last_status, now) >= self.config.status_interval {
            self.observer.on_event(&EngineEvent::Status(build_status(
                true,
                &self.registry,
                &self.book,
                &self.stats,
            )));
            *last_status = now;
        }
    }
}

// ============================================================================
// Matching Engine
// ============================================================================

/// The continuous-trading engine.
///
/// Owns the statistics and the worker thread; the order book and the
/// instrument registry are shared collaborators. Submitters call `submit`
/// concurrently with the worker; the book's exclusive lock serialises their
/// sweeps.
pub struct MatchingEngine {
    config: EngineConfig,
    registry: Arc<InstrumentRegistry>,
    book: Arc<OrderBook>,
    stats: Arc<EngineStats>,
    observer: Arc<dyn EngineObserver>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MatchingEngine {
    pub fn new(
        config: EngineConfig,
        registry: Arc<InstrumentRegistry>,
        book: Arc<OrderBook>,
        observer: Arc<dyn EngineObserver>,
    ) -> Self {
        Self {
            config,
            registry,
            book,
            stats: Arc::new(EngineStats::new()),
            observer,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Start continuous trading. Resets all statistics and spawns the
    /// worker. Calling `start` on a running engine is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }

        self.stats.reset_all(Utc::now());

        let worker = Worker {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
            book: Arc::clone(&self.book),
            stats: Arc::clone(&self.stats),
            observer: Arc::clone(&self.observer),
            running: Arc::clone(&self.running),
        };
        *self.worker.lock() = Some(thread::spawn(move || worker.run()));

        tracing::info!("matching engine started");
        self.observer.on_event(&EngineEvent::Started {
            timestamp: Utc::now(),
        });
    }

    /// Stop continuous trading and join the worker. The worker observes the
    /// cleared flag at its next sleep boundary. Calling `stop` on a stopped
    /// engine is a no-op.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                tracing::error!("worker thread terminated abnormally");
            }
        }

        tracing::info!("matching engine stopped");
        self.observer.on_event(&EngineEvent::Stopped {
            timestamp: Utc::now(),
        });
    }

    /// Whether the worker is running.
    pub fn running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Validate an order and, if it passes, insert it into the book and
    /// sweep immediately. An order that crosses the book is matched before
    /// this returns.
    ///
    /// Returns `false` when the routing triple matches no registered
    /// instrument or a validator rejects the order.
    pub fn submit(&self, order: Order) -> bool {
        let now = Utc::now();

        let Some(instrument) =
            self.registry
                .find(order.instrument_id, &order.market_code, &order.currency)
        else {
            let reason = EngineError::UnknownInstrument {
                instrument_id: order.instrument_id,
                market_code: order.market_code.clone(),
                currency: order.currency.clone(),
            };
            tracing::warn!(order_id = order.order_id, error = %reason, "order rejected");
            self.observer.on_event(&EngineEvent::OrderRejected {
                timestamp: now,
                order_id: order.order_id,
                reason: reason.to_string(),
            });
            return false;
        };

        let validation = order
            .validate_price(&instrument, self.config.price_epsilon)
            .and_then(|_| order.validate_quantity(&instrument))
            .and_then(|_| order.validate_expiry(now));
        if let Err(reason) = validation {
            tracing::warn!(order_id = order.order_id, error = %reason, "order rejected");
            self.observer.on_event(&EngineEvent::OrderRejected {
                timestamp: now,
                order_id: order.order_id,
                reason: reason.to_string(),
            });
            return false;
        }

        self.observer.on_event(&EngineEvent::OrderAccepted {
            timestamp: now,
            order_id: order.order_id,
            side: order.side,
            price: order.price,
            quantity: order.original_qty,
        });

        let trades = self.book.insert_and_match(order);
        record_trades(&self.stats, self.observer.as_ref(), &trades);

        true
    }

    /// Current engine status snapshot.
    pub fn status(&self) -> EngineStatus {
        build_status(self.running(), &self.registry, &self.book, &self.stats)
    }

    /// Full statistics readout, including matching effort counters.
    pub fn detailed_stats(&self) -> StatsReport {
        self.stats.report()
    }

    /// All resting GTD orders.
    pub fn list_gtd(&self) -> Vec<Order> {
        self.book.gtd_orders()
    }
}

impl Drop for MatchingEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Instrument, InstrumentState, LimitType, Side};
    use crate::interfaces::NoOpObserver;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use std::time::Instant;

    fn instrument() -> Instrument {
        Instrument::new(
            1,
            "XPAR",
            "EUR",
            "ACME SA",
            2024,
            InstrumentState::Active,
            Decimal::new(15000, 2),
            5,
            100,
            2,
            0,
        )
    }

    fn fast_config() -> EngineConfig {
        EngineConfig::new()
            .with_worker_tick_interval(std::time::Duration::from_millis(5))
            .with_status_interval(std::time::Duration::from_millis(50))
            .with_gtd_check_interval(std::time::Duration::from_millis(20))
            .with_daily_reset_interval(std::time::Duration::from_secs(3600))
    }

    fn engine_with(config: EngineConfig) -> (MatchingEngine, Arc<OrderBook>) {
        let registry = Arc::new(InstrumentRegistry::new());
        registry.register(instrument());
        let book = Arc::new(OrderBook::new());
        let engine = MatchingEngine::new(config, registry, Arc::clone(&book), Arc::new(NoOpObserver));
        (engine, book)
    }

    fn bid(order_id: u64, price: Decimal, quantity: u64) -> Order {
        Order::new_day(
            order_id,
            "XPAR",
            "EUR",
            Utc::now(),
            price,
            quantity,
            Side::Bid,
            LimitType::Limit,
            1,
            42,
        )
    }

    fn ask(order_id: u64, price: Decimal, quantity: u64) -> Order {
        Order::new_day(
            order_id,
            "XPAR",
            "EUR",
            Utc::now(),
            price,
            quantity,
            Side::Ask,
            LimitType::Limit,
            1,
            42,
        )
    }

    /// Poll `condition` until it holds or the deadline passes.
    fn wait_for(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + std::time::Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }
        condition()
    }

    #[test]
    fn test_submit_unknown_instrument() {
        let (engine, book) = engine_with(fast_config());

        let mut order = bid(1, Decimal::new(15500, 2), 300);
        order.instrument_id = 99;
        assert!(!engine.submit(order));
        assert_eq!(book.bid_level_count(), 0);
    }

    #[test]
    fn test_submit_validation_failures() {
        let (engine, book) = engine_with(fast_config());

        // Off-tick price
        assert!(!engine.submit(bid(1, Decimal::new(150005, 3), 300)));
        // Off-lot quantity
        assert!(!engine.submit(bid(2, Decimal::new(15000, 2), 150)));
        // Stale GTD expiration
        let now = Utc::now();
        let stale = Order::new_gtd(
            3,
            "XPAR",
            "EUR",
            now,
            Decimal::new(15000, 2),
            100,
            Side::Ask,
            LimitType::Limit,
            1,
            42,
            now - Duration::hours(1),
        );
        assert!(!engine.submit(stale));

        assert_eq!(book.bid_level_count(), 0);
        assert_eq!(book.ask_level_count(), 0);
    }

    #[test]
    fn test_submit_matches_before_return() {
        let (engine, book) = engine_with(fast_config());

        assert!(engine.submit(bid(1001, Decimal::new(15500, 2), 300)));
        assert_eq!(book.trade_count(), 0);

        assert!(engine.submit(ask(2001, Decimal::new(14800, 2), 200)));
        assert_eq!(book.trade_count(), 1);

        let report = engine.detailed_stats();
        assert_eq!(report.total_trade_count, 1);
        assert_eq!(report.daily_trade_count, 1);
        assert_eq!(report.successful_matches, 1);
        // Submission sweeps do not count as matching attempts
        assert_eq!(report.matching_attempts, 0);
    }

    #[test]
    fn test_start_stop_idempotent() {
        let (engine, _book) = engine_with(fast_config());

        assert!(!engine.running());
        engine.stop(); // no-op on a stopped engine
        assert!(!engine.running());

        engine.start();
        assert!(engine.running());
        engine.start(); // no-op on a running engine
        assert!(engine.running());

        engine.stop();
        assert!(!engine.running());
        engine.stop(); // still a no-op
        assert!(!engine.running());
    }

    #[test]
    fn test_worker_sweeps_resting_orders() {
        let (engine, book) = engine_with(fast_config());

        // Crossed book inserted behind the engine's back; only the worker
        // can match it.
        book.insert(bid(1, Decimal::new(15000, 2), 100));
        book.insert(ask(2, Decimal::new(15000, 2), 100));

        engine.start();
        assert!(wait_for(|| book.trade_count() == 1));
        engine.stop();

        let report = engine.detailed_stats();
        assert!(report.matching_attempts >= 1);
        assert_eq!(report.successful_matches, 1);
    }

    #[test]
    fn test_worker_expires_gtd_orders() {
        let (engine, book) = engine_with(fast_config());

        let now = Utc::now();
        let gtd = Order::new_gtd(
            3001,
            "XPAR",
            "EUR",
            now,
            Decimal::new(15200, 2),
            100,
            Side::Ask,
            LimitType::Limit,
            1,
            42,
            now + Duration::milliseconds(30),
        );
        assert!(engine.submit(gtd));
        assert_eq!(engine.list_gtd().len(), 1);

        engine.start();
        assert!(wait_for(|| engine.list_gtd().is_empty()));
        engine.stop();

        assert!(book.last_trade().is_none());
    }

    #[test]
    fn test_worker_daily_reset_expires_day_orders() {
        let config = fast_config().with_daily_reset_interval(std::time::Duration::from_millis(50));
        let (engine, book) = engine_with(config);

        assert!(engine.submit(bid(1, Decimal::new(15000, 2), 100)));
        assert_eq!(book.bid_level_count(), 1);

        engine.start();
        assert!(wait_for(|| book.bid_level_count() == 0));
        engine.stop();

        let report = engine.detailed_stats();
        assert_eq!(report.daily_trade_count, 0);
    }

    #[test]
    fn test_status_reflects_book_and_registry() {
        let (engine, _book) = engine_with(fast_config());

        engine.submit(bid(1, Decimal::new(15000, 2), 100));
        engine.submit(ask(2, Decimal::new(15200, 2), 100));

        let status = engine.status();
        assert!(!status.running);
        assert_eq!(status.instrument_count, 1);
        assert_eq!(status.bid_levels, 1);
        assert_eq!(status.ask_levels, 1);
        assert_eq!(status.total_trade_count, 0);
    }
}
