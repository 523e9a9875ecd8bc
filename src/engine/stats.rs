// ============================================================================
// Trading Statistics
// Lock-free counters updated by concurrent matchers and submitters
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::domain::Trade;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Accumulate a float delta into an `AtomicU64` holding f64 bits.
///
/// The CAS loop guarantees that a concurrent update is never lost; readers
/// across different counters may still observe transient skew.
fn add_f64(cell: &AtomicU64, delta: f64) {
    let mut current = cell.load(Ordering::Acquire);
    loop {
        let next = (f64::from_bits(current) + delta).to_bits();
        match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => return,
            Err(observed) => current = observed,
        }
    }
}

fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Acquire))
}

/// Trading statistics for the engine.
///
/// Every counter is individually atomic; no lock serialises updates across
/// counters. Daily counters (and the per-window attempt/success pair) are
/// zeroed by the worker's daily reset; total counters only reset when the
/// engine starts.
#[derive(Default)]
pub struct EngineStats {
    daily_trade_count: AtomicU64,
    daily_notional: AtomicU64,
    total_trade_count: AtomicU64,
    total_notional: AtomicU64,
    matching_attempts: AtomicU64,
    successful_matches: AtomicU64,
    /// Microseconds since the epoch of the last daily reset
    last_daily_reset_micros: AtomicI64,
}

/// Plain readout of the statistics at one instant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatsReport {
    pub daily_trade_count: u64,
    pub daily_notional: f64,
    pub total_trade_count: u64,
    pub total_notional: f64,
    pub matching_attempts: u64,
    pub successful_matches: u64,
    pub last_daily_reset: DateTime<Utc>,
}

impl StatsReport {
    /// Share of matching attempts that produced at least one trade worth of
    /// matches, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.matching_attempts == 0 {
            0.0
        } else {
            100.0 * self.successful_matches as f64 / self.matching_attempts as f64
        }
    }
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one executed trade into the counters.
    pub fn record_trade(&self, trade: &Trade) {
        let notional = trade.notional().to_f64().unwrap_or(0.0);

        self.daily_trade_count.fetch_add(1, Ordering::AcqRel);
        add_f64(&self.daily_notional, notional);
        self.total_trade_count.fetch_add(1, Ordering::AcqRel);
        add_f64(&self.total_notional, notional);
        self.successful_matches.fetch_add(1, Ordering::AcqRel);
    }

    /// Count one background matching sweep, whether or not it traded.
    pub fn record_attempt(&self) {
        self.matching_attempts.fetch_add(1, Ordering::AcqRel);
    }

    /// Zero the daily counters and the attempt/success window, stamping the
    /// reset time. Totals are untouched.
    pub fn reset_daily(&self, now: DateTime<Utc>) {
        self.daily_trade_count.store(0, Ordering::Release);
        self.daily_notional.store(0f64.to_bits(), Ordering::Release);
        self.matching_attempts.store(0, Ordering::Release);
        self.successful_matches.store(0, Ordering::Release);
        self.last_daily_reset_micros
            .store(now.timestamp_micros(), Ordering::Release);
    }

    /// Zero everything, including totals. Called when the engine starts.
    pub fn reset_all(&self, now: DateTime<Utc>) {
        self.total_trade_count.store(0, Ordering::Release);
        self.total_notional.store(0f64.to_bits(), Ordering::Release);
        self.reset_daily(now);
    }

    /// Timestamp of the most recent daily reset.
    pub fn last_daily_reset(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.last_daily_reset_micros.load(Ordering::Acquire))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Current readings of every counter.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            daily_trade_count: self.daily_trade_count.load(Ordering::Acquire),
            daily_notional: load_f64(&self.daily_notional),
            total_trade_count: self.total_trade_count.load(Ordering::Acquire),
            total_notional: load_f64(&self.total_notional),
            matching_attempts: self.matching_attempts.load(Ordering::Acquire),
            successful_matches: self.successful_matches.load(Ordering::Acquire),
            last_daily_reset: self.last_daily_reset(),
        }
    }
}
