// ============================================================================
// Engine Observer Interface
// Defines the contract for the engine's observability surface
// ============================================================================

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::io::Write;

use crate::domain::Side;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Status Snapshot
// ============================================================================

/// Point-in-time status of the engine, emitted periodically by the worker
/// and available on demand through `MatchingEngine::status`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineStatus {
    pub timestamp: DateTime<Utc>,
    pub running: bool,
    pub daily_trade_count: u64,
    pub daily_notional: f64,
    pub total_trade_count: u64,
    pub instrument_count: usize,
    pub bid_levels: usize,
    pub ask_levels: usize,
}

// ============================================================================
// Events
// ============================================================================

/// Events emitted by the matching engine.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EngineEvent {
    /// Engine started and the worker was spawned
    Started { timestamp: DateTime<Utc> },

    /// Engine stopped and the worker joined
    Stopped { timestamp: DateTime<Utc> },

    /// Daily statistics rolled over; DAY orders left the book
    DailyReset {
        timestamp: DateTime<Utc>,
        day_orders_expired: usize,
    },

    /// A matching sweep produced trades
    TradesMatched {
        timestamp: DateTime<Utc>,
        count: usize,
    },

    /// Periodic GTD expiry sweep ran
    GtdSweep {
        timestamp: DateTime<Utc>,
        /// Order ids removed by this sweep
        expired: Vec<u64>,
        /// GTD orders still resting after the sweep
        remaining: usize,
    },

    /// Periodic status snapshot
    Status(EngineStatus),

    /// Order passed validation and entered the book
    OrderAccepted {
        timestamp: DateTime<Utc>,
        order_id: u64,
        side: Side,
        price: Decimal,
        quantity: u64,
    },

    /// Order refused at submission
    OrderRejected {
        timestamp: DateTime<Utc>,
        order_id: u64,
        reason: String,
    },
}

impl EngineEvent {
    /// When the event happened.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            EngineEvent::Started { timestamp }
            | EngineEvent::Stopped { timestamp }
            | EngineEvent::DailyReset { timestamp, .. }
            | EngineEvent::TradesMatched { timestamp, .. }
            | EngineEvent::GtdSweep { timestamp, .. }
            | EngineEvent::OrderAccepted { timestamp, .. }
            | EngineEvent::OrderRejected { timestamp, .. } => *timestamp,
            EngineEvent::Status(status) => status.timestamp,
        }
    }
}

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer for engine events.
/// Implementations can handle logging, display, metrics, notifications.
pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: &EngineEvent);
}

/// No-op observer for testing.
pub struct NoOpObserver;

impl EngineObserver for NoOpObserver {
    fn on_event(&self, _event: &EngineEvent) {
        // Do nothing
    }
}

/// Observer that forwards events to the log.
pub struct LoggingObserver;

impl EngineObserver for LoggingObserver {
    fn on_event(&self, event: &EngineEvent) {
        tracing::debug!("engine event: {:?}", event);
    }
}

// ============================================================================
// Line Sink
// ============================================================================

/// Plain-text observer writing one timestamped line per event to a
/// line-buffered sink. The format is a human surface, not a wire protocol.
pub struct LineSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn write_line(&self, timestamp: DateTime<Utc>, line: &str) {
        let mut writer = self.writer.lock();
        let stamped = format!("{} {}", timestamp.format("%Y-%m-%d %H:%M:%S"), line);
        if writeln!(writer, "{}", stamped).and_then(|_| writer.flush()).is_err() {
            tracing::warn!("status sink write failed");
        }
    }
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Bid => "BID",
        Side::Ask => "ASK",
    }
}

impl<W: Write + Send> EngineObserver for LineSink<W> {
    fn on_event(&self, event: &EngineEvent) {
        let timestamp = event.timestamp();
        match event {
            EngineEvent::Started { .. } => {
                self.write_line(timestamp, "trading engine started in continuous mode");
            },
            EngineEvent::Stopped { .. } => {
                self.write_line(timestamp, "trading engine stopped");
            },
            EngineEvent::DailyReset {
                day_orders_expired, ..
            } => {
                self.write_line(
                    timestamp,
                    &format!(
                        "daily statistics reset, {} DAY orders expired",
                        day_orders_expired
                    ),
                );
            },
            EngineEvent::TradesMatched { count, .. } => {
                self.write_line(timestamp, &format!("matched {} orders", count));
            },
            EngineEvent::GtdSweep {
                expired, remaining, ..
            } => {
                for order_id in expired {
                    self.write_line(timestamp, &format!("removed expired GTD order {}", order_id));
                }
                self.write_line(
                    timestamp,
                    &format!(
                        "GTD check: {} expired, {} still resting",
                        expired.len(),
                        remaining
                    ),
                );
            },
            EngineEvent::Status(status) => {
                self.write_line(
                    timestamp,
                    &format!(
                        "status: running={} daily_trades={} daily_notional={:.2} total_trades={} instruments={} bid_levels={} ask_levels={}",
                        status.running,
                        status.daily_trade_count,
                        status.daily_notional,
                        status.total_trade_count,
                        status.instrument_count,
                        status.bid_levels,
                        status.ask_levels,
                    ),
                );
            },
            EngineEvent::OrderAccepted {
                order_id,
                side,
                price,
                quantity,
                ..
            } => {
                self.write_line(
                    timestamp,
                    &format!(
                        "order {} accepted: {} {} @ {}",
                        order_id,
                        side_label(*side),
                        quantity,
                        price
                    ),
                );
            },
            EngineEvent::OrderRejected {
                order_id, reason, ..
            } => {
                self.write_line(timestamp, &format!("order {} rejected: {}", order_id, reason));
            },
        }
    }
}
