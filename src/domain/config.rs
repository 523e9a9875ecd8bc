// ============================================================================
// Engine Configuration
// ============================================================================

use rust_decimal::Decimal;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration bundle for the matching engine.
///
/// All values have production defaults; tests shrink the intervals to drive
/// the worker loop quickly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Worker sleep between loop iterations
    pub worker_tick_interval: Duration,

    /// Minimum elapsed time between status snapshots
    pub status_interval: Duration,

    /// Minimum elapsed time between GTD expiry sweeps
    pub gtd_check_interval: Duration,

    /// Interval at which daily statistics reset (and DAY orders expire)
    pub daily_reset_interval: Duration,

    /// Tolerance when checking that a price sits on the tick grid
    pub price_epsilon: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_tick_interval: Duration::from_secs(1),
            status_interval: Duration::from_secs(30),
            gtd_check_interval: Duration::from_secs(3600),
            daily_reset_interval: Duration::from_secs(24 * 3600),
            price_epsilon: Decimal::new(1, 8), // 1e-8
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the worker tick interval
    pub fn with_worker_tick_interval(mut self, interval: Duration) -> Self {
        self.worker_tick_interval = interval;
        self
    }

    /// Builder method: set the status snapshot interval
    pub fn with_status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    /// Builder method: set the GTD expiry check interval
    pub fn with_gtd_check_interval(mut self, interval: Duration) -> Self {
        self.gtd_check_interval = interval;
        self
    }

    /// Builder method: set the daily statistics reset interval
    pub fn with_daily_reset_interval(mut self, interval: Duration) -> Self {
        self.daily_reset_interval = interval;
        self
    }

    /// Builder method: set the tick-grid tolerance
    pub fn with_price_epsilon(mut self, epsilon: Decimal) -> Self {
        self.price_epsilon = epsilon;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_tick_interval.is_zero() {
            return Err("worker tick interval must be positive".to_string());
        }
        if self.status_interval.is_zero() {
            return Err("status interval must be positive".to_string());
        }
        if self.gtd_check_interval.is_zero() {
            return Err("GTD check interval must be positive".to_string());
        }
        if self.daily_reset_interval.is_zero() {
            return Err("daily reset interval must be positive".to_string());
        }
        if self.price_epsilon < Decimal::ZERO {
            return Err("price epsilon cannot be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.worker_tick_interval, Duration::from_secs(1));
        assert_eq!(config.status_interval, Duration::from_secs(30));
        assert_eq!(config.gtd_check_interval, Duration::from_secs(3600));
        assert_eq!(config.daily_reset_interval, Duration::from_secs(86400));
        assert_eq!(config.price_epsilon, Decimal::new(1, 8));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .with_worker_tick_interval(Duration::from_millis(10))
            .with_status_interval(Duration::from_millis(50))
            .with_gtd_check_interval(Duration::from_millis(20))
            .with_daily_reset_interval(Duration::from_millis(100));

        assert_eq!(config.worker_tick_interval, Duration::from_millis(10));
        assert_eq!(config.daily_reset_interval, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = EngineConfig::new().with_worker_tick_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = EngineConfig::new().with_price_epsilon(Decimal::new(-1, 8));
        assert!(config.validate().is_err());
    }
}
