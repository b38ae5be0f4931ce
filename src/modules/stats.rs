//! Per-module call statistics for diagnostics and tuning.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Smoothing factor for the success-rate moving average.
pub const SUCCESS_RATE_ALPHA: f64 = 0.1;

/// Statistics a module keeps about its own `analyze` calls.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleStatistics {
    /// Total analyze calls.
    pub total_calls: u64,

    /// Calls that returned an analysis.
    pub successful_calls: u64,

    /// Calls that returned an error.
    pub failed_calls: u64,

    /// Total time spent analyzing (microseconds).
    pub total_time_us: u64,

    /// Exponential moving average of call success, starting from 0.
    pub success_rate: f64,

    /// When the module last finished a call.
    pub last_used: Option<DateTime<Utc>>,
}

impl ModuleStatistics {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record one finished call.
    pub fn record(&mut self, elapsed: Duration, success: bool) {
        self.total_calls += 1;
        if success {
            self.successful_calls += 1;
        } else {
            self.failed_calls += 1;
        }
        self.total_time_us += u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let sample = if success { 1.0 } else { 0.0 };
        self.success_rate =
            SUCCESS_RATE_ALPHA * sample + (1.0 - SUCCESS_RATE_ALPHA) * self.success_rate;
        self.last_used = Some(Utc::now());
    }

    /// Mean call time in milliseconds.
    #[must_use]
    pub fn avg_time_ms(&self) -> f64 {
        if self.total_calls == 0 {
            0.0
        } else {
            self.total_time_us as f64 / self.total_calls as f64 / 1000.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = ModuleStatistics::new();
        assert_eq!(stats.total_calls, 0);
        assert_eq!(stats.avg_time_ms(), 0.0);
        assert!(stats.last_used.is_none());
    }

    #[test]
    fn test_success_rate_is_ema() {
        let mut stats = ModuleStatistics::new();
        stats.record(Duration::from_millis(2), true);
        assert!((stats.success_rate - 0.1).abs() < 1e-12);
        stats.record(Duration::from_millis(4), true);
        assert!((stats.success_rate - 0.19).abs() < 1e-12);
        stats.record(Duration::from_millis(6), false);
        assert!((stats.success_rate - 0.171).abs() < 1e-12);
        assert_eq!(stats.failed_calls, 1);
        assert!((stats.avg_time_ms() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_reset() {
        let mut stats = ModuleStatistics::new();
        stats.record(Duration::from_millis(1), true);
        stats.reset();
        assert_eq!(stats, ModuleStatistics::default());
    }

    #[test]
    fn test_stats_serialization() {
        let mut stats = ModuleStatistics::new();
        stats.record(Duration::from_millis(3), true);
        let json = serde_json::to_string(&stats).unwrap();
        let back: ModuleStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(stats.total_calls, back.total_calls);
        assert_eq!(stats.total_time_us, back.total_time_us);
    }
}
