//! Orchestrator-side metrics and state snapshots.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BrainConfig;
use crate::modules::ModuleStatistics;

/// Smoothing factor for latency moving averages.
pub const LATENCY_ALPHA: f64 = 0.1;

fn ema(current: f64, sample: f64) -> f64 {
    LATENCY_ALPHA * sample + (1.0 - LATENCY_ALPHA) * current
}

/// How the orchestrator saw one module's calls.
///
/// Distinct from [`ModuleStatistics`], which the module keeps about
/// itself: a call that times out is never observed by the module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetrics {
    pub calls: u64,
    pub successes: u64,
    pub timeouts: u64,
    /// Errors and panics.
    pub failures: u64,
    pub cancellations: u64,
    /// Cycles in which this module's suggestion became the decision.
    pub accepted_suggestions: u64,
    /// EMA of successful call latency, starting from 0.
    pub avg_latency_ms: f64,
    pub last_error: Option<String>,
}

impl ModuleMetrics {
    pub fn record_success(&mut self, latency_ms: f64) {
        self.calls += 1;
        self.successes += 1;
        self.avg_latency_ms = ema(self.avg_latency_ms, latency_ms);
    }

    pub fn record_timeout(&mut self) {
        self.calls += 1;
        self.timeouts += 1;
        self.last_error = Some("timed out".into());
    }

    pub fn record_failure(&mut self, reason: &str) {
        self.calls += 1;
        self.failures += 1;
        self.last_error = Some(reason.to_string());
    }

    pub fn record_cancellation(&mut self) {
        self.calls += 1;
        self.cancellations += 1;
    }

    /// Fraction of calls that returned an analysis.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.successes as f64 / self.calls as f64
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrainMetrics {
    pub total_decisions: u64,
    /// EMA of decision latency, starting from 0.
    pub avg_decision_time_ms: f64,
    /// Decisions produced by the fallback ladder.
    pub fallbacks: u64,
    pub timeouts: u64,
    pub failures: u64,
    pub module_metrics: BTreeMap<String, ModuleMetrics>,
}

impl BrainMetrics {
    pub fn record_decision(&mut self, compute_time_ms: f64) {
        self.total_decisions += 1;
        self.avg_decision_time_ms = ema(self.avg_decision_time_ms, compute_time_ms);
    }

    pub fn module_mut(&mut self, name: &str) -> &mut ModuleMetrics {
        self.module_metrics.entry(name.to_string()).or_default()
    }
}

/// Registry view of one module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleStatus {
    pub name: String,
    pub enabled: bool,
    pub healthy: bool,
    /// Configured base weight.
    pub current_weight: f64,
    pub statistics: ModuleStatistics,
    pub metrics: ModuleMetrics,
}

/// Snapshot of the whole brain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrainState {
    pub initialized: bool,
    pub active: bool,
    pub config: BrainConfig,
    pub modules: BTreeMap<String, ModuleStatus>,
    pub metrics: BrainMetrics,
    pub version: String,
    pub last_update: DateTime<Utc>,
}
