//! Shared scaffolding for built-in modules.
//!
//! [`ModuleCore`] holds what every module needs regardless of how it
//! decides: its configuration, the initialized flag, call statistics, and
//! the timed wrapper around the analysis itself.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Instant;

use tracing::debug;

use crate::config::ModuleConfig;
use crate::core::{GameState, ModuleError, ModuleResult};

use super::stats::ModuleStatistics;
use super::suggestion::ModuleAnalysis;

#[derive(Debug)]
pub struct ModuleCore {
    name: String,
    config: RwLock<ModuleConfig>,
    initialized: AtomicBool,
    stats: Mutex<ModuleStatistics>,
}

impl ModuleCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: RwLock::new(ModuleConfig::default()),
            initialized: AtomicBool::new(false),
            stats: Mutex::new(ModuleStatistics::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store the configuration and mark the module ready.
    pub fn configure(&self, config: &ModuleConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config.clone();
        self.initialized.store(true, Ordering::Release);
        debug!(module = %self.name, base_weight = config.base_weight, "module configured");
    }

    pub fn shutdown(&self) {
        self.initialized.store(false, Ordering::Release);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ModuleConfig {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Ready and enabled.
    pub fn is_active(&self) -> bool {
        self.is_initialized() && self.config.read().unwrap_or_else(PoisonError::into_inner).enabled
    }

    /// First matching weight rule, else the base weight; 0 when inactive.
    pub fn resolve_weight(&self, state: &GameState) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve_weight(state)
    }

    pub fn statistics(&self) -> ModuleStatistics {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn reset_statistics(&self) {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).reset();
    }

    /// Run `analysis`, timing it and recording the outcome.
    ///
    /// Fails with [`ModuleError::NotInitialized`] before `configure`.
    pub async fn run_analysis<F, Fut>(&self, analysis: F) -> ModuleResult<ModuleAnalysis>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = ModuleResult<ModuleAnalysis>> + Send,
    {
        if !self.is_initialized() {
            return Err(ModuleError::NotInitialized(self.name.clone()));
        }

        let start = Instant::now();
        let result = analysis().await;
        let elapsed = start.elapsed();

        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(elapsed, result.is_ok());

        result.map(|mut analysis| {
            analysis.compute_time_ms = elapsed.as_secs_f64() * 1000.0;
            analysis
        })
    }
}
