//! The orchestrator.
//!
//! [`Brain`] owns the module registry and runs one decision cycle per
//! call to [`Brain::make_decision`]:
//!
//! 1. remember the snapshot in the context manager
//! 2. analyze the situation
//! 3. ask every enabled, healthy, applicable module concurrently, each
//!    call raced against the configured timeout
//! 4. fuse the surviving candidates, or walk the fallback ladder
//! 5. record the decision and update metrics
//!
//! Module failures of any kind (errors, panics, timeouts, cancellation)
//! only exclude that module from the current cycle.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::FutureExt;
use rustc_hash::FxHashMap;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cognitive::{CognitiveLayer, SituationAnalysis};
use crate::config::{BrainConfig, BrainConfigPatch, ModuleConfig};
use crate::context::ContextManager;
use crate::core::{BrainError, GameState, ModuleError, ModuleResult, Result};
use crate::fusion::{Decision, DecisionSource, FusionLayer, RiskLevel};
use crate::learning::{CollectorConfig, DataCollector, GameOutcome, SampleLabel, TrainingSample};
use crate::modules::{DecisionModule, ModuleAnalysis};

use super::events::{BrainEvent, EventSender};
use super::metrics::{BrainMetrics, BrainState, ModuleStatus};

// ============================================================================
// Cancellation
// ============================================================================

/// Cancels the in-flight module calls of the current decision cycle.
///
/// Cloneable and usable from any task while the brain is busy inside
/// `make_decision`. Cancellation only stops waiting for the calls; CPU
/// work a module already handed to a blocking thread runs to completion
/// and is discarded.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    generation: Arc<watch::Sender<u64>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            generation: Arc::new(tx),
        }
    }

    /// Cancel every call currently in flight. Calls started afterwards
    /// are unaffected.
    pub fn cancel(&self) {
        self.generation.send_modify(|g| *g = g.wrapping_add(1));
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

// ============================================================================
// Module calls
// ============================================================================

struct RegisteredModule {
    module: Arc<dyn DecisionModule>,
    /// `initialize` has run for the module since it was registered.
    initialized: bool,
    healthy: bool,
}

impl RegisteredModule {
    fn is_ready(&self) -> bool {
        self.initialized && self.healthy
    }
}

#[derive(Debug)]
enum CallOutcome {
    Completed(ModuleAnalysis),
    Failed(String),
    TimedOut,
    Cancelled,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one `analyze` call against the timeout and the cancel signal.
/// Returns the outcome and the wall time spent, in milliseconds.
async fn call_module(
    module: Arc<dyn DecisionModule>,
    state: &GameState,
    timeout: Duration,
    mut cancel: watch::Receiver<u64>,
) -> (CallOutcome, f64) {
    let started = Instant::now();
    let call = AssertUnwindSafe(module.analyze(state)).catch_unwind();

    let outcome = tokio::select! {
        result = tokio::time::timeout(timeout, call) => match result {
            Err(_) => CallOutcome::TimedOut,
            Ok(Err(panic)) => CallOutcome::Failed(format!("panicked: {}", panic_message(&*panic))),
            Ok(Ok(Err(e))) => CallOutcome::Failed(e.to_string()),
            Ok(Ok(Ok(analysis))) => CallOutcome::Completed(analysis),
        },
        Ok(()) = cancel.changed() => CallOutcome::Cancelled,
    };

    (outcome, started.elapsed().as_secs_f64() * 1000.0)
}

/// Run `initialize` with panics turned into errors.
async fn initialize_isolated(
    module: Arc<dyn DecisionModule>,
    config: ModuleConfig,
) -> ModuleResult<()> {
    let name = module.name().to_string();
    match AssertUnwindSafe(module.initialize(&config)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ModuleError::failed(
            name,
            format!("panicked: {}", panic_message(&*panic)),
        )),
    }
}

// ============================================================================
// Brain
// ============================================================================

/// Decision-fusion engine for one seat.
///
/// Mutating methods take `&mut self`; share a brain across tasks by
/// wrapping it in `tokio::sync::Mutex`. Use [`cancel_handle`](Self::cancel_handle)
/// to interrupt a cycle from outside the lock.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use ccg_brain::{Brain, BrainConfig, GameState, PlayerId, RuleModule};
///
/// # async fn run() -> ccg_brain::Result<()> {
/// let config = BrainConfig::preset("default").with_fallback(Some("rule"));
/// let mut brain = Brain::new(config)?;
/// brain.register_module(Arc::new(RuleModule::new()));
/// brain.initialize().await?;
///
/// let state = GameState::new(PlayerId::new(0), 4, Vec::new());
/// let decision = brain.make_decision(&state).await?;
/// println!("{} ({:.2})", decision.action, decision.confidence);
/// # Ok(())
/// # }
/// ```
pub struct Brain {
    config: BrainConfig,
    modules: FxHashMap<String, RegisteredModule>,
    cognitive: CognitiveLayer,
    fusion: FusionLayer,
    context: ContextManager,
    collector: DataCollector,
    metrics: BrainMetrics,
    initialized: bool,
    active: bool,
    events: Option<EventSender>,
    cancel: CancelHandle,
    last_update: DateTime<Utc>,
}

impl std::fmt::Debug for Brain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brain")
            .field("modules", &self.module_names())
            .field("initialized", &self.initialized)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Brain {
    /// Create a brain from a validated configuration.
    pub fn new(config: BrainConfig) -> Result<Self> {
        if let Err(e) = config.validate() {
            error!(error = %e, "rejected brain config");
            return Err(e);
        }
        Ok(Self {
            fusion: FusionLayer::new(config.fusion.adaptive.clone()),
            collector: DataCollector::new(CollectorConfig::from_learning(&config.learning)),
            config,
            modules: FxHashMap::default(),
            cognitive: CognitiveLayer::new(),
            context: ContextManager::new(),
            metrics: BrainMetrics::default(),
            initialized: false,
            active: false,
            events: None,
            cancel: CancelHandle::new(),
            last_update: Utc::now(),
        })
    }

    /// Send [`BrainEvent`]s to `sender`.
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    fn emit(&self, event: BrainEvent) {
        if let Some(tx) = &self.events {
            // A closed channel just means nobody is listening.
            let _ = tx.send(event);
        }
    }

    fn check_active(&self) -> Result<()> {
        if !self.initialized {
            return Err(BrainError::NotInitialized);
        }
        if !self.active {
            return Err(BrainError::NotActive);
        }
        Ok(())
    }

    fn check_fallback(&self, config: &BrainConfig) -> Result<()> {
        match &config.performance.fallback_module {
            Some(name) if !self.modules.contains_key(name) => {
                error!(module = %name, "fallback module is not registered");
                Err(BrainError::UnknownFallbackModule(name.clone()))
            }
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Initialize every registered module enabled in the configuration,
    /// concurrently. A module that fails to initialize is logged and
    /// marked unhealthy; the brain still starts.
    ///
    /// Fails if the configured fallback module is not registered.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            warn!("brain already initialized");
            return Ok(());
        }
        self.check_fallback(&self.config)?;

        let names: Vec<String> = self
            .module_names()
            .into_iter()
            .filter(|name| self.config.module(name).is_some_and(|c| c.enabled))
            .collect();
        self.initialize_modules(names).await;

        self.initialized = true;
        self.active = true;
        self.last_update = Utc::now();
        info!(modules = self.modules.len(), "brain initialized");
        Ok(())
    }

    /// (Re)initialize one registered module with its current config.
    /// Returns whether it is healthy afterwards.
    pub async fn initialize_module(&mut self, name: &str) -> bool {
        if !self.modules.contains_key(name) {
            return false;
        }
        self.initialize_modules(vec![name.to_string()]).await;
        self.modules.get(name).is_some_and(|entry| entry.healthy)
    }

    async fn initialize_modules(&mut self, names: Vec<String>) {
        let targets: Vec<(String, Arc<dyn DecisionModule>, ModuleConfig)> = names
            .into_iter()
            .filter_map(|name| {
                let module = Arc::clone(&self.modules.get(&name)?.module);
                let config = self.config.module(&name).cloned().unwrap_or_default();
                Some((name, module, config))
            })
            .collect();

        let results = join_all(
            targets
                .iter()
                .map(|(_, module, config)| initialize_isolated(Arc::clone(module), config.clone())),
        )
        .await;

        for ((name, _, _), result) in targets.into_iter().zip(results) {
            let healthy = match result {
                Ok(()) => {
                    debug!(module = %name, "module initialized");
                    true
                }
                Err(e) => {
                    warn!(module = %name, error = %e, "module failed to initialize");
                    self.metrics.module_mut(&name).record_failure(&e.to_string());
                    false
                }
            };
            if let Some(entry) = self.modules.get_mut(&name) {
                entry.initialized = true;
                entry.healthy = healthy;
            }
        }
    }

    /// Stop accepting decisions and shut every module down. In-flight
    /// module calls are cancelled.
    pub async fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        self.active = false;
        self.cancel.cancel();

        let modules: Vec<(String, Arc<dyn DecisionModule>)> = self
            .modules
            .iter()
            .map(|(name, entry)| (name.clone(), Arc::clone(&entry.module)))
            .collect();
        let results = join_all(modules.iter().map(|(_, m)| m.shutdown())).await;
        for ((name, _), result) in modules.iter().zip(results) {
            if let Err(e) = result {
                warn!(module = %name, error = %e, "module shutdown failed");
            }
        }
        for entry in self.modules.values_mut() {
            entry.initialized = false;
        }

        self.initialized = false;
        info!("brain shut down");
    }

    /// Stop accepting decisions without shutting modules down.
    pub fn pause(&mut self) {
        if self.active {
            self.active = false;
            info!("brain paused");
        }
    }

    pub fn resume(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(BrainError::NotInitialized);
        }
        if !self.active {
            self.active = true;
            info!("brain resumed");
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ask every module whether it is healthy and remember the answers.
    pub async fn health_check_all(&mut self) -> Vec<(String, bool)> {
        let modules: Vec<(String, Arc<dyn DecisionModule>)> = self
            .modules
            .iter()
            .map(|(name, entry)| (name.clone(), Arc::clone(&entry.module)))
            .collect();
        let results = join_all(modules.iter().map(|(_, m)| m.health_check())).await;

        let mut report: Vec<(String, bool)> = modules
            .into_iter()
            .map(|(name, _)| name)
            .zip(results)
            .collect();
        report.sort();
        for (name, healthy) in &report {
            if let Some(entry) = self.modules.get_mut(name) {
                if entry.healthy != *healthy {
                    info!(module = %name, healthy, "module health changed");
                }
                entry.healthy = *healthy;
            }
        }
        report
    }

    // ------------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------------

    /// Register a module under its own name, replacing any module with
    /// the same name. A module registered after [`initialize`](Self::initialize)
    /// needs [`initialize_module`](Self::initialize_module) before it can
    /// contribute.
    pub fn register_module(
        &mut self,
        module: Arc<dyn DecisionModule>,
    ) -> Option<Arc<dyn DecisionModule>> {
        let name = module.name().to_string();
        let previous = self.modules.insert(
            name.clone(),
            RegisteredModule {
                module,
                initialized: false,
                healthy: true,
            },
        );
        if previous.is_some() {
            warn!(module = %name, "module replaced");
        } else {
            info!(module = %name, "module registered");
        }
        previous.map(|entry| entry.module)
    }

    pub fn unregister_module(&mut self, name: &str) -> Option<Arc<dyn DecisionModule>> {
        let removed = self.modules.remove(name)?;
        info!(module = %name, "module unregistered");
        Some(removed.module)
    }

    pub fn module(&self, name: &str) -> Option<Arc<dyn DecisionModule>> {
        self.modules.get(name).map(|entry| Arc::clone(&entry.module))
    }

    /// Registered module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    // ------------------------------------------------------------------------
    // Decisions
    // ------------------------------------------------------------------------

    /// Run one decision cycle for `state`.
    ///
    /// Only lifecycle misuse fails: module problems end in a fallback
    /// decision, never an error.
    pub async fn make_decision(&mut self, state: &GameState) -> Result<Decision> {
        self.check_active()?;
        let started = Instant::now();

        self.context.update_context(state);
        let situation = self.cognitive.analyze(state, Some(&self.context));

        let sources = self.collect_candidates(state).await;
        let decision = if sources.is_empty() {
            self.fallback_decision(state, &situation).await
        } else {
            self.fusion.fuse(self.config.fusion.strategy, sources, &situation)
        };

        let compute_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let decision = decision.with_compute_time(compute_time_ms);

        if let Some(source) = decision.leading_source() {
            self.metrics.module_mut(&source.module).accepted_suggestions += 1;
        }
        self.metrics.record_decision(compute_time_ms);
        if self.config.learning.collect_data {
            self.context.record_decision(&decision, Some(&situation));
        }
        self.last_update = Utc::now();

        debug!(
            action = %decision.action,
            confidence = decision.confidence,
            method = %decision.fusion_method,
            compute_time_ms,
            "decision made"
        );
        self.emit(BrainEvent::DecisionMade {
            action: decision.action.clone(),
            confidence: decision.confidence,
            method: decision.fusion_method,
            compute_time_ms,
        });
        Ok(decision)
    }

    /// Weight for `name` in `state`: the first matching weight rule when
    /// dynamic weighting is on, otherwise the base weight.
    fn module_weight(&self, config: &ModuleConfig, state: &GameState) -> f64 {
        if self.config.fusion.dynamic_weighting {
            config.resolve_weight(state)
        } else {
            config.base_weight
        }
    }

    /// Ready, enabled and applicable modules with their weight, sorted by
    /// name. A panic while screening a module counts as a failed call.
    fn screen_modules(&mut self, state: &GameState) -> Vec<(String, Arc<dyn DecisionModule>, f64)> {
        let mut eligible = Vec::new();
        let mut panicked = Vec::new();
        for name in self.module_names() {
            let Some(entry) = self.modules.get(&name).filter(|entry| entry.is_ready()) else {
                continue;
            };
            let Some(config) = self.config.module(&name).filter(|c| c.enabled) else {
                continue;
            };
            let module = Arc::clone(&entry.module);
            let screened = std::panic::catch_unwind(AssertUnwindSafe(|| {
                module
                    .is_applicable(state)
                    .then(|| self.module_weight(config, state))
            }));
            match screened {
                Ok(Some(weight)) => eligible.push((name, module, weight)),
                Ok(None) => debug!(module = %name, "module not applicable"),
                Err(panic) => {
                    let reason = format!("panicked during screening: {}", panic_message(&*panic));
                    panicked.push((name, reason));
                }
            }
        }
        for (name, reason) in panicked {
            self.record_outcome(&name, CallOutcome::Failed(reason), 0.0);
        }
        eligible
    }

    async fn collect_candidates(&mut self, state: &GameState) -> Vec<DecisionSource> {
        let eligible = self.screen_modules(state);

        let timeout = self.config.performance.timeout();
        let outcomes = join_all(eligible.iter().map(|(_, module, _)| {
            call_module(Arc::clone(module), state, timeout, self.cancel.subscribe())
        }))
        .await;

        let mut sources = Vec::with_capacity(eligible.len());
        for ((name, _, weight), (outcome, latency_ms)) in eligible.into_iter().zip(outcomes) {
            let Some(analysis) = self.record_outcome(&name, outcome, latency_ms) else {
                continue;
            };
            match analysis.best() {
                Some(best) => sources.push(DecisionSource::new(name, best.clone(), weight)),
                None => debug!(module = %name, "module returned no suggestions"),
            }
        }
        sources
    }

    /// Update metrics and emit events for one call. Returns the analysis
    /// when the call completed.
    fn record_outcome(
        &mut self,
        name: &str,
        outcome: CallOutcome,
        latency_ms: f64,
    ) -> Option<ModuleAnalysis> {
        match outcome {
            CallOutcome::Completed(analysis) => {
                debug!(
                    module = %name,
                    latency_ms,
                    suggestions = analysis.suggestions.len(),
                    "module call completed"
                );
                self.metrics.module_mut(name).record_success(latency_ms);
                Some(analysis)
            }
            CallOutcome::TimedOut => {
                let timeout_ms = self.config.performance.timeout_ms;
                warn!(module = %name, timeout_ms, "module call timed out");
                self.metrics.timeouts += 1;
                self.metrics.module_mut(name).record_timeout();
                self.emit(BrainEvent::ModuleTimedOut {
                    module: name.to_string(),
                    timeout_ms,
                });
                None
            }
            CallOutcome::Failed(reason) => {
                warn!(module = %name, %reason, "module call failed");
                self.metrics.failures += 1;
                self.metrics.module_mut(name).record_failure(&reason);
                self.emit(BrainEvent::ModuleFailed {
                    module: name.to_string(),
                    reason,
                });
                None
            }
            CallOutcome::Cancelled => {
                info!(module = %name, "module call cancelled");
                self.metrics.module_mut(name).record_cancellation();
                None
            }
        }
    }

    /// No candidate survived: ask the fallback module, then settle for a
    /// low-confidence pass.
    async fn fallback_decision(
        &mut self,
        state: &GameState,
        situation: &SituationAnalysis,
    ) -> Decision {
        self.metrics.fallbacks += 1;

        let fallback = self
            .config
            .performance
            .fallback_module
            .clone()
            .and_then(|name| {
                let entry = self.modules.get(&name).filter(|entry| entry.initialized)?;
                Some((Arc::clone(&entry.module), name))
            });

        if let Some((module, name)) = fallback {
            let timeout = self.config.performance.timeout();
            let (outcome, latency_ms) =
                call_module(module, state, timeout, self.cancel.subscribe()).await;
            let decision = self
                .record_outcome(&name, outcome, latency_ms)
                .and_then(|analysis| self.fusion.from_fallback(&name, &analysis, situation));
            if let Some(decision) = decision {
                warn!(module = %name, "no candidates, using fallback module");
                self.emit(BrainEvent::FallbackUsed {
                    module: Some(name),
                    reason: "no module produced a candidate".into(),
                });
                return decision;
            }
        }

        let reason = "no module produced a usable suggestion";
        warn!("{}, passing", reason);
        self.emit(BrainEvent::FallbackUsed {
            module: None,
            reason: reason.into(),
        });
        Decision::safe_pass(reason).with_risk(RiskLevel::Medium)
    }

    /// Stop waiting for the module calls currently in flight.
    pub fn cancel_all(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    // ------------------------------------------------------------------------
    // Learning
    // ------------------------------------------------------------------------

    /// Attach what actually happened after `decision` to the context.
    /// No-op unless `learning.collect_data` is on.
    pub fn execute_action(&mut self, decision: &Decision, result_state: GameState) {
        if self.config.learning.collect_data {
            self.context.record_action_execution(decision, result_state);
        }
    }

    /// Move this game's decisions into the sample store and label them
    /// with the result. Returns how many samples were added.
    pub fn record_game_outcome(&mut self, outcome: &GameOutcome) -> usize {
        let added = self.collector.collect_from_context(&self.context);
        self.collector.label_game_outcome(outcome);
        info!(
            added,
            winner = %outcome.winner,
            total = self.collector.len(),
            "game outcome recorded"
        );
        added
    }

    /// Feed labelled samples to every trainable module. Returns how many
    /// modules learned; 0 unless both `learning.enabled` and
    /// `learning.online_learning` are on.
    pub async fn train(&self) -> usize {
        let learning = &self.config.learning;
        if !(learning.enabled && learning.online_learning) {
            return 0;
        }
        let batch: Vec<TrainingSample> = self
            .collector
            .samples()
            .filter(|s| s.label != SampleLabel::Neutral)
            .cloned()
            .collect();
        if batch.is_empty() {
            debug!("no labelled samples to train on");
            return 0;
        }

        let mut trained = 0;
        for name in self.module_names() {
            let Some(entry) = self.modules.get(&name) else {
                continue;
            };
            let Some(trainable) = entry.module.as_trainable() else {
                continue;
            };
            match trainable.learn(&batch).await {
                Ok(()) => {
                    debug!(module = %name, samples = batch.len(), "module trained");
                    trained += 1;
                }
                Err(e) => warn!(module = %name, error = %e, "module training failed"),
            }
        }
        info!(trained, samples = batch.len(), "training pass finished");
        trained
    }

    // ------------------------------------------------------------------------
    // Configuration and inspection
    // ------------------------------------------------------------------------

    /// Merge `patch` into the configuration.
    ///
    /// The merged config is validated before anything changes. On an
    /// initialized brain, modules whose settings the patch touches are
    /// re-initialized if enabled and shut down if disabled.
    pub async fn update_config(&mut self, patch: &BrainConfigPatch) -> Result<()> {
        let merged = self.config.merged(patch);
        if let Err(e) = merged.validate() {
            error!(error = %e, "rejected config update");
            return Err(e);
        }
        if self.initialized {
            self.check_fallback(&merged)?;
        }

        self.fusion = FusionLayer::new(merged.fusion.adaptive.clone());
        self.collector
            .set_config(CollectorConfig::from_learning(&merged.learning));
        self.config = merged;

        if self.initialized {
            let touched: Vec<String> = patch
                .modules
                .keys()
                .filter(|name| self.modules.contains_key(*name))
                .cloned()
                .collect();
            let (enable, disable): (Vec<String>, Vec<String>) = touched
                .into_iter()
                .partition(|name| self.config.module(name).is_some_and(|c| c.enabled));

            self.initialize_modules(enable).await;
            for name in disable {
                let Some(entry) = self.modules.get_mut(&name) else {
                    continue;
                };
                entry.initialized = false;
                if let Err(e) = entry.module.shutdown().await {
                    warn!(module = %name, error = %e, "module shutdown failed");
                }
            }
        }

        self.last_update = Utc::now();
        info!("brain config updated");
        self.emit(BrainEvent::ConfigUpdated);
        Ok(())
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    pub fn context(&self) -> &ContextManager {
        &self.context
    }

    pub fn collector(&self) -> &DataCollector {
        &self.collector
    }

    pub fn collector_mut(&mut self) -> &mut DataCollector {
        &mut self.collector
    }

    pub fn get_metrics(&self) -> BrainMetrics {
        self.metrics.clone()
    }

    pub fn get_state(&self) -> BrainState {
        let modules = self
            .modules
            .iter()
            .map(|(name, entry)| {
                let config = self.config.module(name);
                let status = ModuleStatus {
                    name: name.clone(),
                    enabled: config.is_some_and(|c| c.enabled),
                    healthy: entry.healthy,
                    current_weight: config.map_or(0.0, |c| c.base_weight),
                    statistics: entry.module.statistics(),
                    metrics: self.metrics.module_metrics.get(name).cloned().unwrap_or_default(),
                };
                (name.clone(), status)
            })
            .collect();

        BrainState {
            initialized: self.initialized,
            active: self.active,
            config: self.config.clone(),
            modules,
            metrics: self.metrics.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            last_update: self.last_update,
        }
    }

    /// Forget context and metrics, and reset every module.
    pub fn reset(&mut self) {
        self.context.clear();
        for entry in self.modules.values() {
            entry.module.reset();
        }
        self.metrics = BrainMetrics::default();
        self.last_update = Utc::now();
        info!("brain reset");
    }
}
