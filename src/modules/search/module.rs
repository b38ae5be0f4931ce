//! Search-based decision module.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ModuleConfig;
use crate::core::{GameAction, GamePhase, GameState, ModuleError, ModuleResult, SeededRng};
use crate::learning::{SampleLabel, TrainingSample};
use crate::modules::base::ModuleCore;
use crate::modules::stats::ModuleStatistics;
use crate::modules::suggestion::{ActionSuggestion, ModuleAnalysis};
use crate::modules::traits::{DecisionModule, Trainable};
use crate::rules::{PlayRules, StandardRules};

use super::bandit::Bandit;
use super::config::SearchConfig;
use super::rollout::Rollout;

/// Registry name of the search module.
pub const SEARCH_MODULE_NAME: &str = "mcts";

/// Suggestions reported per analysis.
const TOP_SUGGESTIONS: usize = 5;

/// Confidence reported when there is nothing to search.
const NO_OPTION_CONFIDENCE: f64 = 0.1;

/// Monte-Carlo search over our legal plays.
///
/// Each analysis runs a UCB1 bandit with one arm per candidate action
/// (every legal play, plus pass when following) and scores arms by random
/// playouts. The CPU work runs on the blocking pool.
pub struct SearchModule {
    core: ModuleCore,
    rules: Arc<dyn PlayRules>,
    search: RwLock<SearchConfig>,
    aggression: Mutex<f64>,
    calls: AtomicU64,
}

impl Default for SearchModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchModule {
    /// Search module using [`StandardRules`].
    pub fn new() -> Self {
        Self::with_rules(Arc::new(StandardRules))
    }

    pub fn with_rules(rules: Arc<dyn PlayRules>) -> Self {
        let search = SearchConfig::default();
        Self {
            core: ModuleCore::new(SEARCH_MODULE_NAME),
            rules,
            aggression: Mutex::new(search.aggression),
            search: RwLock::new(search),
            calls: AtomicU64::new(0),
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        self.search.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Current rollout bias toward shedding big combinations.
    pub fn aggression(&self) -> f64 {
        *self.aggression.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Candidate actions: every legal play, plus pass when following.
    pub fn candidates(rules: &dyn PlayRules, state: &GameState) -> Vec<GameAction> {
        let hand: Vec<_> = state.hand.iter().copied().collect();
        let mut actions: Vec<GameAction> = rules
            .legal_plays(&hand, state.last_play.as_ref())
            .into_iter()
            .map(GameAction::Play)
            .collect();
        if !state.is_leading() {
            actions.push(GameAction::Pass);
        }
        actions
    }

    /// Run the bandit to completion. Pure given `seed`.
    pub fn run_search(
        rules: &dyn PlayRules,
        state: &GameState,
        config: &SearchConfig,
        aggression: f64,
        seed: u64,
    ) -> Bandit {
        let mut bandit = Bandit::new(Self::candidates(rules, state));
        if bandit.arms.is_empty() {
            return bandit;
        }

        let mut rng = SeededRng::new(seed);
        for _ in 0..config.iterations {
            let arm = bandit.select(config.exploration_constant);
            let reward = Rollout::new(rules, &mut rng, aggression, config.max_rollout_turns)
                .run(state, &bandit.arms[arm].action);
            bandit.update(arm, reward);
        }
        bandit
    }

    fn analysis_from(bandit: &Bandit, config: &SearchConfig) -> ModuleAnalysis {
        let total = bandit.visits.max(1) as f64;
        let suggestions: Vec<ActionSuggestion> = bandit
            .ranked()
            .into_iter()
            .take(TOP_SUGGESTIONS)
            .map(|arm| {
                let mean = arm.mean_reward();
                ActionSuggestion::new(
                    arm.action.clone(),
                    arm.visits as f64 / total,
                    mean,
                    format!(
                        "{} visited in {} of {} rollouts (mean reward {:.2})",
                        arm.action, arm.visits, bandit.visits, mean
                    ),
                )
                .with_expected_value(mean)
            })
            .collect();

        ModuleAnalysis::ranked(
            suggestions,
            format!(
                "searched {} candidates with {} rollouts",
                bandit.arms.len(),
                bandit.visits
            ),
        )
        .with_metadata("iterations", config.iterations)
        .with_metadata("exploration_constant", config.exploration_constant)
        .with_metadata("candidates", bandit.arms.len())
    }
}

#[async_trait]
impl DecisionModule for SearchModule {
    fn name(&self) -> &str {
        SEARCH_MODULE_NAME
    }

    fn description(&self) -> &str {
        "Monte-Carlo search over legal plays"
    }

    async fn initialize(&self, config: &ModuleConfig) -> ModuleResult<()> {
        let search = SearchConfig::from_module_config(SEARCH_MODULE_NAME, config)?;
        info!(
            module = SEARCH_MODULE_NAME,
            iterations = search.iterations,
            exploration_constant = search.exploration_constant,
            "search module initialized"
        );
        *self.aggression.lock().unwrap_or_else(PoisonError::into_inner) = search.aggression;
        *self.search.write().unwrap_or_else(PoisonError::into_inner) = search;
        self.core.configure(config);
        Ok(())
    }

    async fn shutdown(&self) -> ModuleResult<()> {
        self.core.shutdown();
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.core.is_initialized()
    }

    async fn analyze(&self, state: &GameState) -> ModuleResult<ModuleAnalysis> {
        self.core
            .run_analysis(move || async move {
                let config = self.search_config();
                let aggression = self.aggression();
                let seed = config
                    .seed
                    .wrapping_add(self.calls.fetch_add(1, Ordering::Relaxed));

                let rules = Arc::clone(&self.rules);
                let snapshot = state.clone();
                let search = config.clone();
                let bandit = tokio::task::spawn_blocking(move || {
                    Self::run_search(rules.as_ref(), &snapshot, &search, aggression, seed)
                })
                .await
                .map_err(|e| ModuleError::Join {
                    module: SEARCH_MODULE_NAME.to_string(),
                    reason: e.to_string(),
                })?;

                if bandit.arms.is_empty() {
                    let pass = ActionSuggestion::new(
                        GameAction::Pass,
                        0.0,
                        NO_OPTION_CONFIDENCE,
                        "no playable cards",
                    );
                    return Ok(ModuleAnalysis::ranked(vec![pass], "nothing to search"));
                }

                debug!(
                    module = SEARCH_MODULE_NAME,
                    candidates = bandit.arms.len(),
                    rollouts = bandit.visits,
                    "search finished"
                );
                Ok(Self::analysis_from(&bandit, &config))
            })
            .await
    }

    fn is_applicable(&self, _state: &GameState) -> bool {
        self.core.is_active()
    }

    /// Rule-resolved weight, raised near the end of a hand and at critical
    /// moments. Capped at 1.
    fn recommended_weight(&self, state: &GameState) -> f64 {
        let base = self.core.resolve_weight(state);
        if state.hand_size() < 5 {
            (base * 1.2).min(1.0)
        } else if state.phase == GamePhase::Critical {
            (base * 1.3).min(1.0)
        } else {
            base
        }
    }

    fn statistics(&self) -> ModuleStatistics {
        self.core.statistics()
    }

    fn reset(&self) {
        self.core.reset_statistics();
        self.calls.store(0, Ordering::Relaxed);
        let initial = self.search_config().aggression;
        *self.aggression.lock().unwrap_or_else(PoisonError::into_inner) = initial;
    }

    fn as_trainable(&self) -> Option<&dyn Trainable> {
        Some(self)
    }
}

#[async_trait]
impl Trainable for SearchModule {
    /// Nudge the rollout bias toward what won. A winning multi-card play
    /// raises aggression, a winning single or pass lowers it; losing
    /// samples push the other way.
    async fn learn(&self, samples: &[TrainingSample]) -> ModuleResult<()> {
        let rate = self.search_config().learning_rate;
        let mut aggression = self.aggression.lock().unwrap_or_else(PoisonError::into_inner);
        for sample in samples {
            let shed_many = sample.action.cards().len() > 1;
            let target = match (sample.label, shed_many) {
                (SampleLabel::Positive, true) | (SampleLabel::Negative, false) => 1.0,
                (SampleLabel::Positive, false) | (SampleLabel::Negative, true) => 0.0,
                (SampleLabel::Neutral, _) => continue,
            };
            let step = (rate * sample.weight).clamp(0.0, 1.0);
            *aggression = (*aggression + step * (target - *aggression)).clamp(0.0, 1.0);
        }
        debug!(
            module = SEARCH_MODULE_NAME,
            aggression = *aggression,
            samples = samples.len(),
            "learned"
        );
        Ok(())
    }
}
