//! Decision module contract.
//!
//! A module is a pluggable backend that looks at a [`GameState`] and
//! proposes scored actions. The orchestrator owns modules behind
//! `Arc<dyn DecisionModule>` and calls them concurrently, so every method
//! takes `&self`; modules keep their mutable state behind locks.

use async_trait::async_trait;

use crate::config::ModuleConfig;
use crate::core::{GameAction, GameState, ModuleResult};
use crate::learning::TrainingSample;

use super::stats::ModuleStatistics;
use super::suggestion::{ActionSuggestion, ModuleAnalysis};

/// Default number of suggestions scanned by `evaluate` and `explain`.
pub const EVALUATE_DEPTH: usize = 10;

/// Score returned by `evaluate` for actions the module did not consider.
pub const UNRANKED_SCORE: f64 = 0.5;

/// Pluggable decision backend.
///
/// ## Implementation Notes
///
/// - `analyze` must tolerate being dropped mid-flight: the orchestrator
///   races it against a timer and stops polling on timeout
/// - invalid domain input is reported as a low-confidence suggestion, not
///   an error; errors are for the module itself being unable to work
/// - `is_applicable` is called before every `analyze` and must be cheap
///   and free of side effects
#[async_trait]
pub trait DecisionModule: Send + Sync {
    /// Registry name, matching the key in `BrainConfig::modules`.
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        ""
    }

    /// Apply configuration and get ready to analyze.
    async fn initialize(&self, config: &ModuleConfig) -> ModuleResult<()>;

    async fn shutdown(&self) -> ModuleResult<()>;

    async fn health_check(&self) -> bool;

    /// Analyze a snapshot and rank candidate actions.
    async fn analyze(&self, state: &GameState) -> ModuleResult<ModuleAnalysis>;

    /// Top `top_k` suggestions.
    async fn suggest(
        &self,
        state: &GameState,
        top_k: usize,
    ) -> ModuleResult<Vec<ActionSuggestion>> {
        let mut analysis = self.analyze(state).await?;
        analysis.suggestions.truncate(top_k);
        Ok(analysis.suggestions)
    }

    /// Score for a specific action. Actions outside the module's top
    /// suggestions get [`UNRANKED_SCORE`].
    async fn evaluate(&self, state: &GameState, action: &GameAction) -> ModuleResult<f64> {
        let key = action.key();
        let suggestions = self.suggest(state, EVALUATE_DEPTH).await?;
        Ok(suggestions
            .iter()
            .find(|s| s.action.key() == key)
            .map_or(UNRANKED_SCORE, |s| s.score))
    }

    /// Human-readable rationale for an action.
    async fn explain(&self, state: &GameState, action: &GameAction) -> ModuleResult<String> {
        let key = action.key();
        let suggestions = self.suggest(state, EVALUATE_DEPTH).await?;
        Ok(suggestions
            .into_iter()
            .find(|s| s.action.key() == key)
            .map_or_else(
                || format!("{} did not consider {}", self.name(), key),
                |s| s.reasoning,
            ))
    }

    /// Should the orchestrator ask this module about `state` at all?
    fn is_applicable(&self, _state: &GameState) -> bool {
        true
    }

    /// Weight the module would like for `state`, 0-1.
    fn recommended_weight(&self, state: &GameState) -> f64;

    fn statistics(&self) -> ModuleStatistics;

    /// Clear statistics and any learned state.
    fn reset(&self);

    /// Learning capability, if the module has one.
    fn as_trainable(&self) -> Option<&dyn Trainable> {
        None
    }
}

/// Optional capability: learn from labelled samples.
#[async_trait]
pub trait Trainable: Send + Sync {
    async fn learn(&self, samples: &[TrainingSample]) -> ModuleResult<()>;
}
