//! Turning module candidates into a [`Decision`].

use chrono::Utc;
use rustc_hash::FxHashSet;

use crate::cognitive::SituationAnalysis;
use crate::config::{AdaptiveTuning, FusionStrategy};
use crate::core::GameAction;
use crate::modules::ModuleAnalysis;

use super::decision::{Decision, DecisionSource, FusionMethod, RiskLevel};
use super::policy::{
    weighted_confidence, Adaptive, Cascade, Fused, FusionPolicy, Voting, WeightedAverage,
};

/// Alternatives reported per decision.
pub const MAX_ALTERNATIVES: usize = 3;

/// Weight recorded for the fallback module's source.
const FALLBACK_WEIGHT: f64 = 1.0;

/// Pure fusion: candidates in, decision out. Holds no per-call state.
#[derive(Clone, Debug, Default)]
pub struct FusionLayer {
    adaptive: Adaptive,
}

impl FusionLayer {
    pub fn new(tuning: AdaptiveTuning) -> Self {
        Self {
            adaptive: Adaptive::new(tuning),
        }
    }

    pub fn tuning(&self) -> &AdaptiveTuning {
        &self.adaptive.tuning
    }

    /// Combine `sources` with `strategy`.
    ///
    /// The result does not depend on the order of `sources`. An empty
    /// candidate list yields the safe default pass.
    pub fn fuse(
        &self,
        strategy: FusionStrategy,
        mut sources: Vec<DecisionSource>,
        situation: &SituationAnalysis,
    ) -> Decision {
        sources.sort_by(|a, b| a.canonical().cmp(&b.canonical()));

        let fused = match strategy {
            FusionStrategy::WeightedAverage => WeightedAverage.fuse(&sources),
            FusionStrategy::Voting => Voting.fuse(&sources),
            FusionStrategy::Cascade => Cascade.fuse(&sources),
            FusionStrategy::Adaptive => self.adaptive.fuse(&sources, situation),
        };
        let Some(Fused {
            action,
            confidence,
            reasoning,
        }) = fused
        else {
            return Decision::safe_pass("no module produced a suggestion")
                .with_risk(RiskLevel::Medium);
        };

        let method = FusionMethod::from(strategy);
        Decision {
            alternatives: Self::alternatives(&action, &sources),
            risk_level: RiskLevel::assess(&action, situation),
            expected_value: weighted_confidence(&sources),
            reasoning: format!("{}: {}", method, reasoning),
            action,
            confidence,
            sources,
            fusion_method: method,
            timestamp: Utc::now(),
            compute_time_ms: 0.0,
        }
    }

    /// Decision built directly from the fallback module's suggestions:
    /// the first is the action, the rest are alternatives. `None` when the
    /// module suggested nothing.
    pub fn from_fallback(
        &self,
        module: &str,
        analysis: &ModuleAnalysis,
        situation: &SituationAnalysis,
    ) -> Option<Decision> {
        let (best, rest) = analysis.suggestions.split_first()?;
        let source = DecisionSource::new(module, best.clone(), FALLBACK_WEIGHT);

        let chosen = best.action.key();
        let mut seen = FxHashSet::default();
        seen.insert(chosen);
        let alternatives = rest
            .iter()
            .filter(|s| seen.insert(s.action.key()))
            .map(|s| s.action.clone())
            .take(MAX_ALTERNATIVES)
            .collect();

        Some(Decision {
            action: best.action.clone(),
            confidence: source.confidence,
            reasoning: format!("fallback {}: {}", module, best.reasoning),
            alternatives,
            risk_level: RiskLevel::assess(&best.action, situation),
            expected_value: best.expected_value.unwrap_or(source.confidence),
            sources: vec![source],
            fusion_method: FusionMethod::Fallback,
            timestamp: Utc::now(),
            compute_time_ms: 0.0,
        })
    }

    /// Other candidate actions ranked by vote, deduplicated by canonical
    /// key and excluding the chosen action.
    fn alternatives(chosen: &GameAction, sources: &[DecisionSource]) -> Vec<GameAction> {
        let mut ranked: Vec<&DecisionSource> = sources.iter().collect();
        ranked.sort_by(|a, b| {
            b.vote()
                .total_cmp(&a.vote())
                .then_with(|| a.canonical().cmp(&b.canonical()))
        });

        let mut seen = FxHashSet::default();
        seen.insert(chosen.key());
        ranked
            .into_iter()
            .filter(|s| seen.insert(s.action().key()))
            .map(|s| s.action().clone())
            .take(MAX_ALTERNATIVES)
            .collect()
    }
}
