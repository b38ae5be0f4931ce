//! Fusion inputs and the final decision.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cognitive::SituationAnalysis;
use crate::config::FusionStrategy;
use crate::core::{ActionKey, GameAction};
use crate::modules::suggestion::clamp_unit;
use crate::modules::ActionSuggestion;

/// One module's contribution to a decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionSource {
    pub module: String,
    pub suggestion: ActionSuggestion,
    /// 0-1, taken from the suggestion.
    pub confidence: f64,
    /// Effective weight after rule resolution, 0-1.
    pub weight: f64,
    pub reasoning: String,
}

impl DecisionSource {
    /// Build a source from a module's best suggestion. Weight and
    /// confidence are clamped to [0, 1].
    pub fn new(module: impl Into<String>, suggestion: ActionSuggestion, weight: f64) -> Self {
        Self {
            module: module.into(),
            confidence: clamp_unit(suggestion.confidence),
            weight: clamp_unit(weight),
            reasoning: suggestion.reasoning.clone(),
            suggestion,
        }
    }

    #[inline]
    pub fn action(&self) -> &GameAction {
        &self.suggestion.action
    }

    /// weight x confidence.
    #[inline]
    pub fn vote(&self) -> f64 {
        self.weight * self.confidence
    }

    /// Canonical ordering key, independent of arrival order.
    pub(crate) fn canonical(&self) -> (ActionKey, &str) {
        (self.action().key(), self.module.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Pass is low risk; otherwise a severe threat is high, a weak hand
    /// medium, anything else low.
    pub fn assess(action: &GameAction, situation: &SituationAnalysis) -> Self {
        if action.is_pass() {
            RiskLevel::Low
        } else if situation.max_threat_severity() > 0.8 {
            RiskLevel::High
        } else if situation.hand_strength < 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// How a decision was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMethod {
    WeightedAverage,
    Voting,
    Cascade,
    Adaptive,
    /// The fallback module's own suggestions.
    Fallback,
    /// Nothing produced a candidate; the safe default pass.
    Default,
}

impl From<FusionStrategy> for FusionMethod {
    fn from(strategy: FusionStrategy) -> Self {
        match strategy {
            FusionStrategy::WeightedAverage => FusionMethod::WeightedAverage,
            FusionStrategy::Voting => FusionMethod::Voting,
            FusionStrategy::Cascade => FusionMethod::Cascade,
            FusionStrategy::Adaptive => FusionMethod::Adaptive,
        }
    }
}

impl fmt::Display for FusionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FusionMethod::WeightedAverage => "weighted_average",
            FusionMethod::Voting => "voting",
            FusionMethod::Cascade => "cascade",
            FusionMethod::Adaptive => "adaptive",
            FusionMethod::Fallback => "fallback",
            FusionMethod::Default => "default",
        };
        f.write_str(name)
    }
}

/// The engine's committed answer for one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: GameAction,
    /// 0-1.
    pub confidence: f64,
    pub reasoning: String,
    /// Up to three other actions, distinct from `action` and each other.
    pub alternatives: Vec<GameAction>,
    pub sources: Vec<DecisionSource>,
    pub fusion_method: FusionMethod,
    pub risk_level: RiskLevel,
    pub expected_value: f64,
    pub timestamp: DateTime<Utc>,
    /// Wall time for the whole cycle (milliseconds).
    pub compute_time_ms: f64,
}

impl Decision {
    /// Low-confidence pass used when nothing else is available.
    pub fn safe_pass(reasoning: impl Into<String>) -> Self {
        Self {
            action: GameAction::Pass,
            confidence: SAFE_PASS_CONFIDENCE,
            reasoning: reasoning.into(),
            alternatives: Vec::new(),
            sources: Vec::new(),
            fusion_method: FusionMethod::Default,
            risk_level: RiskLevel::Low,
            expected_value: 0.0,
            timestamp: Utc::now(),
            compute_time_ms: 0.0,
        }
    }

    #[must_use]
    pub fn with_compute_time(mut self, ms: f64) -> Self {
        self.compute_time_ms = ms;
        self
    }

    #[must_use]
    pub fn with_risk(mut self, risk: RiskLevel) -> Self {
        self.risk_level = risk;
        self
    }

    /// Module whose suggestion matches the chosen action, if any.
    pub fn leading_source(&self) -> Option<&DecisionSource> {
        let key = self.action.key();
        self.sources.iter().find(|s| s.action().key() == key)
    }
}

/// Confidence of the safe default pass.
pub const SAFE_PASS_CONFIDENCE: f64 = 0.1;
