//! What a module hands back to the orchestrator.

use serde::{Deserialize, Serialize};

use crate::core::GameAction;

/// One scored action proposed by a single module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionSuggestion {
    pub action: GameAction,

    /// Module-specific score; only comparable within one module.
    pub score: f64,

    /// 0-1.
    pub confidence: f64,

    pub reasoning: String,

    pub expected_value: Option<f64>,
}

impl ActionSuggestion {
    /// Create a suggestion. Confidence is clamped to [0, 1].
    pub fn new(
        action: GameAction,
        score: f64,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            action,
            score,
            confidence: clamp_unit(confidence),
            reasoning: reasoning.into(),
            expected_value: None,
        }
    }

    #[must_use]
    pub fn with_expected_value(mut self, value: f64) -> Self {
        self.expected_value = Some(value);
        self
    }
}

/// A module's full response to one snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleAnalysis {
    /// Best first.
    pub suggestions: Vec<ActionSuggestion>,

    /// 0-1.
    pub confidence: f64,

    pub reasoning: String,

    /// Wall time spent analyzing (milliseconds).
    pub compute_time_ms: f64,

    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ModuleAnalysis {
    /// Build an analysis from suggestions, ranking them by score. Overall
    /// confidence is that of the best suggestion.
    pub fn ranked(mut suggestions: Vec<ActionSuggestion>, reasoning: impl Into<String>) -> Self {
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        let confidence = suggestions.first().map_or(0.0, |s| s.confidence);
        Self {
            suggestions,
            confidence,
            reasoning: reasoning.into(),
            compute_time_ms: 0.0,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Highest-ranked suggestion.
    #[must_use]
    pub fn best(&self) -> Option<&ActionSuggestion> {
        self.suggestions.first()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
