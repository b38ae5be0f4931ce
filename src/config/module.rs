//! Per-module configuration and weight rules.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{BrainError, GamePhase, GameState};

/// Hand size above which a position has enough options to be "complex".
const COMPLEX_HAND: usize = 5;

/// Hand size below which a free lead is "simple".
const SIMPLE_HAND: usize = 5;

/// User-supplied weight-rule predicate.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&GameState) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(&GameState) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn test(&self, state: &GameState) -> bool {
        (self.0)(state)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Situation a weight rule applies to.
///
/// Named conditions parse from their snake_case names; anything else is a
/// configuration error. `Custom` only exists in code and cannot be
/// serialized.
#[derive(Clone, Debug)]
pub enum WeightCondition {
    EarlyGame,
    MidGame,
    LateGame,
    Critical,
    TeamMode,
    SoloMode,
    SimpleSituation,
    ComplexSituation,
    Custom(Predicate),
}

impl WeightCondition {
    /// Does the condition hold for this snapshot?
    #[must_use]
    pub fn matches(&self, state: &GameState) -> bool {
        match self {
            WeightCondition::EarlyGame => state.phase == GamePhase::Early,
            WeightCondition::MidGame => state.phase == GamePhase::Middle,
            WeightCondition::LateGame => state.phase == GamePhase::Late,
            WeightCondition::Critical => state.phase == GamePhase::Critical,
            WeightCondition::TeamMode => state.team_mode,
            WeightCondition::SoloMode => !state.team_mode,
            WeightCondition::SimpleSituation => is_simple_situation(state),
            WeightCondition::ComplexSituation => is_complex_situation(state),
            WeightCondition::Custom(predicate) => predicate.test(state),
        }
    }

    /// Config name, `None` for custom predicates.
    #[must_use]
    pub const fn name(&self) -> Option<&'static str> {
        Some(match self {
            WeightCondition::EarlyGame => "early_game",
            WeightCondition::MidGame => "mid_game",
            WeightCondition::LateGame => "late_game",
            WeightCondition::Critical => "critical",
            WeightCondition::TeamMode => "team_mode",
            WeightCondition::SoloMode => "solo_mode",
            WeightCondition::SimpleSituation => "simple_situation",
            WeightCondition::ComplexSituation => "complex_situation",
            WeightCondition::Custom(_) => return None,
        })
    }
}

/// Few cards left and a free lead.
#[must_use]
pub fn is_simple_situation(state: &GameState) -> bool {
    state.hand_size() < SIMPLE_HAND && state.last_play.is_none()
}

/// Many options, or partners to consider.
///
/// Not the complement of [`is_simple_situation`]: a five-card free lead
/// is neither, a big team hand is both complex and never simple.
#[must_use]
pub fn is_complex_situation(state: &GameState) -> bool {
    state.hand_size() > COMPLEX_HAND || state.team_mode
}

impl FromStr for WeightCondition {
    type Err = BrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "early_game" => WeightCondition::EarlyGame,
            "mid_game" => WeightCondition::MidGame,
            "late_game" => WeightCondition::LateGame,
            "critical" => WeightCondition::Critical,
            "team_mode" => WeightCondition::TeamMode,
            "solo_mode" => WeightCondition::SoloMode,
            "simple_situation" => WeightCondition::SimpleSituation,
            "complex_situation" => WeightCondition::ComplexSituation,
            other => return Err(BrainError::UnknownCondition(other.to_string())),
        })
    }
}

impl fmt::Display for WeightCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("custom"))
    }
}

impl Serialize for WeightCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_str(name),
            None => Err(serde::ser::Error::custom(
                "custom weight conditions cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for WeightCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Weight override applied when its condition holds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeightRule {
    pub condition: WeightCondition,
    pub weight: f64,
}

impl WeightRule {
    pub fn new(condition: WeightCondition, weight: f64) -> Self {
        Self { condition, weight }
    }
}

/// Configuration for one decision module.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub enabled: bool,

    /// Weight used when no rule matches.
    pub base_weight: f64,

    /// Checked in order; the first matching rule wins.
    pub weight_rules: Vec<WeightRule>,

    /// Module-specific settings.
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_weight: 0.5,
            weight_rules: Vec::new(),
            options: serde_json::Map::new(),
        }
    }
}

impl ModuleConfig {
    /// Enabled module with the given base weight.
    pub fn new(base_weight: f64) -> Self {
        Self {
            base_weight,
            ..Self::default()
        }
    }

    /// Disabled module with the given base weight.
    pub fn disabled(base_weight: f64) -> Self {
        Self {
            enabled: false,
            base_weight,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rule(mut self, condition: WeightCondition, weight: f64) -> Self {
        self.weight_rules.push(WeightRule::new(condition, weight));
        self
    }

    #[must_use]
    pub fn with_option(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// Effective weight for a snapshot: first matching rule, else base.
    #[must_use]
    pub fn resolve_weight(&self, state: &GameState) -> f64 {
        self.weight_rules
            .iter()
            .find(|rule| rule.condition.matches(state))
            .map_or(self.base_weight, |rule| rule.weight)
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(serde_json::Value::as_u64)
    }

    pub fn option_f64(&self, key: &str) -> Option<f64> {
        self.options.get(key).and_then(serde_json::Value::as_f64)
    }

    pub fn option_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(serde_json::Value::as_bool)
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(serde_json::Value::as_str)
    }
}
