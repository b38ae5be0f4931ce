//! Engine-wide configuration.
//!
//! [`BrainConfig`] is loaded once, validated, and only changed through an
//! explicit update that revalidates the merged result. Every section is
//! `serde(default)` so a TOML file only needs the keys it overrides.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{BrainError, Result};

use super::module::ModuleConfig;

/// Personality preset names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityPreset {
    Aggressive,
    Conservative,
    #[default]
    Balanced,
    Adaptive,
}

/// Personality: a preset plus optional 0-1 trait overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityConfig {
    pub preset: Option<PersonalityPreset>,
    pub aggression: Option<f64>,
    pub cooperation: Option<f64>,
    pub risk_tolerance: Option<f64>,
    pub chattiness: Option<f64>,
    pub toxicity: Option<f64>,
    pub adaptability: Option<f64>,
}

impl PersonalityConfig {
    /// Preset with no trait overrides.
    pub fn preset(preset: PersonalityPreset) -> Self {
        Self {
            preset: Some(preset),
            ..Self::default()
        }
    }

    /// Named traits, unset ones omitted.
    pub fn traits(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("aggression", self.aggression),
            ("cooperation", self.cooperation),
            ("risk_tolerance", self.risk_tolerance),
            ("chattiness", self.chattiness),
            ("toxicity", self.toxicity),
            ("adaptability", self.adaptability),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }
}

/// How module candidates are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionStrategy {
    #[default]
    WeightedAverage,
    Voting,
    Cascade,
    Adaptive,
}

/// Coefficients for the adaptive strategy's complexity score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveTuning {
    /// Added per detected threat.
    pub threat_weight: f64,
    /// Added per detected opportunity.
    pub opportunity_weight: f64,
    /// Added once when team context is present.
    pub team_bonus: f64,
    /// Complexity above this uses weighted average.
    pub complexity_threshold: f64,
    /// Candidate count above this uses voting.
    pub voting_min_candidates: usize,
}

impl Default for AdaptiveTuning {
    fn default() -> Self {
        Self {
            threat_weight: 0.2,
            opportunity_weight: 0.1,
            team_bonus: 0.3,
            complexity_threshold: 0.7,
            voting_min_candidates: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub strategy: FusionStrategy,
    pub dynamic_weighting: bool,
    pub learning_rate: f64,
    pub adaptive: AdaptiveTuning,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            strategy: FusionStrategy::WeightedAverage,
            dynamic_weighting: true,
            learning_rate: 0.01,
            adaptive: AdaptiveTuning::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStyle {
    Subtle,
    #[default]
    Moderate,
    Obvious,
}

/// Table talk settings. Carried for the surrounding game; the engine only
/// validates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationConfig {
    pub enabled: bool,
    pub tactical_enabled: bool,
    pub signal_style: SignalStyle,
    pub social_enabled: bool,
    pub chat_frequency: f64,
    pub use_personality: bool,
    pub emotion_expression: bool,
}

impl Default for CommunicationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tactical_enabled: true,
            signal_style: SignalStyle::Moderate,
            social_enabled: true,
            chat_frequency: 0.5,
            use_personality: true,
            emotion_expression: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    #[default]
    All,
    HighQualityOnly,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStrategy {
    #[default]
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub enabled: bool,

    /// Keep decision history in the context manager.
    pub collect_data: bool,
    pub data_quality: DataQuality,

    /// Feed collected samples to trainable modules.
    pub online_learning: bool,

    /// e.g. "24h", "1w".
    pub update_interval: String,
    pub auto_update: bool,
    pub update_strategy: UpdateStrategy,
    pub enable_ab_test: bool,
    pub test_ratio: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collect_data: true,
            data_quality: DataQuality::All,
            online_learning: false,
            update_interval: "24h".into(),
            auto_update: false,
            update_strategy: UpdateStrategy::Conservative,
            enable_ab_test: false,
            test_ratio: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Budget for each module call, in milliseconds.
    pub timeout_ms: u64,

    /// Module consulted when no candidate survives a cycle.
    pub fallback_module: Option<String>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            fallback_module: Some("mcts".into()),
        }
    }
}

impl PerformanceConfig {
    #[must_use]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub personality: PersonalityConfig,

    /// Keyed by module name.
    pub modules: BTreeMap<String, ModuleConfig>,
    pub fusion: FusionConfig,
    pub communication: CommunicationConfig,
    pub learning: LearningConfig,
    pub performance: PerformanceConfig,
}

impl Default for BrainConfig {
    fn default() -> Self {
        super::presets::default_config()
    }
}

impl BrainConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: BrainConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Config for a module, if one is declared.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.get(name)
    }

    #[must_use]
    pub fn with_module(mut self, name: &str, config: ModuleConfig) -> Self {
        self.modules.insert(name.to_string(), config);
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: FusionStrategy) -> Self {
        self.fusion.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.performance.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, module: Option<&str>) -> Self {
        self.performance.fallback_module = module.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_collect_data(mut self, collect: bool) -> Self {
        self.learning.collect_data = collect;
        self
    }

    /// Sum of base weights over enabled modules.
    #[must_use]
    pub fn total_enabled_weight(&self) -> f64 {
        self.modules
            .values()
            .filter(|m| m.enabled)
            .map(|m| m.base_weight)
            .sum()
    }

    /// Check every constraint, reporting all violations at once.
    pub fn validate(&self) -> Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(BrainError::InvalidConfig(errors))
        }
    }

    /// Every constraint violation, empty when valid.
    #[must_use]
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let unit = |v: f64| (0.0..=1.0).contains(&v);

        if self.total_enabled_weight() <= 0.0 {
            errors.push("at least one module must be enabled with non-zero weight".to_string());
        }

        for (name, value) in self.personality.traits() {
            if !unit(value) {
                errors.push(format!("personality {name} must be between 0 and 1"));
            }
        }

        for (name, module) in &self.modules {
            if !unit(module.base_weight) {
                errors.push(format!("module {name} base_weight must be between 0 and 1"));
            }
            for rule in &module.weight_rules {
                if !unit(rule.weight) {
                    errors.push(format!(
                        "module {name} rule {} weight must be between 0 and 1",
                        rule.condition
                    ));
                }
            }
        }

        if !unit(self.fusion.learning_rate) {
            errors.push("fusion learning_rate must be between 0 and 1".to_string());
        }
        let tuning = &self.fusion.adaptive;
        for (name, value) in [
            ("threat_weight", tuning.threat_weight),
            ("opportunity_weight", tuning.opportunity_weight),
            ("team_bonus", tuning.team_bonus),
            ("complexity_threshold", tuning.complexity_threshold),
        ] {
            if !unit(value) {
                errors.push(format!("fusion adaptive {name} must be between 0 and 1"));
            }
        }

        if !unit(self.communication.chat_frequency) {
            errors.push("communication chat_frequency must be between 0 and 1".to_string());
        }
        if !unit(self.learning.test_ratio) {
            errors.push("learning test_ratio must be between 0 and 1".to_string());
        }

        if self.performance.timeout_ms == 0 {
            errors.push("performance timeout must be positive".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = BrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.performance.timeout_ms, 5000);
        assert_eq!(config.performance.fallback_module.as_deref(), Some("mcts"));
        assert_eq!(config.fusion.strategy, FusionStrategy::WeightedAverage);
    }

    #[test]
    fn test_zero_enabled_weight_rejected() {
        let mut config = BrainConfig::default();
        for module in config.modules.values_mut() {
            module.enabled = false;
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one module"));
    }

    #[test]
    fn test_all_violations_reported() {
        let mut config = BrainConfig::default().with_timeout_ms(0);
        config.personality.aggression = Some(1.5);
        config.learning.test_ratio = -0.1;
        match config.validate() {
            Err(BrainError::InvalidConfig(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_weight_out_of_range_rejected() {
        let mut config = BrainConfig::default();
        if let Some(rule) = config.modules.get_mut("rule") {
            rule.base_weight = 1.2;
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BrainConfig::default().with_strategy(FusionStrategy::Voting);
        let text = config.to_toml_string().unwrap();
        let back = BrainConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.fusion.strategy, FusionStrategy::Voting);
        assert_eq!(back.modules.len(), config.modules.len());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
            [fusion]
            strategy = "cascade"

            [modules.rule]
            base_weight = 0.4
            weight_rules = [{ condition = "late_game", weight = 0.6 }]
        "#;
        let config = BrainConfig::from_toml_str(text).unwrap();
        assert_eq!(config.fusion.strategy, FusionStrategy::Cascade);
        assert_eq!(config.fusion.learning_rate, 0.01);
        assert_eq!(config.performance.timeout_ms, 5000);
        assert_eq!(config.modules.len(), 1);
        assert!(config.modules["rule"].enabled);
    }

    #[test]
    fn test_unknown_condition_in_toml_fails() {
        let text = r#"
            [modules.rule]
            weight_rules = [{ condition = "rainy_day", weight = 0.6 }]
        "#;
        assert!(matches!(
            BrainConfig::from_toml_str(text),
            Err(BrainError::ConfigParse(_))
        ));
    }
}
