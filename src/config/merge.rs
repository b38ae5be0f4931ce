//! Partial configuration updates.
//!
//! A patch names only the fields it changes. Merging walks the config
//! field by field: a set patch field wins, an unset one keeps the base
//! value. Module `options` merge recursively as JSON objects; lists
//! (weight rules, JSON arrays) are replaced, never concatenated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::Result;

use super::brain::{
    AdaptiveTuning, BrainConfig, CommunicationConfig, DataQuality, FusionConfig, FusionStrategy,
    LearningConfig, PerformanceConfig, PersonalityConfig, SignalStyle, UpdateStrategy,
};
use super::module::{ModuleConfig, WeightRule};

/// Copy every `Some` field of `$patch` over the same field of `$target`.
macro_rules! overlay {
    ($target:expr, $patch:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $target.$field = value.clone();
            }
        )+
    };
}

/// Recursively merge `overlay` into `base`. Objects merge key by key; any
/// other value in `overlay` replaces the base value.
pub fn merge_json(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            merge_json_maps(base, overlay);
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

fn merge_json_maps(
    base: &mut serde_json::Map<String, serde_json::Value>,
    overlay: &serde_json::Map<String, serde_json::Value>,
) {
    for (key, value) in overlay {
        match base.get_mut(key) {
            Some(existing) => merge_json(existing, value),
            None => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfigPatch {
    pub enabled: Option<bool>,
    pub base_weight: Option<f64>,
    pub weight_rules: Option<Vec<WeightRule>>,
    pub options: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ModuleConfigPatch {
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn base_weight(mut self, weight: f64) -> Self {
        self.base_weight = Some(weight);
        self
    }

    #[must_use]
    pub fn weight_rules(mut self, rules: Vec<WeightRule>) -> Self {
        self.weight_rules = Some(rules);
        self
    }

    #[must_use]
    pub fn option(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.options
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn apply(&self, target: &mut ModuleConfig) {
        overlay!(target, self; enabled, base_weight, weight_rules);
        if let Some(options) = &self.options {
            merge_json_maps(&mut target.options, options);
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveTuningPatch {
    pub threat_weight: Option<f64>,
    pub opportunity_weight: Option<f64>,
    pub team_bonus: Option<f64>,
    pub complexity_threshold: Option<f64>,
    pub voting_min_candidates: Option<usize>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfigPatch {
    pub strategy: Option<FusionStrategy>,
    pub dynamic_weighting: Option<bool>,
    pub learning_rate: Option<f64>,
    pub adaptive: Option<AdaptiveTuningPatch>,
}

impl FusionConfigPatch {
    fn apply(&self, target: &mut FusionConfig) {
        overlay!(target, self; strategy, dynamic_weighting, learning_rate);
        if let Some(adaptive) = &self.adaptive {
            let tuning: &mut AdaptiveTuning = &mut target.adaptive;
            overlay!(tuning, adaptive;
                threat_weight, opportunity_weight, team_bonus,
                complexity_threshold, voting_min_candidates);
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationConfigPatch {
    pub enabled: Option<bool>,
    pub tactical_enabled: Option<bool>,
    pub signal_style: Option<SignalStyle>,
    pub social_enabled: Option<bool>,
    pub chat_frequency: Option<f64>,
    pub use_personality: Option<bool>,
    pub emotion_expression: Option<bool>,
}

impl CommunicationConfigPatch {
    fn apply(&self, target: &mut CommunicationConfig) {
        overlay!(target, self;
            enabled, tactical_enabled, signal_style, social_enabled,
            chat_frequency, use_personality, emotion_expression);
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfigPatch {
    pub enabled: Option<bool>,
    pub collect_data: Option<bool>,
    pub data_quality: Option<DataQuality>,
    pub online_learning: Option<bool>,
    pub update_interval: Option<String>,
    pub auto_update: Option<bool>,
    pub update_strategy: Option<UpdateStrategy>,
    pub enable_ab_test: Option<bool>,
    pub test_ratio: Option<f64>,
}

impl LearningConfigPatch {
    fn apply(&self, target: &mut LearningConfig) {
        overlay!(target, self;
            enabled, collect_data, data_quality, online_learning, update_interval,
            auto_update, update_strategy, enable_ab_test, test_ratio);
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfigPatch {
    pub timeout_ms: Option<u64>,
    /// `Some(None)` clears the fallback module.
    pub fallback_module: Option<Option<String>>,
}

impl PerformanceConfigPatch {
    fn apply(&self, target: &mut PerformanceConfig) {
        overlay!(target, self; timeout_ms, fallback_module);
    }
}

/// Partial [`BrainConfig`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfigPatch {
    /// Set traits override; unset traits keep the base value.
    pub personality: Option<PersonalityConfig>,
    /// Per-module patches. Unknown names add a new module.
    pub modules: BTreeMap<String, ModuleConfigPatch>,
    pub fusion: Option<FusionConfigPatch>,
    pub communication: Option<CommunicationConfigPatch>,
    pub learning: Option<LearningConfigPatch>,
    pub performance: Option<PerformanceConfigPatch>,
}

impl BrainConfigPatch {
    /// Parse a patch from TOML.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    #[must_use]
    pub fn module(mut self, name: &str, patch: ModuleConfigPatch) -> Self {
        self.modules.insert(name.to_string(), patch);
        self
    }

    #[must_use]
    pub fn fusion(mut self, patch: FusionConfigPatch) -> Self {
        self.fusion = Some(patch);
        self
    }

    #[must_use]
    pub fn learning(mut self, patch: LearningConfigPatch) -> Self {
        self.learning = Some(patch);
        self
    }

    #[must_use]
    pub fn performance(mut self, patch: PerformanceConfigPatch) -> Self {
        self.performance = Some(patch);
        self
    }
}

impl BrainConfig {
    /// Copy of this config with `patch` merged in. Does not validate.
    #[must_use]
    pub fn merged(&self, patch: &BrainConfigPatch) -> BrainConfig {
        let mut config = self.clone();

        if let Some(personality) = &patch.personality {
            let target = &mut config.personality;
            let merged = PersonalityConfig {
                preset: personality.preset.or(target.preset),
                aggression: personality.aggression.or(target.aggression),
                cooperation: personality.cooperation.or(target.cooperation),
                risk_tolerance: personality.risk_tolerance.or(target.risk_tolerance),
                chattiness: personality.chattiness.or(target.chattiness),
                toxicity: personality.toxicity.or(target.toxicity),
                adaptability: personality.adaptability.or(target.adaptability),
            };
            *target = merged;
        }

        for (name, module_patch) in &patch.modules {
            let target = config.modules.entry(name.clone()).or_default();
            module_patch.apply(target);
        }

        if let Some(fusion) = &patch.fusion {
            fusion.apply(&mut config.fusion);
        }
        if let Some(communication) = &patch.communication {
            communication.apply(&mut config.communication);
        }
        if let Some(learning) = &patch.learning {
            learning.apply(&mut config.learning);
        }
        if let Some(performance) = &patch.performance {
            performance.apply(&mut config.performance);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_json_leaf_wins() {
        let mut base = json!({"a": 1, "nested": {"x": 1, "y": 2}, "list": [1, 2, 3]});
        let overlay = json!({"nested": {"y": 20, "z": 30}, "list": [9]});
        merge_json(&mut base, &overlay);
        assert_eq!(
            base,
            json!({"a": 1, "nested": {"x": 1, "y": 20, "z": 30}, "list": [9]})
        );
    }

    #[test]
    fn test_merge_json_scalar_replaces_object() {
        let mut base = json!({"a": {"b": 1}});
        merge_json(&mut base, &json!({"a": 5}));
        assert_eq!(base, json!({"a": 5}));
    }

    #[test]
    fn test_module_patch_keeps_unset_fields() {
        let base = BrainConfig::default();
        let patch = BrainConfigPatch::default()
            .module("mcts", ModuleConfigPatch::default().option("iterations", 50));
        let merged = base.merged(&patch);

        let mcts = &merged.modules["mcts"];
        assert_eq!(mcts.option_u64("iterations"), Some(50));
        assert_eq!(mcts.option_f64("exploration_constant"), Some(1.414));
        assert_eq!(mcts.base_weight, 0.7);
        assert_eq!(mcts.weight_rules.len(), 2);
        // Untouched modules survive.
        assert!(merged.modules.contains_key("rule"));
        assert!(merged.modules.contains_key("llm"));
    }

    #[test]
    fn test_weight_rules_replace() {
        let base = BrainConfig::default();
        let patch = BrainConfigPatch::default()
            .module("mcts", ModuleConfigPatch::default().weight_rules(Vec::new()));
        let merged = base.merged(&patch);
        assert!(merged.modules["mcts"].weight_rules.is_empty());
    }

    #[test]
    fn test_new_module_from_patch() {
        let base = BrainConfig::default();
        let patch = BrainConfigPatch::default()
            .module("pattern", ModuleConfigPatch::default().base_weight(0.2));
        let merged = base.merged(&patch);
        assert_eq!(merged.modules["pattern"].base_weight, 0.2);
        assert!(merged.modules["pattern"].enabled);
    }

    #[test]
    fn test_nested_sections_merge_field_by_field() {
        let base = BrainConfig::default();
        let patch = BrainConfigPatch::default()
            .fusion(FusionConfigPatch {
                adaptive: Some(AdaptiveTuningPatch {
                    team_bonus: Some(0.5),
                    ..AdaptiveTuningPatch::default()
                }),
                ..FusionConfigPatch::default()
            })
            .performance(PerformanceConfigPatch {
                fallback_module: Some(None),
                ..PerformanceConfigPatch::default()
            });
        let merged = base.merged(&patch);
        assert_eq!(merged.fusion.adaptive.team_bonus, 0.5);
        assert_eq!(merged.fusion.adaptive.threat_weight, 0.2);
        assert_eq!(merged.fusion.learning_rate, 0.01);
        assert_eq!(merged.performance.fallback_module, None);
        assert_eq!(merged.performance.timeout_ms, 5000);
    }

    #[test]
    fn test_patch_from_toml() {
        let patch = BrainConfigPatch::from_toml_str(
            r#"
            [learning]
            online_learning = true

            [modules.rule]
            options = { style = "aggressive" }
            "#,
        )
        .unwrap();
        let merged = BrainConfig::default().merged(&patch);
        assert!(merged.learning.online_learning);
        assert!(merged.learning.collect_data);
        assert_eq!(merged.modules["rule"].option_str("style"), Some("aggressive"));
        assert_eq!(merged.modules["rule"].base_weight, 0.3);
    }
}
