//! Named configuration presets.

use std::collections::BTreeMap;

use super::brain::{
    BrainConfig, CommunicationConfig, FusionConfig, FusionStrategy, LearningConfig,
    PerformanceConfig, PersonalityConfig, PersonalityPreset,
};
use super::merge::{BrainConfigPatch, ModuleConfigPatch};
use super::module::{ModuleConfig, WeightCondition};

/// Every preset name accepted by [`BrainConfig::preset`].
pub const PRESET_NAMES: &[&str] = &[
    "default",
    "aggressive",
    "conservative",
    "balanced",
    "adaptive",
    "llm_enhanced",
];

fn search_module() -> ModuleConfig {
    ModuleConfig::new(0.7)
        .with_rule(WeightCondition::SimpleSituation, 0.9)
        .with_rule(WeightCondition::LateGame, 0.8)
        .with_option("iterations", 1000)
        .with_option("exploration_constant", 1.414)
}

fn rule_module() -> ModuleConfig {
    ModuleConfig::new(0.3).with_rule(WeightCondition::EarlyGame, 0.5)
}

fn llm_module() -> ModuleConfig {
    ModuleConfig::disabled(0.5)
        .with_rule(WeightCondition::ComplexSituation, 0.7)
        .with_rule(WeightCondition::TeamMode, 0.6)
        .with_option("provider", "local")
        .with_option("temperature", 0.7)
        .with_option("max_tokens", 500)
}

pub(crate) fn default_config() -> BrainConfig {
    let mut modules = BTreeMap::new();
    modules.insert("mcts".to_string(), search_module());
    modules.insert("rule".to_string(), rule_module());
    modules.insert("llm".to_string(), llm_module());

    BrainConfig {
        personality: PersonalityConfig::preset(PersonalityPreset::Balanced),
        modules,
        fusion: FusionConfig::default(),
        communication: CommunicationConfig::default(),
        learning: LearningConfig::default(),
        performance: PerformanceConfig::default(),
    }
}

fn personality(
    preset: PersonalityPreset,
    [aggression, cooperation, risk_tolerance, chattiness, toxicity, adaptability]: [f64; 6],
) -> PersonalityConfig {
    PersonalityConfig {
        preset: Some(preset),
        aggression: Some(aggression),
        cooperation: Some(cooperation),
        risk_tolerance: Some(risk_tolerance),
        chattiness: Some(chattiness),
        toxicity: Some(toxicity),
        adaptability: Some(adaptability),
    }
}

fn aggressive() -> BrainConfig {
    default_config()
        .with_personality(personality(
            PersonalityPreset::Aggressive,
            [0.9, 0.4, 0.8, 0.7, 0.6, 0.5],
        ))
        .with_module(
            "mcts",
            ModuleConfig::new(0.6)
                .with_option("iterations", 800)
                .with_option("strategic_pass_enabled", false),
        )
}

fn conservative() -> BrainConfig {
    default_config()
        .with_personality(personality(
            PersonalityPreset::Conservative,
            [0.3, 0.8, 0.3, 0.3, 0.1, 0.6],
        ))
        .with_module(
            "mcts",
            ModuleConfig::new(0.8)
                .with_option("iterations", 1500)
                .with_option("strategic_pass_enabled", true),
        )
        .with_module("rule", ModuleConfig::new(0.5))
}

fn balanced() -> BrainConfig {
    default_config()
        .with_personality(personality(PersonalityPreset::Balanced, [0.5, 0.6, 0.5, 0.5, 0.3, 0.7]))
}

fn adaptive() -> BrainConfig {
    let mut config = default_config()
        .with_personality(personality(PersonalityPreset::Adaptive, [0.5, 0.5, 0.5, 0.5, 0.3, 0.9]))
        .with_strategy(FusionStrategy::Adaptive);
    config.fusion.dynamic_weighting = true;
    config.fusion.learning_rate = 0.05;
    config
}

fn llm_enhanced() -> BrainConfig {
    let mut config = balanced()
        .with_module(
            "llm",
            ModuleConfig::new(0.6)
                .with_rule(WeightCondition::ComplexSituation, 0.8)
                .with_rule(WeightCondition::TeamMode, 0.7)
                .with_rule(WeightCondition::Critical, 0.5)
                .with_option("provider", "local")
                .with_option("temperature", 0.7)
                .with_option("max_tokens", 500),
        )
        .with_module(
            "mcts",
            ModuleConfig::new(0.4)
                .with_rule(WeightCondition::Critical, 0.8)
                .with_rule(WeightCondition::SimpleSituation, 0.9),
        );
    config.learning.online_learning = true;
    config.learning.auto_update = true;
    config
}

impl BrainConfig {
    /// Look up a preset by name. Unknown names yield the default config.
    #[must_use]
    pub fn preset(name: &str) -> Self {
        match name {
            "aggressive" => aggressive(),
            "conservative" => conservative(),
            "balanced" => balanced(),
            "adaptive" => adaptive(),
            "llm_enhanced" => llm_enhanced(),
            _ => default_config(),
        }
    }

    /// Start from the personality's preset, then overlay the personality.
    #[must_use]
    pub fn from_personality(personality: PersonalityConfig) -> Self {
        let base = match personality.preset {
            Some(PersonalityPreset::Aggressive) => aggressive(),
            Some(PersonalityPreset::Conservative) => conservative(),
            Some(PersonalityPreset::Balanced) => balanced(),
            Some(PersonalityPreset::Adaptive) => adaptive(),
            None => default_config(),
        };
        base.merged(&BrainConfigPatch {
            personality: Some(personality),
            ..BrainConfigPatch::default()
        })
    }

    #[must_use]
    pub fn with_personality(mut self, personality: PersonalityConfig) -> Self {
        self.personality = personality;
        self
    }

    /// Overlay one module's settings without replacing the rest.
    #[must_use]
    pub fn with_module_patch(self, name: &str, patch: ModuleConfigPatch) -> Self {
        let mut modules = BTreeMap::new();
        modules.insert(name.to_string(), patch);
        self.merged(&BrainConfigPatch {
            modules,
            ..BrainConfigPatch::default()
        })
    }
}
