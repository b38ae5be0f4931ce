//! Configuration loading, presets and partial updates.

use ccg_brain::config::{
    FusionConfigPatch, ModuleConfigPatch, PerformanceConfigPatch, PRESET_NAMES,
};
use ccg_brain::{
    BrainConfig, BrainConfigPatch, BrainError, Card, FusionStrategy, GamePhase, GameState,
    ModuleConfig, PersonalityConfig, PersonalityPreset, PlayerId, Rank, Suit, WeightCondition,
};

const CONFIG_TOML: &str = r#"
[fusion]
strategy = "cascade"
learning_rate = 0.05

[performance]
timeout_ms = 250
fallback_module = "rule"

[modules.mcts]
enabled = true
base_weight = 0.6
weight_rules = [
    { condition = "critical", weight = 0.9 },
    { condition = "late_game", weight = 0.8 },
]

[modules.mcts.options]
iterations = 400
seed = 7

[modules.rule]
base_weight = 0.4
"#;

// =============================================================================
// TOML
// =============================================================================

#[test]
fn test_parse_toml_document() {
    let config = BrainConfig::from_toml_str(CONFIG_TOML).unwrap();
    assert_eq!(config.fusion.strategy, FusionStrategy::Cascade);
    assert_eq!(config.performance.timeout_ms, 250);
    assert_eq!(config.performance.fallback_module.as_deref(), Some("rule"));

    let mcts = config.module("mcts").unwrap();
    assert_eq!(mcts.weight_rules.len(), 2);
    assert_eq!(mcts.option_u64("iterations"), Some(400));

    let critical = GameState::new(PlayerId::new(0), 4, Vec::new()).with_phase(GamePhase::Critical);
    assert_eq!(mcts.resolve_weight(&critical), 0.9);

    // Unset sections keep their defaults.
    assert!(config.learning.collect_data);
    assert!(config.module("rule").unwrap().enabled);
}

#[test]
fn test_unknown_condition_is_a_parse_error() {
    let text = r#"
[modules.mcts]
base_weight = 0.5
weight_rules = [{ condition = "full_moon", weight = 0.9 }]
"#;
    let err = BrainConfig::from_toml_str(text).unwrap_err();
    assert!(matches!(err, BrainError::ConfigParse(_)));
    assert!(err.to_string().contains("full_moon"));
}

#[test]
fn test_toml_round_trip_keeps_rules_and_options() {
    let config = BrainConfig::from_toml_str(CONFIG_TOML).unwrap();
    let text = config.to_toml_string().unwrap();
    let back = BrainConfig::from_toml_str(&text).unwrap();

    let mcts = back.module("mcts").unwrap();
    assert_eq!(mcts.weight_rules[0].condition.name(), Some("critical"));
    assert_eq!(mcts.option_u64("seed"), Some(7));
    assert_eq!(back.fusion.learning_rate, 0.05);
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("ccg-brain-config-{}.toml", std::process::id()));
    std::fs::write(&path, CONFIG_TOML).unwrap();
    let config = BrainConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.performance.timeout_ms, 250);

    let missing = BrainConfig::load(std::env::temp_dir().join("ccg-brain-does-not-exist.toml"));
    assert!(matches!(missing, Err(BrainError::Io(_))));
}

#[test]
fn test_situation_rules_on_a_ten_card_solo_lead() {
    let hand = |n: u16| (0..n).map(|i| Card::new(i, Rank::new(3 + i as u8), Suit::Clubs));
    let state = GameState::new(PlayerId::new(0), 4, hand(10));

    let complex = ModuleConfig::new(0.2).with_rule(WeightCondition::ComplexSituation, 0.9);
    let simple = ModuleConfig::new(0.2).with_rule(WeightCondition::SimpleSituation, 0.9);
    assert_eq!(complex.resolve_weight(&state), 0.9);
    assert_eq!(simple.resolve_weight(&state), 0.2);

    // Down to four cards on a free lead the hand is simple and no longer complex.
    let short = GameState::new(PlayerId::new(0), 4, hand(4));
    assert_eq!(complex.resolve_weight(&short), 0.2);
    assert_eq!(simple.resolve_weight(&short), 0.9);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_no_enabled_module_is_invalid() {
    let mut config = BrainConfig::default();
    for module in config.modules.values_mut() {
        module.enabled = false;
    }
    assert!(matches!(config.validate(), Err(BrainError::InvalidConfig(_))));

    let zero_weight = BrainConfig {
        modules: [("only".to_string(), ModuleConfig::new(0.0))].into_iter().collect(),
        ..BrainConfig::default()
    };
    assert!(zero_weight.validate().is_err());
}

#[test]
fn test_every_violation_is_reported() {
    let mut config = BrainConfig::default().with_timeout_ms(0);
    config.personality.aggression = Some(1.5);
    config.fusion.learning_rate = -0.1;
    config.modules.insert(
        "bad".into(),
        ModuleConfig::new(0.5).with_rule(WeightCondition::TeamMode, 3.0),
    );

    let errors = config.validation_errors();
    assert_eq!(errors.len(), 4, "{:?}", errors);
    assert!(errors.iter().any(|e| e.contains("timeout")));
    assert!(errors.iter().any(|e| e.contains("aggression")));
    assert!(errors.iter().any(|e| e.contains("learning_rate")));
    assert!(errors.iter().any(|e| e.contains("team_mode")));
}

// =============================================================================
// Presets
// =============================================================================

#[test]
fn test_every_preset_is_valid() {
    for name in PRESET_NAMES {
        let config = BrainConfig::preset(name);
        assert!(config.validate().is_ok(), "preset {} is invalid", name);
    }
}

#[test]
fn test_personality_presets_differ() {
    let aggressive = PersonalityConfig::preset(PersonalityPreset::Aggressive);
    let conservative = PersonalityConfig::preset(PersonalityPreset::Conservative);
    let aggressive = BrainConfig::from_personality(aggressive);
    let conservative = BrainConfig::from_personality(conservative);
    assert!(aggressive.personality.aggression > conservative.personality.aggression);
}

// =============================================================================
// Patches
// =============================================================================

#[test]
fn test_patch_merges_field_by_field() {
    let base = BrainConfig::from_toml_str(CONFIG_TOML).unwrap();
    let patch = BrainConfigPatch::default()
        .module("mcts", ModuleConfigPatch::default().base_weight(0.3).option("seed", 99))
        .fusion(FusionConfigPatch {
            strategy: Some(FusionStrategy::Voting),
            ..FusionConfigPatch::default()
        })
        .performance(PerformanceConfigPatch {
            fallback_module: Some(None),
            ..PerformanceConfigPatch::default()
        });

    let merged = base.merged(&patch);
    let mcts = merged.module("mcts").unwrap();
    assert_eq!(mcts.base_weight, 0.3);
    assert_eq!(mcts.option_u64("seed"), Some(99));
    assert_eq!(mcts.option_u64("iterations"), Some(400));
    assert_eq!(mcts.weight_rules.len(), 2);
    assert_eq!(merged.fusion.strategy, FusionStrategy::Voting);
    assert_eq!(merged.fusion.learning_rate, 0.05);
    assert_eq!(merged.performance.fallback_module, None);
    assert_eq!(merged.performance.timeout_ms, 250);

    // The base is untouched.
    assert_eq!(base.module("mcts").unwrap().base_weight, 0.6);
}

#[test]
fn test_patch_from_toml() {
    let patch = BrainConfigPatch::from_toml_str(
        r#"
[modules.rule]
enabled = false

[fusion]
strategy = "adaptive"
"#,
    )
    .unwrap();
    let merged = BrainConfig::from_toml_str(CONFIG_TOML).unwrap().merged(&patch);
    assert!(!merged.module("rule").unwrap().enabled);
    assert_eq!(merged.module("rule").unwrap().base_weight, 0.4);
    assert_eq!(merged.fusion.strategy, FusionStrategy::Adaptive);
}
