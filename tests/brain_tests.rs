//! Orchestrator integration tests with scripted modules.

mod common;

use std::sync::Arc;
use std::time::Duration;

use ccg_brain::brain::event_channel;
use ccg_brain::config::{FusionConfigPatch, LearningConfigPatch, Predicate};
use ccg_brain::fusion::SAFE_PASS_CONFIDENCE;
use ccg_brain::learning::SampleLabel;
use ccg_brain::{
    Brain, BrainConfig, BrainConfigPatch, BrainEvent, DecisionModule, FusionMethod,
    FusionStrategy, GameAction, GameOutcome, GamePhase, ModuleConfig, PlayerId, RiskLevel,
    RuleModule, SearchModule, WeightCondition,
};

use common::{leading_state, pair, single, Script, ScriptedModule};

fn base_config() -> BrainConfig {
    BrainConfig::default()
        .with_module("mcts", ModuleConfig::disabled(0.7))
        .with_module("rule", ModuleConfig::disabled(0.3))
        .with_fallback(None)
}

async fn brain_with(config: BrainConfig, modules: Vec<Arc<ScriptedModule>>) -> Brain {
    let mut brain = Brain::new(config).unwrap();
    for module in modules {
        brain.register_module(module);
    }
    brain.initialize().await.unwrap();
    brain
}

// =============================================================================
// End-to-End
// =============================================================================

#[tokio::test]
async fn test_single_module_decides_under_every_strategy() {
    for strategy in [
        FusionStrategy::WeightedAverage,
        FusionStrategy::Voting,
        FusionStrategy::Cascade,
        FusionStrategy::Adaptive,
    ] {
        let low_card = single(0, 3);
        let config = base_config()
            .with_module("search", ModuleConfig::new(0.8))
            .with_strategy(strategy);
        let script = Script::Suggest(low_card.clone(), 0.85);
        let module = Arc::new(ScriptedModule::new("search", script));
        let mut brain = brain_with(config, vec![module]).await;

        let decision = brain.make_decision(&leading_state(9)).await.unwrap();
        assert_eq!(decision.action, low_card, "strategy {:?}", strategy);
        assert_eq!(decision.risk_level, RiskLevel::Low);
        assert_eq!(decision.fusion_method, FusionMethod::from(strategy));
        assert_eq!(decision.sources.len(), 1);
        assert!((decision.sources[0].weight - 0.8).abs() < 1e-9);
        assert!(decision.alternatives.is_empty());
    }
}

#[tokio::test]
async fn test_weight_rules_resolve_per_snapshot() {
    let config = base_config().with_module(
        "a",
        ModuleConfig::new(0.4)
            .with_rule(WeightCondition::Critical, 0.9)
            .with_rule(WeightCondition::LateGame, 0.6),
    );
    let module = Arc::new(ScriptedModule::new("a", Script::Suggest(single(0, 5), 0.7)));
    let mut brain = brain_with(config, vec![module]).await;

    let early = brain.make_decision(&leading_state(9)).await.unwrap();
    assert!((early.sources[0].weight - 0.4).abs() < 1e-9);

    let critical = leading_state(9).with_phase(GamePhase::Critical);
    let decision = brain.make_decision(&critical).await.unwrap();
    assert!((decision.sources[0].weight - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn test_static_weighting_ignores_rules() {
    let config = base_config().with_module(
        "a",
        ModuleConfig::new(0.4).with_rule(WeightCondition::Critical, 0.9),
    );
    let module = Arc::new(ScriptedModule::new("a", Script::Suggest(single(0, 5), 0.7)));
    let mut brain = brain_with(config, vec![module]).await;
    let patch = BrainConfigPatch::default().fusion(FusionConfigPatch {
        dynamic_weighting: Some(false),
        ..FusionConfigPatch::default()
    });
    brain.update_config(&patch).await.unwrap();

    let critical = leading_state(9).with_phase(GamePhase::Critical);
    let decision = brain.make_decision(&critical).await.unwrap();
    assert!((decision.sources[0].weight - 0.4).abs() < 1e-9);
}

// =============================================================================
// Failure Isolation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_slow_module_times_out_without_blocking_others() {
    let config = base_config()
        .with_module("fast", ModuleConfig::new(0.5))
        .with_module("slow", ModuleConfig::new(0.5))
        .with_timeout_ms(50);
    let fast = Arc::new(ScriptedModule::new("fast", Script::Suggest(single(0, 4), 0.6)));
    let slow = Arc::new(ScriptedModule::new(
        "slow",
        Script::Slow(Duration::from_secs(10), single(1, 9), 0.99),
    ));
    let (tx, mut rx) = event_channel();
    let mut brain = Brain::new(config).unwrap().with_events(tx);
    brain.register_module(fast);
    brain.register_module(slow.clone());
    brain.initialize().await.unwrap();

    let started = tokio::time::Instant::now();
    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));

    assert_eq!(decision.action, single(0, 4));
    assert_eq!(decision.sources.len(), 1);
    assert_eq!(slow.calls(), 1);

    let metrics = brain.get_metrics();
    assert_eq!(metrics.timeouts, 1);
    assert_eq!(metrics.module_metrics["slow"].timeouts, 1);
    assert_eq!(metrics.module_metrics["fast"].successes, 1);
    assert!(matches!(
        rx.recv().await,
        Some(BrainEvent::ModuleTimedOut { module, timeout_ms: 50 }) if module == "slow"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_all_modules_time_out_yields_safe_pass() {
    let config = base_config()
        .with_module("slow", ModuleConfig::new(0.5))
        .with_timeout_ms(20);
    let slow = Arc::new(ScriptedModule::new(
        "slow",
        Script::Slow(Duration::from_secs(5), single(1, 9), 0.9),
    ));
    let mut brain = brain_with(config, vec![slow]).await;

    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.action, GameAction::Pass);
    assert_eq!(decision.confidence, SAFE_PASS_CONFIDENCE);
    assert_eq!(decision.fusion_method, FusionMethod::Default);
    assert_eq!(brain.get_metrics().fallbacks, 1);
}

#[tokio::test]
async fn test_panicking_module_is_contained() {
    let config = base_config()
        .with_module("ok", ModuleConfig::new(0.3))
        .with_module("boom", ModuleConfig::new(0.9));
    let ok = Arc::new(ScriptedModule::new("ok", Script::Suggest(pair(0, 7), 0.5)));
    let boom = Arc::new(ScriptedModule::new("boom", Script::Panic));
    let mut brain = brain_with(config, vec![ok, boom]).await;

    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.action, pair(0, 7));

    let metrics = brain.get_metrics();
    let boom_metrics = &metrics.module_metrics["boom"];
    assert_eq!(boom_metrics.failures, 1);
    assert!(boom_metrics.last_error.as_deref().unwrap().contains("scripted panic"));

    // Still usable after the panic.
    assert!(brain.make_decision(&leading_state(9)).await.is_ok());
}

#[tokio::test]
async fn test_panicking_weight_rule_only_excludes_its_module() {
    let exploding = ModuleConfig::new(0.9).with_rule(
        WeightCondition::Custom(Predicate::new(|_| panic!("rule exploded"))),
        0.5,
    );
    let config = base_config()
        .with_module("ok", ModuleConfig::new(0.3))
        .with_module("boom", exploding);
    let ok = Arc::new(ScriptedModule::new("ok", Script::Suggest(single(0, 4), 0.6)));
    let boom = Arc::new(ScriptedModule::new("boom", Script::Suggest(single(1, 14), 0.9)));
    let (tx, mut rx) = event_channel();
    let mut brain = Brain::new(config).unwrap().with_events(tx);
    brain.register_module(ok);
    brain.register_module(boom.clone());
    brain.initialize().await.unwrap();

    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.action, single(0, 4));
    assert_eq!(boom.calls(), 0);

    let metrics = brain.get_metrics();
    assert_eq!(metrics.failures, 1);
    assert!(metrics.module_metrics["boom"]
        .last_error
        .as_deref()
        .unwrap()
        .contains("rule exploded"));
    assert!(matches!(
        rx.try_recv().unwrap(),
        BrainEvent::ModuleFailed { module, .. } if module == "boom"
    ));
}

#[tokio::test]
async fn test_late_module_waits_for_initialize_module() {
    let config = base_config()
        .with_module("early", ModuleConfig::new(0.3))
        .with_module("late", ModuleConfig::new(0.9));
    let early = Arc::new(ScriptedModule::new("early", Script::Suggest(single(0, 4), 0.6)));
    let mut brain = brain_with(config, vec![early]).await;

    let late = Arc::new(ScriptedModule::new("late", Script::Suggest(single(1, 9), 0.8)));
    brain.register_module(late.clone());

    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.action, single(0, 4));
    assert_eq!(late.calls(), 0);
    assert_eq!(brain.get_metrics().failures, 0);

    assert!(brain.initialize_module("late").await);
    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.action, single(1, 9));
    assert_eq!(late.calls(), 1);
}

#[tokio::test]
async fn test_inapplicable_and_empty_modules_contribute_nothing() {
    let config = base_config()
        .with_module("skip", ModuleConfig::new(0.9))
        .with_module("empty", ModuleConfig::new(0.9))
        .with_module("real", ModuleConfig::new(0.1));
    let skip =
        Arc::new(ScriptedModule::new("skip", Script::Suggest(single(0, 14), 1.0)).not_applicable());
    let empty = Arc::new(ScriptedModule::new("empty", Script::Empty));
    let real = Arc::new(ScriptedModule::new("real", Script::Suggest(single(1, 6), 0.4)));
    let mut brain = brain_with(config, vec![skip.clone(), empty, real]).await;

    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.action, single(1, 6));
    assert_eq!(skip.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_resolves_in_flight_calls() {
    let config = base_config().with_module("slow", ModuleConfig::new(0.5));
    let slow = Arc::new(ScriptedModule::new(
        "slow",
        Script::Slow(Duration::from_secs(3), single(0, 9), 0.9),
    ));
    let mut brain = brain_with(config, vec![slow]).await;
    let handle = brain.cancel_handle();

    let state = leading_state(9);
    let (decision, ()) = tokio::join!(brain.make_decision(&state), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    });

    let decision = decision.unwrap();
    assert_eq!(decision.action, GameAction::Pass);
    assert_eq!(brain.get_metrics().module_metrics["slow"].cancellations, 1);

    // A later cycle is not affected by the earlier cancel.
    brain.cancel_all();
    let next = brain.make_decision(&state).await.unwrap();
    assert_eq!(next.action, single(0, 9));
}

// =============================================================================
// Fallback Ladder
// =============================================================================

#[tokio::test]
async fn test_fallback_module_used_verbatim() {
    let config = base_config()
        .with_module("primary", ModuleConfig::new(0.9))
        .with_module("backup", ModuleConfig::new(0.1))
        .with_fallback(Some("backup"));
    let primary = Arc::new(ScriptedModule::new("primary", Script::Fail));
    let backup = Arc::new(
        ScriptedModule::new(
            "backup",
            Script::Ranked(vec![(single(0, 3), 0.3), (single(1, 4), 0.2), (single(0, 3), 0.1)]),
        )
        .not_applicable(),
    );
    let (tx, mut rx) = event_channel();
    let mut brain = Brain::new(config).unwrap().with_events(tx);
    brain.register_module(primary);
    brain.register_module(backup.clone());
    brain.initialize().await.unwrap();

    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.fusion_method, FusionMethod::Fallback);
    assert_eq!(decision.action, single(0, 3));
    assert_eq!(decision.alternatives, vec![single(1, 4)]);
    assert!((decision.confidence - 0.3).abs() < 1e-9);
    assert_eq!(backup.calls(), 1);

    let mut saw_fallback = false;
    while let Ok(event) = rx.try_recv() {
        if let BrainEvent::FallbackUsed { module, .. } = event {
            assert_eq!(module.as_deref(), Some("backup"));
            saw_fallback = true;
        }
    }
    assert!(saw_fallback);
}

#[tokio::test]
async fn test_failing_fallback_yields_safe_pass() {
    let config = base_config()
        .with_module("primary", ModuleConfig::new(0.9))
        .with_module("backup", ModuleConfig::new(0.1))
        .with_fallback(Some("backup"));
    let primary = Arc::new(ScriptedModule::new("primary", Script::Fail));
    let backup = Arc::new(ScriptedModule::new("backup", Script::Fail));
    let mut brain = brain_with(config, vec![primary, backup]).await;

    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.action, GameAction::Pass);
    assert_eq!(decision.confidence, SAFE_PASS_CONFIDENCE);
    assert_eq!(decision.risk_level, RiskLevel::Medium);
    assert_eq!(brain.get_metrics().failures, 3);
}

// =============================================================================
// Built-in Modules
// =============================================================================

#[tokio::test]
async fn test_builtin_modules_play_a_legal_card() {
    let config = BrainConfig::default()
        .with_module(
            "mcts",
            ModuleConfig::new(0.7).with_option("iterations", 200).with_option("seed", 9),
        )
        .with_module("rule", ModuleConfig::new(0.3));
    let mut brain = Brain::new(config).unwrap();
    brain.register_module(Arc::new(SearchModule::new()));
    brain.register_module(Arc::new(RuleModule::new()));
    brain.initialize().await.unwrap();

    let state = leading_state(9);
    let decision = brain.make_decision(&state).await.unwrap();
    assert!(!decision.action.is_pass());
    assert!(decision
        .action
        .cards()
        .iter()
        .all(|card| state.hand.contains(card)));
    assert_eq!(decision.sources.len(), 2);
}

// =============================================================================
// Learning
// =============================================================================

#[tokio::test]
async fn test_game_outcome_and_training() {
    let config = base_config()
        .with_module("mcts", ModuleConfig::new(0.7).with_option("iterations", 50))
        .with_module("rule", ModuleConfig::new(0.3));
    let mut brain = Brain::new(config).unwrap();
    let search = Arc::new(SearchModule::new());
    brain.register_module(search.clone());
    brain.register_module(Arc::new(RuleModule::new()));
    brain.initialize().await.unwrap();

    // Nothing to learn from yet, and online learning is off by default.
    assert_eq!(brain.train().await, 0);

    for hand in [9, 8, 7] {
        let decision = brain.make_decision(&leading_state(hand)).await.unwrap();
        brain.execute_action(&decision, leading_state(hand - 1));
    }
    assert!(brain.context().history().iter().all(|r| r.execution.is_some()));

    let added = brain.record_game_outcome(&GameOutcome::new(PlayerId::new(0)));
    assert_eq!(added, 3);
    assert_eq!(brain.collector().positive_samples().len(), 3);
    assert!(brain.collector().samples().all(|s| s.label == SampleLabel::Positive));
    assert_eq!(brain.record_game_outcome(&GameOutcome::new(PlayerId::new(0))), 0);

    let patch = BrainConfigPatch::default().learning(LearningConfigPatch {
        online_learning: Some(true),
        ..LearningConfigPatch::default()
    });
    brain.update_config(&patch).await.unwrap();
    let before = search.aggression();
    assert_eq!(brain.train().await, 1);
    assert_ne!(search.aggression(), before);
}

#[tokio::test]
async fn test_reset_clears_context_and_metrics() {
    let config = base_config().with_module("a", ModuleConfig::new(0.5));
    let a = Arc::new(ScriptedModule::new("a", Script::Suggest(single(0, 5), 0.5)));
    let mut brain = brain_with(config, vec![a.clone()]).await;
    brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(brain.context().statistics().total_decisions, 1);

    brain.reset();
    assert_eq!(brain.context().statistics().total_decisions, 0);
    assert_eq!(brain.get_metrics().total_decisions, 0);
    assert_eq!(a.statistics().total_calls, 0);
}

#[tokio::test]
async fn test_unregister_and_lookup() {
    let config = base_config().with_module("a", ModuleConfig::new(0.5));
    let mut brain = brain_with(
        config,
        vec![Arc::new(ScriptedModule::new("a", Script::Suggest(single(0, 5), 0.5)))],
    )
    .await;

    assert_eq!(brain.module_names(), vec!["a".to_string()]);
    assert!(brain.module("a").is_some());
    assert!(brain.unregister_module("a").is_some());
    assert!(brain.module("a").is_none());
    assert!(brain.unregister_module("a").is_none());

    let decision = brain.make_decision(&leading_state(9)).await.unwrap();
    assert_eq!(decision.action, GameAction::Pass);
}
