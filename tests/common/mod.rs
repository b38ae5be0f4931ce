//! Scripted modules and snapshot helpers shared by integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use ccg_brain::{
    ActionSuggestion, Card, DecisionModule, GameAction, GameState, ModuleAnalysis, ModuleConfig,
    ModuleCore, ModuleError, ModuleResult, ModuleStatistics, Play, PlayKind, PlayerId, Rank, Suit,
};

/// What a scripted module does when asked to analyze.
#[derive(Clone, Debug)]
pub enum Script {
    /// Suggest this action with this confidence.
    Suggest(GameAction, f64),
    /// Suggest several actions, best first.
    Ranked(Vec<(GameAction, f64)>),
    /// Sleep, then suggest.
    Slow(Duration, GameAction, f64),
    /// Return an analysis with no suggestions.
    Empty,
    Fail,
    Panic,
}

pub struct ScriptedModule {
    core: ModuleCore,
    script: Script,
    applicable: bool,
    calls: AtomicUsize,
}

impl ScriptedModule {
    pub fn new(name: &str, script: Script) -> Self {
        Self {
            core: ModuleCore::new(name),
            script,
            applicable: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn not_applicable(mut self) -> Self {
        self.applicable = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionModule for ScriptedModule {
    fn name(&self) -> &str {
        self.core.name()
    }

    async fn initialize(&self, config: &ModuleConfig) -> ModuleResult<()> {
        self.core.configure(config);
        Ok(())
    }

    async fn shutdown(&self) -> ModuleResult<()> {
        self.core.shutdown();
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.core.is_initialized()
    }

    async fn analyze(&self, _state: &GameState) -> ModuleResult<ModuleAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.clone();
        let name = self.name().to_string();
        self.core
            .run_analysis(move || async move {
                let suggest = |items: Vec<(GameAction, f64)>| {
                    let count = items.len();
                    let suggestions = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, (action, confidence))| {
                            let score = (count - i) as f64;
                            ActionSuggestion::new(action, score, confidence, "scripted")
                        })
                        .collect();
                    ModuleAnalysis::ranked(suggestions, "scripted")
                };
                match script {
                    Script::Suggest(action, confidence) => Ok(suggest(vec![(action, confidence)])),
                    Script::Ranked(items) => Ok(suggest(items)),
                    Script::Slow(delay, action, confidence) => {
                        tokio::time::sleep(delay).await;
                        Ok(suggest(vec![(action, confidence)]))
                    }
                    Script::Empty => Ok(ModuleAnalysis::ranked(Vec::new(), "nothing")),
                    Script::Fail => Err(ModuleError::failed(name, "scripted failure")),
                    Script::Panic => panic!("scripted panic"),
                }
            })
            .await
    }

    fn is_applicable(&self, _state: &GameState) -> bool {
        self.applicable
    }

    fn recommended_weight(&self, _state: &GameState) -> f64 {
        0.5
    }

    fn statistics(&self) -> ModuleStatistics {
        self.core.statistics()
    }

    fn reset(&self) {
        self.core.reset_statistics();
    }
}

pub fn card(id: u16, rank: u8) -> Card {
    Card::new(id, Rank::new(rank), Suit::Spades)
}

pub fn single(id: u16, rank: u8) -> GameAction {
    GameAction::play(Play::new([card(id, rank)], PlayKind::Single, Rank::new(rank)))
}

pub fn pair(id: u16, rank: u8) -> GameAction {
    let cards = [
        Card::new(id, Rank::new(rank), Suit::Spades),
        Card::new(id + 1, Rank::new(rank), Suit::Hearts),
    ];
    GameAction::play(Play::new(cards, PlayKind::Pair, Rank::new(rank)))
}

/// Leading snapshot with `hand_size` cards of ascending rank.
pub fn leading_state(hand_size: usize) -> GameState {
    let hand = (0..hand_size).map(|i| card(i as u16, 3 + (i % 13) as u8));
    GameState::new(PlayerId::new(0), 4, hand).with_opponent_hand_sizes(vec![10, 10, 10])
}
