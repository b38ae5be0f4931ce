//! Heuristic rule module.
//!
//! Scores every legal play by what it leaves behind: a smaller, better
//! structured remaining hand scores higher, bombs are held back until the
//! hand is short, and breaking a bomb apart is heavily penalized. The
//! style option shifts how much the play's own rank matters.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::cognitive::PlayStyle;
use crate::config::ModuleConfig;
use crate::core::{Card, GameAction, GameState, ModuleError, ModuleResult, Play, PlayKind, Rank};
use crate::modules::base::ModuleCore;
use crate::modules::stats::ModuleStatistics;
use crate::modules::suggestion::{ActionSuggestion, ModuleAnalysis};
use crate::modules::traits::DecisionModule;
use crate::rules::{PlayRules, StandardRules};

/// Registry name of the rule module.
pub const RULE_MODULE_NAME: &str = "rule";

/// Suggestions reported per analysis.
const TOP_SUGGESTIONS: usize = 8;

/// Options scoring within this much of the best are style tie-breaks.
const TIE_WINDOW: f64 = 10.0;

/// Confidence when the only option is to pass.
const FORCED_PASS_CONFIDENCE: f64 = 0.6;

/// Value of what remains in hand after a play. Higher is better.
pub fn remaining_hand_value(hand: &[Card]) -> f64 {
    match hand.len() {
        0 => return 1000.0,
        1 => return 500.0,
        _ => {}
    }

    let mut value = -10.0 * hand.len() as f64;
    let mut singles = 0usize;
    for (rank, cards) in StandardRules::rank_groups(hand) {
        if rank.is_joker() {
            continue;
        }
        value += match cards.len() {
            1 => {
                singles += 1;
                0.0
            }
            2 => 5.0,
            3 => 10.0,
            4..=6 => 20.0,
            _ => 30.0,
        };
    }
    value += 2.0 * hand.iter().filter(|c| c.rank.is_high()).count() as f64;
    if singles as f64 > hand.len() as f64 * 0.5 {
        value -= 20.0;
    }
    value
}

fn rank_counts(cards: &[Card]) -> BTreeMap<Rank, usize> {
    let mut counts = BTreeMap::new();
    for card in cards {
        *counts.entry(card.rank).or_insert(0) += 1;
    }
    counts
}

/// Heuristic score of playing `play` from `hand` against `last`.
pub fn score_play(hand: &[Card], play: &Play, last: Option<&Play>, style: PlayStyle) -> f64 {
    let remaining: Vec<Card> = hand
        .iter()
        .filter(|c| !play.cards.iter().any(|p| p.id == c.id))
        .copied()
        .collect();
    let left = remaining.len();
    let value = f64::from(play.value.value());

    let mut score = remaining_hand_value(&remaining);

    score += match style {
        PlayStyle::Aggressive => 2.0 * value,
        PlayStyle::Conservative => -value,
        PlayStyle::Balanced | PlayStyle::Adaptive => 0.5 * value,
    };

    score += 5.0 * play.len() as f64;

    if play.kind.is_bomb() {
        if left > 10 {
            score -= 30.0;
        } else if left <= 5 {
            score += 50.0;
        }
    }

    match last {
        None => {
            if play.value.value() <= 10 {
                score += 20.0;
            }
            if matches!(play.kind, PlayKind::Pair | PlayKind::Triple) {
                score += 15.0;
            }
        }
        Some(last) => {
            if value <= f64::from(last.value.value()) + 3.0 {
                score += 30.0;
            }
        }
    }

    let last_is_bomb = last.is_some_and(|l| l.kind.is_bomb());
    if play.cards.iter().any(|c| c.rank.is_joker()) {
        if left <= 3 {
            score += 40.0;
        } else if last_is_bomb {
            score += 30.0;
        } else {
            score -= 20.0;
        }
    }

    if left <= 3 {
        score += 10.0 * play.len() as f64;
    } else if left <= 6 {
        score += 5.0;
    }

    if play.kind == PlayKind::Single && left > 8 {
        score -= 10.0;
    }

    // Breaking up a bomb
    let before = rank_counts(hand);
    let after = rank_counts(&remaining);
    let original = before.get(&play.value).copied().unwrap_or(0);
    let kept = after.get(&play.value).copied().unwrap_or(0);

    if original >= 4 && kept > 0 && kept < 3 {
        score -= 150.0;
        if kept == 1 && last.is_none() {
            score -= 100.0;
        }
    }
    if original >= 4 {
        if !last_is_bomb {
            score -= match (play.kind, kept) {
                (PlayKind::Triple, 2) => 150.0,
                (PlayKind::Pair, 3) => 140.0,
                (PlayKind::Single, k) if k >= 3 => 160.0,
                _ => 0.0,
            };
        } else if !play.kind.is_bomb() && kept > 0 && kept < original {
            score -= 50.0;
        }
    }

    if left > 3 {
        score -= 30.0 * after.values().filter(|&&n| n == 1).count() as f64;
    }

    score
}

/// Among options scoring within [`TIE_WINDOW`] of the best, aggressive
/// play prefers the highest rank and conservative play the lowest.
/// Returns the index of the preferred option in `scored` (sorted best first).
fn style_preference(scored: &[(Play, f64)], style: PlayStyle) -> usize {
    let Some(top) = scored.first().map(|(_, s)| *s) else {
        return 0;
    };
    let window = scored.iter().take_while(|(_, s)| *s >= top - TIE_WINDOW).enumerate();
    match style {
        PlayStyle::Aggressive => window
            .max_by(|(ia, (a, _)), (ib, (b, _))| a.value.cmp(&b.value).then(ib.cmp(ia)))
            .map_or(0, |(i, _)| i),
        PlayStyle::Conservative => window
            .min_by(|(ia, (a, _)), (ib, (b, _))| a.value.cmp(&b.value).then(ia.cmp(ib)))
            .map_or(0, |(i, _)| i),
        PlayStyle::Balanced | PlayStyle::Adaptive => 0,
    }
}

/// Heuristic module built on [`score_play`].
pub struct RuleModule {
    core: ModuleCore,
    rules: Arc<dyn PlayRules>,
    style: RwLock<PlayStyle>,
}

impl Default for RuleModule {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleModule {
    pub fn new() -> Self {
        Self::with_rules(Arc::new(StandardRules))
    }

    pub fn with_rules(rules: Arc<dyn PlayRules>) -> Self {
        Self {
            core: ModuleCore::new(RULE_MODULE_NAME),
            rules,
            style: RwLock::new(PlayStyle::Balanced),
        }
    }

    pub fn style(&self) -> PlayStyle {
        *self.style.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn parse_style(config: &ModuleConfig) -> ModuleResult<PlayStyle> {
        let Some(value) = config.options.get("style") else {
            return Ok(PlayStyle::Balanced);
        };
        serde_json::from_value(value.clone()).map_err(|_| ModuleError::InvalidOption {
            module: RULE_MODULE_NAME.to_string(),
            option: "style".to_string(),
            reason: "expected aggressive, conservative, balanced or adaptive".to_string(),
        })
    }

    /// Score every legal play, best first.
    pub fn rank_plays(&self, state: &GameState) -> Vec<(Play, f64)> {
        let hand: Vec<Card> = state.hand.iter().copied().collect();
        let last = state.last_play.as_ref();
        let style = self.style();
        let mut scored: Vec<(Play, f64)> = self
            .rules
            .legal_plays(&hand, last)
            .into_iter()
            .map(|play| {
                let score = score_play(&hand, &play, last, style);
                (play, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let preferred = style_preference(&scored, style);
        if preferred > 0 {
            let choice = scored.remove(preferred);
            scored.insert(0, choice);
        }
        scored
    }

    fn analysis_for(&self, state: &GameState) -> ModuleAnalysis {
        let scored = self.rank_plays(state);
        if scored.is_empty() {
            if state.is_leading() {
                return ModuleAnalysis::ranked(Vec::new(), "no cards to lead");
            }
            let pass = ActionSuggestion::new(
                GameAction::Pass,
                0.0,
                FORCED_PASS_CONFIDENCE,
                "nothing beats the last play",
            );
            return ModuleAnalysis::ranked(vec![pass], "forced pass");
        }

        let count = scored.len();
        let suggestions: Vec<ActionSuggestion> = scored
            .into_iter()
            .take(TOP_SUGGESTIONS)
            .enumerate()
            .map(|(rank, (play, score))| {
                // Position in the ordering, so the style preference survives
                // re-sorting by score.
                let position = (TOP_SUGGESTIONS - rank) as f64;
                let confidence = 0.8 - 0.08 * rank as f64;
                let reasoning = format!("heuristic score {:.1} for {:?}", score, play.kind);
                ActionSuggestion::new(GameAction::Play(play), position, confidence, reasoning)
                    .with_expected_value(score)
            })
            .collect();

        ModuleAnalysis::ranked(suggestions, format!("scored {} legal plays", count))
            .with_metadata("style", format!("{:?}", self.style()).to_lowercase())
    }
}

#[async_trait]
impl DecisionModule for RuleModule {
    fn name(&self) -> &str {
        RULE_MODULE_NAME
    }

    fn description(&self) -> &str {
        "Heuristic scoring of legal plays"
    }

    async fn initialize(&self, config: &ModuleConfig) -> ModuleResult<()> {
        let style = Self::parse_style(config)?;
        *self.style.write().unwrap_or_else(PoisonError::into_inner) = style;
        self.core.configure(config);
        debug!(module = RULE_MODULE_NAME, ?style, "rule module initialized");
        Ok(())
    }

    async fn shutdown(&self) -> ModuleResult<()> {
        self.core.shutdown();
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.core.is_initialized()
    }

    async fn analyze(&self, state: &GameState) -> ModuleResult<ModuleAnalysis> {
        self.core
            .run_analysis(move || async move { Ok(self.analysis_for(state)) })
            .await
    }

    fn is_applicable(&self, _state: &GameState) -> bool {
        self.core.is_active()
    }

    fn recommended_weight(&self, state: &GameState) -> f64 {
        self.core.resolve_weight(state)
    }

    fn statistics(&self) -> ModuleStatistics {
        self.core.statistics()
    }

    fn reset(&self) {
        self.core.reset_statistics();
    }
}
