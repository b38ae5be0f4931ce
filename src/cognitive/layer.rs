//! Situation analysis from a single snapshot.
//!
//! Every heuristic here is a pure function of the [`GameState`] (plus the
//! optional recent-decision window). Threats and opportunities come from
//! independent detectors; the order they run in never changes the result
//! beyond list order.

use crate::context::ContextManager;
use crate::core::{GamePhase, GameState};

use super::analysis::{
    CooperationKind, CooperationOpportunity, FactorKind, KeyFactor, Opportunity,
    OpportunityKind, PlayerStatus, SituationAnalysis, StrategicIntent, TeamContext,
    TeamStrategy, Threat, ThreatKind,
};

/// Rival hand size below which a rival is about to go out.
const NEAR_WIN_HAND: usize = 3;

/// Own hand size below which we can close out the hand.
const NEAR_VICTORY_HAND: usize = 5;

/// Own hand size above which holding cards is itself a threat.
const HEAVY_HAND: usize = 12;

/// Teammate hand size above which they need support.
const TEAMMATE_HEAVY_HAND: usize = 10;

/// Consecutive passes before the streak is worth flagging.
const PASS_STREAK: usize = 3;

type ThreatDetector = fn(&GameState) -> Option<Threat>;
type OpportunityDetector = fn(&GameState) -> Option<Opportunity>;

const THREAT_DETECTORS: &[ThreatDetector] = &[opponent_near_win, too_many_cards];
const OPPORTUNITY_DETECTORS: &[OpportunityDetector] = &[near_victory, lead_opportunity];

/// Stateless situation analyzer.
#[derive(Clone, Copy, Debug, Default)]
pub struct CognitiveLayer;

impl CognitiveLayer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one snapshot.
    pub fn analyze(
        &self,
        state: &GameState,
        context: Option<&ContextManager>,
    ) -> SituationAnalysis {
        let hand_strength = Self::hand_strength(state.hand_size());
        let win_probability = Self::win_probability(state, hand_strength);
        let team_context = Self::team_context(state);
        let strategic_intent = Self::strategic_intent(hand_strength, team_context.as_ref());

        let mut key_factors = Self::key_factors(state);
        if let Some(factor) = context.and_then(pass_streak) {
            key_factors.push(factor);
        }

        SituationAnalysis {
            hand_strength,
            win_probability,
            strategic_intent,
            recommended_style: strategic_intent.style(),
            key_factors,
            threats: THREAT_DETECTORS.iter().filter_map(|d| d(state)).collect(),
            opportunities: OPPORTUNITY_DETECTORS.iter().filter_map(|d| d(state)).collect(),
            team_context,
        }
    }

    /// Step function of remaining cards: fewer cards, stronger hand.
    #[must_use]
    pub fn hand_strength(hand_size: usize) -> f64 {
        match hand_size {
            0 => 1.0,
            1..=3 => 0.9,
            4..=5 => 0.7,
            6..=8 => 0.5,
            9..=12 => 0.3,
            _ => 0.2,
        }
    }

    /// Strength, halved when a rival is about to go out and boosted in the
    /// endgame.
    #[must_use]
    pub fn win_probability(state: &GameState, hand_strength: f64) -> f64 {
        let mut probability = hand_strength;
        if state.min_rival_hand().is_some_and(|n| n < NEAR_WIN_HAND) {
            probability *= 0.5;
        }
        if state.phase.is_endgame() {
            probability *= 1.2;
        }
        probability.clamp(0.0, 1.0)
    }

    /// Decision table for the turn's intent.
    #[must_use]
    pub fn strategic_intent(hand_strength: f64, team: Option<&TeamContext>) -> StrategicIntent {
        if team.is_some_and(TeamContext::teammate_needs_help) {
            return if hand_strength > 0.7 {
                StrategicIntent::CooperateSupport
            } else {
                StrategicIntent::SacrificeAssist
            };
        }
        if hand_strength > 0.7 {
            StrategicIntent::AggressiveAttack
        } else if hand_strength > 0.5 {
            StrategicIntent::SteadyAdvance
        } else {
            StrategicIntent::DefensivePreserve
        }
    }

    /// Teammate status and cooperation options. `None` outside team mode.
    pub fn team_context(state: &GameState) -> Option<TeamContext> {
        if !state.team_mode {
            return None;
        }

        let teammate_status: Vec<PlayerStatus> = state
            .teammates()
            .map(|(player, hand_size)| PlayerStatus {
                player,
                hand_size,
                estimated_strength: if hand_size < NEAR_VICTORY_HAND { 0.8 } else { 0.5 },
                needs_support: hand_size > TEAMMATE_HEAVY_HAND,
            })
            .collect();

        let team_strategy = if teammate_status.iter().any(|s| s.needs_support) {
            TeamStrategy::SupportWeakTeammate
        } else if teammate_status.iter().any(|s| s.estimated_strength > 0.7) {
            TeamStrategy::CooperateWithStrong
        } else {
            TeamStrategy::BalancedTeamPlay
        };

        let mut cooperation_opportunities = Vec::new();
        for status in &teammate_status {
            if status.hand_size < NEAR_VICTORY_HAND {
                cooperation_opportunities.push(CooperationOpportunity {
                    kind: CooperationKind::LetTeammateFinish,
                    teammate: status.player,
                    benefit: 0.8,
                    description: format!("{} has {} cards left", status.player, status.hand_size),
                });
            }
            if status.needs_support {
                cooperation_opportunities.push(CooperationOpportunity {
                    kind: CooperationKind::TakeControl,
                    teammate: status.player,
                    benefit: 0.6,
                    description: format!("{} is holding {} cards", status.player, status.hand_size),
                });
            }
        }

        Some(TeamContext {
            teammate_status,
            team_strategy,
            cooperation_opportunities,
        })
    }

    fn key_factors(state: &GameState) -> Vec<KeyFactor> {
        let hand = state.hand_size();
        let mut factors = vec![KeyFactor {
            kind: FactorKind::HandSize,
            importance: if hand < NEAR_VICTORY_HAND { 0.9 } else { 0.5 },
            description: format!("{hand} cards in hand"),
        }];

        if let Some(min) = state.min_rival_hand().filter(|&n| n < NEAR_VICTORY_HAND) {
            factors.push(KeyFactor {
                kind: FactorKind::OpponentNearWin,
                importance: 0.8,
                description: format!("a rival has {min} cards left"),
            });
        }
        if state.phase == GamePhase::Critical {
            factors.push(KeyFactor {
                kind: FactorKind::CriticalMoment,
                importance: 1.0,
                description: "critical phase".into(),
            });
        }
        if state.team_mode {
            factors.push(KeyFactor {
                kind: FactorKind::TeamMode,
                importance: 0.7,
                description: "playing with partners".into(),
            });
        }
        factors
    }
}

fn opponent_near_win(state: &GameState) -> Option<Threat> {
    let (player, size) = state
        .rivals()
        .filter(|&(_, size)| size < NEAR_WIN_HAND)
        .min_by_key(|&(_, size)| size)?;
    Some(Threat {
        kind: ThreatKind::OpponentNearWin,
        severity: 0.9,
        source: format!("{player} has {size} cards left"),
        mitigation: Some("keep control of the trick with strong plays".into()),
    })
}

fn too_many_cards(state: &GameState) -> Option<Threat> {
    (state.hand_size() > HEAVY_HAND).then(|| Threat {
        kind: ThreatKind::TooManyCards,
        severity: 0.6,
        source: format!("{} cards in hand", state.hand_size()),
        mitigation: Some("shed multi-card combinations early".into()),
    })
}

fn near_victory(state: &GameState) -> Option<Opportunity> {
    (state.hand_size() < NEAR_VICTORY_HAND).then(|| Opportunity {
        kind: OpportunityKind::NearVictory,
        value: 0.9,
        condition: format!("{} cards in hand", state.hand_size()),
        action: Some("play out the remaining cards".into()),
    })
}

fn lead_opportunity(state: &GameState) -> Option<Opportunity> {
    state.is_leading().then(|| Opportunity {
        kind: OpportunityKind::LeadOpportunity,
        value: 0.6,
        condition: "no play to beat".into(),
        action: Some("lead with small cards".into()),
    })
}

fn pass_streak(context: &ContextManager) -> Option<KeyFactor> {
    let recent = context.recent_decisions(PASS_STREAK);
    (recent.len() == PASS_STREAK && recent.iter().all(|d| d.action.is_pass())).then(|| KeyFactor {
        kind: FactorKind::PassStreak,
        importance: 0.6,
        description: format!("passed the last {PASS_STREAK} turns"),
    })
}
