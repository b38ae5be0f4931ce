//! Situation analysis value types.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// What the player is trying to achieve this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicIntent {
    AggressiveAttack,
    SteadyAdvance,
    DefensivePreserve,
    CooperateSupport,
    SacrificeAssist,
}

impl StrategicIntent {
    /// Play style that carries out this intent.
    #[must_use]
    pub const fn style(self) -> PlayStyle {
        match self {
            StrategicIntent::AggressiveAttack => PlayStyle::Aggressive,
            StrategicIntent::SteadyAdvance => PlayStyle::Balanced,
            StrategicIntent::DefensivePreserve => PlayStyle::Conservative,
            StrategicIntent::CooperateSupport | StrategicIntent::SacrificeAssist => {
                PlayStyle::Adaptive
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStyle {
    Aggressive,
    Conservative,
    #[default]
    Balanced,
    Adaptive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    HandSize,
    OpponentNearWin,
    CriticalMoment,
    TeamMode,
    PassStreak,
}

/// Something that should weigh on the decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyFactor {
    pub kind: FactorKind,
    /// 0-1.
    pub importance: f64,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    OpponentNearWin,
    TooManyCards,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub kind: ThreatKind,
    /// 0-1.
    pub severity: f64,
    pub source: String,
    pub mitigation: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    NearVictory,
    LeadOpportunity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub kind: OpportunityKind,
    /// 0-1.
    pub value: f64,
    pub condition: String,
    pub action: Option<String>,
}

/// How a teammate is doing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub player: PlayerId,
    pub hand_size: usize,
    pub estimated_strength: f64,
    pub needs_support: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStrategy {
    SupportWeakTeammate,
    CooperateWithStrong,
    BalancedTeamPlay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooperationKind {
    /// A teammate is close to going out; avoid overtaking their plays.
    LetTeammateFinish,
    /// A teammate is stuck with a big hand; win tricks to lead for them.
    TakeControl,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CooperationOpportunity {
    pub kind: CooperationKind,
    pub teammate: PlayerId,
    pub benefit: f64,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamContext {
    pub teammate_status: Vec<PlayerStatus>,
    pub team_strategy: TeamStrategy,
    pub cooperation_opportunities: Vec<CooperationOpportunity>,
}

impl TeamContext {
    /// Does any teammate need support?
    #[must_use]
    pub fn teammate_needs_help(&self) -> bool {
        self.teammate_status.iter().any(|s| s.needs_support)
    }
}

/// Derived summary of one snapshot. Recomputed every decision cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SituationAnalysis {
    /// 0-1, higher is better.
    pub hand_strength: f64,
    /// 0-1.
    pub win_probability: f64,
    pub strategic_intent: StrategicIntent,
    pub recommended_style: PlayStyle,
    pub key_factors: Vec<KeyFactor>,
    pub threats: Vec<Threat>,
    pub opportunities: Vec<Opportunity>,
    pub team_context: Option<TeamContext>,
}

impl SituationAnalysis {
    /// Highest threat severity, 0 when there are no threats.
    #[must_use]
    pub fn max_threat_severity(&self) -> f64 {
        self.threats.iter().map(|t| t.severity).fold(0.0, f64::max)
    }

    /// Neutral analysis with no factors, used where a module has nothing
    /// better to report.
    #[must_use]
    pub fn neutral(hand_strength: f64) -> Self {
        Self {
            hand_strength,
            win_probability: 0.5,
            strategic_intent: StrategicIntent::SteadyAdvance,
            recommended_style: PlayStyle::Balanced,
            key_factors: Vec::new(),
            threats: Vec::new(),
            opportunities: Vec::new(),
            team_context: None,
        }
    }
}
