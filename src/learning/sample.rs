//! Labelled training samples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cognitive::SituationAnalysis;
use crate::core::{GameAction, GameState, PlayerId};
use crate::fusion::Decision;
use crate::modules::suggestion::clamp_unit;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

/// Where a sample came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleSource {
    Expert,
    SelfPlay,
    #[default]
    RealPlayer,
}

/// Result of a finished game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: PlayerId,
    /// Final score per seat.
    pub scores: Vec<i64>,
    pub duration_ms: u64,
    pub total_rounds: u32,
}

impl GameOutcome {
    pub fn new(winner: PlayerId) -> Self {
        Self {
            winner,
            scores: Vec::new(),
            duration_ms: 0,
            total_rounds: 0,
        }
    }

    #[must_use]
    pub fn with_scores(mut self, scores: Vec<i64>) -> Self {
        self.scores = scores;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64, total_rounds: u32) -> Self {
        self.duration_ms = duration_ms;
        self.total_rounds = total_rounds;
        self
    }
}

/// One decision point with its label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Snapshot the action was chosen from.
    pub state: GameState,

    pub analysis: SituationAnalysis,

    /// The action taken.
    pub action: GameAction,

    pub label: SampleLabel,

    /// 0-1, the decision's confidence when collected.
    pub quality: f64,

    pub outcome: Option<GameOutcome>,

    pub timestamp: DateTime<Utc>,

    pub source: SampleSource,

    /// Training weight.
    pub weight: f64,
}

impl TrainingSample {
    /// Unlabelled sample with weight 1.
    pub fn new(state: GameState, action: GameAction, quality: f64) -> Self {
        Self {
            state,
            analysis: SituationAnalysis::neutral(0.0),
            action,
            label: SampleLabel::Neutral,
            quality: clamp_unit(quality),
            outcome: None,
            timestamp: Utc::now(),
            source: SampleSource::RealPlayer,
            weight: 1.0,
        }
    }

    /// Sample for a decision the engine made; quality is its confidence.
    pub fn from_decision(state: GameState, decision: &Decision) -> Self {
        let mut sample = Self::new(state, decision.action.clone(), decision.confidence);
        sample.timestamp = decision.timestamp;
        sample
    }

    #[must_use]
    pub fn with_analysis(mut self, analysis: SituationAnalysis) -> Self {
        self.analysis = analysis;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: SampleLabel, weight: f64) -> Self {
        self.label = label;
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: SampleSource) -> Self {
        self.source = source;
        self
    }

    /// Label from a finished game: our win is positive, anything else
    /// negative.
    pub fn label_outcome(&mut self, outcome: &GameOutcome) {
        if outcome.winner == self.state.position {
            self.label = SampleLabel::Positive;
            self.weight = 1.5;
        } else {
            self.label = SampleLabel::Negative;
            self.weight = 0.5;
        }
        self.outcome = Some(outcome.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(position: u8) -> TrainingSample {
        let state = GameState::new(PlayerId::new(position), 4, Vec::new());
        TrainingSample::new(state, GameAction::Pass, 0.8)
    }

    #[test]
    fn test_new_sample_is_neutral() {
        let s = sample(0);
        assert_eq!(s.label, SampleLabel::Neutral);
        assert_eq!(s.weight, 1.0);
        assert_eq!(s.source, SampleSource::RealPlayer);
        assert!(s.outcome.is_none());
    }

    #[test]
    fn test_label_outcome() {
        let outcome = GameOutcome::new(PlayerId::new(2)).with_duration(60_000, 12);
        let mut winner = sample(2);
        winner.label_outcome(&outcome);
        assert_eq!(winner.label, SampleLabel::Positive);
        assert_eq!(winner.weight, 1.5);
        assert_eq!(winner.outcome.as_ref().unwrap().total_rounds, 12);

        let mut loser = sample(1);
        loser.label_outcome(&outcome);
        assert_eq!(loser.label, SampleLabel::Negative);
        assert_eq!(loser.weight, 0.5);
    }

    #[test]
    fn test_quality_clamped() {
        let state = GameState::new(PlayerId::new(0), 2, Vec::new());
        let s = TrainingSample::new(state, GameAction::Pass, 3.0);
        assert_eq!(s.quality, 1.0);
    }

    #[test]
    fn test_sample_serialization() {
        let s = sample(1).with_source(SampleSource::SelfPlay);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"self_play\""));
        let back: TrainingSample = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
