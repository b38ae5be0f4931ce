//! Fusion policies.
//!
//! Each policy picks one action from a set of module candidates. Policies
//! are order-independent: every comparison ends in a total tie-break on
//! the candidate's canonical action key and module name, never on arrival
//! order.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::cognitive::SituationAnalysis;
use crate::config::AdaptiveTuning;
use crate::core::{ActionKey, GameAction};

use super::decision::{DecisionSource, SAFE_PASS_CONFIDENCE};

/// Confidence gap below which cascade treats two candidates as tied.
pub const CASCADE_TIE_GAP: f64 = 0.2;

/// Outcome of one policy.
#[derive(Clone, Debug, PartialEq)]
pub struct Fused {
    pub action: GameAction,
    /// 0-1.
    pub confidence: f64,
    pub reasoning: String,
}

/// Strategy for combining candidates into one action.
pub trait FusionPolicy: Send + Sync {
    /// Pick an action. `None` only when `sources` is empty.
    fn fuse(&self, sources: &[DecisionSource]) -> Option<Fused>;
}

/// Higher vote wins; equal votes go to the canonically smaller candidate.
fn by_vote(a: &DecisionSource, b: &DecisionSource) -> Ordering {
    a.vote()
        .total_cmp(&b.vote())
        .then_with(|| b.canonical().cmp(&a.canonical()))
}

/// Σ(w·c) / Σw, or the mean confidence when every weight is zero.
pub fn weighted_confidence(sources: &[DecisionSource]) -> f64 {
    if sources.is_empty() {
        return 0.0;
    }
    let total_weight: f64 = sources.iter().map(|s| s.weight).sum();
    if total_weight > 0.0 {
        sources.iter().map(DecisionSource::vote).sum::<f64>() / total_weight
    } else {
        sources.iter().map(|s| s.confidence).sum::<f64>() / sources.len() as f64
    }
}

// =============================================================================
// Weighted average
// =============================================================================

/// Highest weight x confidence wins. Confidence is the weighted mean of
/// all candidates.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedAverage;

impl FusionPolicy for WeightedAverage {
    fn fuse(&self, sources: &[DecisionSource]) -> Option<Fused> {
        let best = sources.iter().max_by(|a, b| by_vote(a, b))?;
        Some(Fused {
            action: best.action().clone(),
            confidence: weighted_confidence(sources),
            reasoning: format!("{} ranked highest ({:.3})", best.module, best.vote()),
        })
    }
}

// =============================================================================
// Voting
// =============================================================================

/// Candidates vote for their action with weight x confidence. Confidence
/// is the winning share of all votes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Voting;

impl FusionPolicy for Voting {
    fn fuse(&self, sources: &[DecisionSource]) -> Option<Fused> {
        if sources.is_empty() {
            return None;
        }

        let mut buckets: FxHashMap<ActionKey, (f64, &DecisionSource)> = FxHashMap::default();
        for source in sources {
            buckets
                .entry(source.action().key())
                .and_modify(|(votes, rep)| {
                    *votes += source.vote();
                    if by_vote(source, rep) == Ordering::Greater {
                        *rep = source;
                    }
                })
                .or_insert((source.vote(), source));
        }

        let total: f64 = buckets.values().map(|(votes, _)| votes).sum();
        if total <= 0.0 {
            return Some(Fused {
                action: GameAction::Pass,
                confidence: SAFE_PASS_CONFIDENCE,
                reasoning: "no votes cast".to_string(),
            });
        }

        let bucket_count = buckets.len();
        let (key, (votes, rep)) = buckets
            .into_iter()
            .max_by(|(ka, (va, _)), (kb, (vb, _))| va.total_cmp(vb).then_with(|| kb.cmp(ka)))?;

        Some(Fused {
            action: rep.action().clone(),
            confidence: votes / total,
            reasoning: format!(
                "{} won {:.3} of {:.3} votes across {} actions",
                key, votes, total, bucket_count
            ),
        })
    }
}

// =============================================================================
// Cascade
// =============================================================================

/// Most confident wins, but every candidate within [`CASCADE_TIE_GAP`]
/// of the top confidence is tied with it and the heaviest of those wins.
///
/// Ties in weight go to the higher confidence, then to the canonical key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cascade;

impl Cascade {
    /// Order among the candidates tied with the top confidence; the
    /// greatest wins.
    fn rank(a: &DecisionSource, b: &DecisionSource) -> Ordering {
        a.weight
            .total_cmp(&b.weight)
            .then(a.confidence.total_cmp(&b.confidence))
            .then_with(|| b.canonical().cmp(&a.canonical()))
    }
}

impl FusionPolicy for Cascade {
    fn fuse(&self, sources: &[DecisionSource]) -> Option<Fused> {
        let top = sources.iter().map(|s| s.confidence).max_by(f64::total_cmp)?;
        let champion = sources
            .iter()
            .filter(|s| top - s.confidence < CASCADE_TIE_GAP)
            .max_by(|a, b| Self::rank(a, b))?;
        Some(Fused {
            action: champion.action().clone(),
            confidence: champion.confidence,
            reasoning: format!(
                "{} led the cascade (confidence {:.2}, weight {:.2})",
                champion.module, champion.confidence, champion.weight
            ),
        })
    }
}

// =============================================================================
// Adaptive
// =============================================================================

/// Which concrete policy adaptive fusion delegated to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdaptiveChoice {
    WeightedAverage,
    Voting,
    Cascade,
}

/// Picks a policy from situation complexity and candidate count.
#[derive(Clone, Debug, Default)]
pub struct Adaptive {
    pub tuning: AdaptiveTuning,
}

impl Adaptive {
    pub fn new(tuning: AdaptiveTuning) -> Self {
        Self { tuning }
    }

    /// Threats, opportunities and team play make a position complex.
    /// Capped at 1.
    pub fn complexity(&self, situation: &SituationAnalysis) -> f64 {
        let mut complexity = self.tuning.threat_weight * situation.threats.len() as f64
            + self.tuning.opportunity_weight * situation.opportunities.len() as f64;
        if situation.team_context.is_some() {
            complexity += self.tuning.team_bonus;
        }
        complexity.min(1.0)
    }

    pub fn choose(&self, situation: &SituationAnalysis, candidates: usize) -> AdaptiveChoice {
        if self.complexity(situation) > self.tuning.complexity_threshold {
            AdaptiveChoice::WeightedAverage
        } else if candidates > self.tuning.voting_min_candidates {
            AdaptiveChoice::Voting
        } else {
            AdaptiveChoice::Cascade
        }
    }

    pub fn fuse(&self, sources: &[DecisionSource], situation: &SituationAnalysis) -> Option<Fused> {
        let choice = self.choose(situation, sources.len());
        let fused = match choice {
            AdaptiveChoice::WeightedAverage => WeightedAverage.fuse(sources),
            AdaptiveChoice::Voting => Voting.fuse(sources),
            AdaptiveChoice::Cascade => Cascade.fuse(sources),
        }?;
        Some(Fused {
            reasoning: format!("{:?}: {}", choice, fused.reasoning),
            ..fused
        })
    }
}
