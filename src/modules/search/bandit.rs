//! One-level search tree: an arm per candidate action.

use serde::{Deserialize, Serialize};

use crate::core::GameAction;

/// Candidate action with its accumulated rollout results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Arm {
    pub action: GameAction,

    /// Rollouts that started with this action.
    pub visits: u32,

    /// Sum of rollout rewards (each 0-1).
    pub total_reward: f64,
}

impl Arm {
    pub fn new(action: GameAction) -> Self {
        Self {
            action,
            visits: 0,
            total_reward: 0.0,
        }
    }

    /// Average reward, 0 for an unvisited arm.
    #[inline]
    #[must_use]
    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / self.visits as f64
        }
    }
}

/// UCB1 bandit over a fixed set of actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bandit {
    pub arms: Vec<Arm>,
    pub visits: u32,
}

impl Bandit {
    pub fn new(actions: impl IntoIterator<Item = GameAction>) -> Self {
        Self {
            arms: actions.into_iter().map(Arm::new).collect(),
            visits: 0,
        }
    }

    /// Arm to explore next.
    ///
    /// Formula: Q(a) + c * sqrt(ln(N) / n(a)); unvisited arms first, ties
    /// to the lower index.
    #[must_use]
    pub fn select(&self, exploration_constant: f64) -> usize {
        let ln_parent = (self.visits.max(1) as f64).ln();

        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (i, arm) in self.arms.iter().enumerate() {
            let value = if arm.visits == 0 {
                f64::INFINITY
            } else {
                arm.mean_reward() + exploration_constant * (ln_parent / arm.visits as f64).sqrt()
            };
            if value > best_value {
                best = i;
                best_value = value;
            }
        }
        best
    }

    pub fn update(&mut self, arm: usize, reward: f64) {
        if let Some(arm) = self.arms.get_mut(arm) {
            arm.visits += 1;
            arm.total_reward += reward;
            self.visits += 1;
        }
    }

    /// Arms ordered by visits, then mean reward, best first.
    #[must_use]
    pub fn ranked(&self) -> Vec<&Arm> {
        let mut arms: Vec<&Arm> = self.arms.iter().collect();
        arms.sort_by(|a, b| {
            b.visits
                .cmp(&a.visits)
                .then_with(|| b.mean_reward().total_cmp(&a.mean_reward()))
        });
        arms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, Play, PlayKind, Rank, Suit};

    fn single(id: u16, rank: u8) -> GameAction {
        GameAction::play(Play::new(
            [Card::new(id, Rank::new(rank), Suit::Spades)],
            PlayKind::Single,
            Rank::new(rank),
        ))
    }

    #[test]
    fn test_select_unvisited_first() {
        let mut bandit = Bandit::new([single(0, 3), single(1, 4), GameAction::Pass]);
        assert_eq!(bandit.select(1.414), 0);
        bandit.update(0, 1.0);
        assert_eq!(bandit.select(1.414), 1);
        bandit.update(1, 0.0);
        assert_eq!(bandit.select(1.414), 2);
    }

    #[test]
    fn test_exploitation_without_exploration() {
        let mut bandit = Bandit::new([single(0, 3), single(1, 4)]);
        bandit.update(0, 0.2);
        bandit.update(1, 0.9);
        assert_eq!(bandit.select(0.0), 1);
    }

    #[test]
    fn test_ranked_by_visits() {
        let mut bandit = Bandit::new([single(0, 3), single(1, 4)]);
        bandit.update(1, 0.5);
        bandit.update(1, 0.5);
        bandit.update(0, 1.0);
        let ranked = bandit.ranked();
        assert_eq!(ranked[0].visits, 2);
        assert_eq!(bandit.visits, 3);
    }

    #[test]
    fn test_update_out_of_range_is_ignored() {
        let mut bandit = Bandit::new([GameAction::Pass]);
        bandit.update(5, 1.0);
        assert_eq!(bandit.visits, 0);
    }
}
