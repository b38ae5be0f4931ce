//! Play legality seam.
//!
//! The authoritative rule engine lives outside this crate. Modules consume
//! it through [`PlayRules`], a read-only capability: classify a set of
//! cards, decide what beats what, and enumerate candidate plays.
//! [`StandardRules`] implements the common same-rank shapes so built-in
//! modules and tests have something to work against.

use std::collections::BTreeMap;

use crate::core::{Card, GameAction, Play, PlayKind, Rank};

/// Rule capability consumed by decision modules.
///
/// ## Implementation Notes
///
/// - `classify`: return `None` for card sets that do not form a legal shape
/// - `can_beat`: only called with classified plays
/// - `legal_plays`: never includes pass; ordering should be cheapest first
pub trait PlayRules: Send + Sync {
    /// Determine the shape of a set of cards.
    fn classify(&self, cards: &[Card]) -> Option<Play>;

    /// Does `play` beat `last`?
    fn can_beat(&self, play: &Play, last: &Play) -> bool;

    /// Candidate plays from `hand` that are legal against `last_play`.
    fn legal_plays(&self, hand: &[Card], last_play: Option<&Play>) -> Vec<Play>;

    /// Is a proposed action legal in this position?
    fn is_legal(&self, hand: &[Card], last_play: Option<&Play>, action: &GameAction) -> bool {
        match action {
            // Leading player must play something.
            GameAction::Pass => last_play.is_some(),
            GameAction::Play(play) => {
                let owned = play
                    .cards
                    .iter()
                    .all(|c| hand.iter().any(|h| h.id == c.id));
                let Some(shape) = self.classify(&play.cards) else {
                    return false;
                };
                owned && last_play.map_or(true, |last| self.can_beat(&shape, last))
            }
        }
    }
}

/// Same-rank shapes: single, pair, triple, bomb (4-6), dun (7+).
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardRules;

impl StandardRules {
    fn kind_for(count: usize) -> Option<PlayKind> {
        match count {
            0 => None,
            1 => Some(PlayKind::Single),
            2 => Some(PlayKind::Pair),
            3 => Some(PlayKind::Triple),
            4..=6 => Some(PlayKind::Bomb),
            _ => Some(PlayKind::Dun),
        }
    }

    /// Group a hand by rank, each group ordered by suit then id.
    pub fn rank_groups(hand: &[Card]) -> BTreeMap<Rank, Vec<Card>> {
        let mut groups: BTreeMap<Rank, Vec<Card>> = BTreeMap::new();
        for card in hand {
            groups.entry(card.rank).or_default().push(*card);
        }
        for cards in groups.values_mut() {
            cards.sort_by_key(|c| (c.suit, c.id));
        }
        groups
    }
}

impl PlayRules for StandardRules {
    fn classify(&self, cards: &[Card]) -> Option<Play> {
        let first = cards.first()?;
        if !cards.iter().all(|c| c.rank == first.rank) {
            return None;
        }
        let kind = Self::kind_for(cards.len())?;
        Some(Play::new(cards.iter().copied(), kind, first.rank))
    }

    fn can_beat(&self, play: &Play, last: &Play) -> bool {
        match (play.kind.is_bomb(), last.kind.is_bomb()) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                (play.kind, play.len(), play.value) > (last.kind, last.len(), last.value)
            }
            (false, false) => {
                play.kind == last.kind && play.len() == last.len() && play.value > last.value
            }
        }
    }

    fn legal_plays(&self, hand: &[Card], last_play: Option<&Play>) -> Vec<Play> {
        let mut plays = Vec::new();
        for (rank, cards) in Self::rank_groups(hand) {
            for size in 1..=cards.len() {
                let Some(kind) = Self::kind_for(size) else {
                    continue;
                };
                let play = Play::new(cards[..size].iter().copied(), kind, rank);
                if last_play.map_or(true, |last| self.can_beat(&play, last)) {
                    plays.push(play);
                }
            }
        }
        plays.sort_by_key(|p| (p.kind.is_bomb(), p.kind, p.value, p.len()));
        plays
    }
}
