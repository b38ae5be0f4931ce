//! Game actions and their canonical keys.
//!
//! A turn is either a pass or a play of one or more cards. Two modules that
//! propose the same physical play may list the cards in different orders or
//! pick different copies from a multi-deck hand, so fusion compares actions
//! through [`ActionKey`]: pass maps to a fixed sentinel, a play maps to its
//! card faces sorted by rank then suit.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::card::{Card, Rank, Suit};

/// Inline card storage for plays. Most plays hold 1-8 cards.
pub type PlayCards = SmallVec<[Card; 8]>;

/// Shape of a play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayKind {
    Single,
    Pair,
    Triple,
    /// Four to six cards of one rank.
    Bomb,
    /// Seven or more cards of one rank.
    Dun,
}

impl PlayKind {
    /// Bombs and duns can beat any ordinary play.
    #[must_use]
    pub const fn is_bomb(self) -> bool {
        matches!(self, PlayKind::Bomb | PlayKind::Dun)
    }
}

/// A set of cards played together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    /// The cards played.
    pub cards: PlayCards,

    /// Shape of the play.
    pub kind: PlayKind,

    /// Rank that determines what the play beats.
    pub value: Rank,
}

impl Play {
    /// Create a play from already-classified cards.
    pub fn new(cards: impl IntoIterator<Item = Card>, kind: PlayKind, value: Rank) -> Self {
        Self {
            cards: cards.into_iter().collect(),
            kind,
            value,
        }
    }

    /// Number of cards in the play.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the play holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// What a player does on their turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameAction {
    Pass,
    Play(Play),
}

impl GameAction {
    /// Create a play action.
    #[must_use]
    pub fn play(play: Play) -> Self {
        GameAction::Play(play)
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, GameAction::Pass)
    }

    /// Cards committed by this action (empty for a pass).
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        match self {
            GameAction::Pass => &[],
            GameAction::Play(play) => &play.cards,
        }
    }

    /// Canonical key for equality across modules.
    #[must_use]
    pub fn key(&self) -> ActionKey {
        ActionKey::of(self)
    }
}

impl std::fmt::Display for GameAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Canonical identity of an action.
///
/// Ordering is total: `Pass` sorts before every play, plays compare their
/// sorted faces lexicographically. Fusion uses that ordering as its final
/// deterministic tie-break.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKey {
    Pass,
    Play(SmallVec<[(Rank, Suit); 8]>),
}

impl ActionKey {
    /// Canonicalize an action.
    #[must_use]
    pub fn of(action: &GameAction) -> Self {
        match action {
            GameAction::Pass => ActionKey::Pass,
            GameAction::Play(play) => {
                let mut faces: SmallVec<[(Rank, Suit); 8]> =
                    play.cards.iter().map(Card::face).collect();
                faces.sort_unstable();
                ActionKey::Play(faces)
            }
        }
    }
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKey::Pass => write!(f, "pass"),
            ActionKey::Play(faces) => {
                for (i, (rank, suit)) in faces.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}{}", rank, suit.code())?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u16, rank: u8, suit: Suit) -> Card {
        Card::new(id, Rank::new(rank), suit)
    }

    #[test]
    fn test_pass_key() {
        assert_eq!(GameAction::Pass.key(), ActionKey::Pass);
        assert_eq!(GameAction::Pass.key().to_string(), "pass");
    }

    #[test]
    fn test_key_ignores_card_order() {
        let a = Play::new(
            [card(1, 9, Suit::Spades), card(2, 9, Suit::Hearts)],
            PlayKind::Pair,
            Rank::new(9),
        );
        let b = Play::new(
            [card(2, 9, Suit::Hearts), card(1, 9, Suit::Spades)],
            PlayKind::Pair,
            Rank::new(9),
        );
        assert_eq!(GameAction::play(a).key(), GameAction::play(b).key());
    }

    #[test]
    fn test_key_ignores_card_ids() {
        let a = Play::new([card(1, 5, Suit::Clubs)], PlayKind::Single, Rank::new(5));
        let b = Play::new([card(40, 5, Suit::Clubs)], PlayKind::Single, Rank::new(5));
        assert_eq!(GameAction::play(a).key(), GameAction::play(b).key());
    }

    #[test]
    fn test_key_distinguishes_suits() {
        let a = Play::new([card(1, 5, Suit::Clubs)], PlayKind::Single, Rank::new(5));
        let b = Play::new([card(2, 5, Suit::Hearts)], PlayKind::Single, Rank::new(5));
        assert_ne!(GameAction::play(a).key(), GameAction::play(b).key());
    }

    #[test]
    fn test_key_sorted_by_rank_then_suit() {
        let play = Play::new(
            [card(1, 12, Suit::Hearts), card(2, 4, Suit::Diamonds), card(3, 4, Suit::Spades)],
            PlayKind::Triple,
            Rank::new(4),
        );
        assert_eq!(GameAction::play(play).key().to_string(), "4S,4D,QH");
    }

    #[test]
    fn test_pass_sorts_first() {
        let play = Play::new([card(1, 3, Suit::Spades)], PlayKind::Single, Rank::new(3));
        assert!(ActionKey::Pass < GameAction::play(play).key());
    }

    #[test]
    fn test_action_serialization() {
        let action = GameAction::play(Play::new(
            [card(7, 11, Suit::Clubs)],
            PlayKind::Single,
            Rank::new(11),
        ));
        let json = serde_json::to_string(&action).unwrap();
        let back: GameAction = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);

        let pass_json = serde_json::to_string(&GameAction::Pass).unwrap();
        assert_eq!(pass_json, r#""pass""#);
    }

    #[test]
    fn test_bomb_kinds() {
        assert!(PlayKind::Bomb.is_bomb());
        assert!(PlayKind::Dun.is_bomb());
        assert!(!PlayKind::Triple.is_bomb());
    }
}
