//! Cards, ranks, and suits.
//!
//! Ranks follow the shedding-game ordering: `3` is the lowest card, `2` is
//! the highest regular rank, and the two jokers sit above it. Ranks are
//! stored as their numeric value so comparisons are plain integer compares.

use serde::{Deserialize, Serialize};

/// Unique card identifier within a deal.
///
/// Multi-deck games contain several physically distinct cards with the same
/// rank and suit; the id tells them apart. Canonical action keys ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u16);

/// Card rank. Values 3..=15 are regular ranks (11 = J, 12 = Q, 13 = K,
/// 14 = A, 15 = 2), 16 is the small joker, 17 the big joker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u8);

impl Rank {
    /// Lowest regular rank.
    pub const THREE: Rank = Rank(3);
    /// Highest regular rank (the deuce).
    pub const TWO: Rank = Rank(15);
    /// Small joker.
    pub const SMALL_JOKER: Rank = Rank(16);
    /// Big joker.
    pub const BIG_JOKER: Rank = Rank(17);

    /// Create a rank from its numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Numeric value used for ordering.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Is this one of the two jokers?
    #[must_use]
    pub const fn is_joker(self) -> bool {
        self.0 >= 16
    }

    /// Is this rank within the playable range?
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 3 && self.0 <= 17
    }

    /// Ace, deuce, or joker.
    #[must_use]
    pub const fn is_high(self) -> bool {
        self.0 >= 14
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            3..=10 => write!(f, "{}", self.0),
            11 => write!(f, "J"),
            12 => write!(f, "Q"),
            13 => write!(f, "K"),
            14 => write!(f, "A"),
            15 => write!(f, "2"),
            16 => write!(f, "sj"),
            17 => write!(f, "BJ"),
            other => write!(f, "?{}", other),
        }
    }
}

/// Card suit. Jokers carry the `Joker` suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Spades,
    Hearts,
    Clubs,
    Diamonds,
    Joker,
}

impl Suit {
    /// Single-letter code used in canonical keys and logs.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
            Suit::Joker => 'J',
        }
    }
}

/// A physical card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    /// Create a card.
    #[must_use]
    pub const fn new(id: u16, rank: Rank, suit: Suit) -> Self {
        Self {
            id: CardId(id),
            rank,
            suit,
        }
    }

    /// Rank and suit, without the deal-specific id.
    #[must_use]
    pub const fn face(&self) -> (Rank, Suit) {
        (self.rank, self.suit)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.code())
    }
}
