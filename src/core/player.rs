//! Seats around the table.
//!
//! Seats are 0-based in turn order and wrap at the player count. The engine
//! sees other players only through their seat relative to its own.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(seat: u8) -> Self {
        Self(seat)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat `offset` places after this one.
    ///
    /// ```
    /// use ccg_brain::core::PlayerId;
    ///
    /// assert_eq!(PlayerId::new(2).seat_after(1, 4), PlayerId::new(3));
    /// assert_eq!(PlayerId::new(3).seat_after(2, 4), PlayerId::new(1));
    /// ```
    #[must_use]
    pub fn seat_after(self, offset: usize, player_count: usize) -> Self {
        debug_assert!(player_count > 0 && player_count <= 255);
        Self(((self.index() + offset) % player_count) as u8)
    }

    /// Every seat at a table of `player_count`.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count.min(255) as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_display() {
        assert_eq!(PlayerId::new(3).index(), 3);
        assert_eq!(PlayerId::new(3).to_string(), "seat 3");
    }

    #[test]
    fn test_seat_after_wraps() {
        let p = PlayerId::new(3);
        assert_eq!(p.seat_after(0, 4), p);
        assert_eq!(p.seat_after(1, 4), PlayerId::new(0));
        assert_eq!(p.seat_after(5, 4), PlayerId::new(0));
    }

    #[test]
    fn test_all_seats() {
        let seats: Vec<_> = PlayerId::all(3).collect();
        assert_eq!(seats, vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
    }
}
