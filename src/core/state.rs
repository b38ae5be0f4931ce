//! Game snapshots handed to the engine.
//!
//! A [`GameState`] is an immutable view of the table from one player's
//! seat. The surrounding game loop builds a fresh snapshot every turn; the
//! engine reads it, never writes it. Hand and history use `im` persistent
//! vectors so the Context Manager can retain snapshots with O(1) clones.

use chrono::{DateTime, Utc};
use im::Vector;
use serde::{Deserialize, Serialize};

use super::action::{Play, PlayCards};
use super::card::Card;
use super::player::PlayerId;

/// Coarse stage of the current hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Early,
    Middle,
    Late,
    Critical,
}

impl GamePhase {
    /// Late or critical: fewer cards left makes a strong hand stronger.
    #[must_use]
    pub const fn is_endgame(self) -> bool {
        matches!(self, GamePhase::Late | GamePhase::Critical)
    }
}

/// Team layout for partnership games.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Members of each team, by seat.
    pub teams: Vec<Vec<PlayerId>>,
}

impl TeamConfig {
    /// Create a team layout.
    pub fn new(teams: Vec<Vec<PlayerId>>) -> Self {
        Self { teams }
    }

    /// Standard four-seat partnership: seats 0+2 against 1+3.
    #[must_use]
    pub fn partners_across(player_count: usize) -> Self {
        let mut teams = vec![Vec::new(), Vec::new()];
        for player in PlayerId::all(player_count) {
            teams[player.index() % 2].push(player);
        }
        Self { teams }
    }

    /// Index of the team a player belongs to.
    #[must_use]
    pub fn team_of(&self, player: PlayerId) -> Option<usize> {
        self.teams.iter().position(|t| t.contains(&player))
    }
}

/// One entry in the public play history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub player: PlayerId,
    pub cards: PlayCards,
    /// `None` records a pass.
    pub play: Option<Play>,
    pub round_number: u32,
    pub timestamp: DateTime<Utc>,
}

impl PlayRecord {
    /// Record a play.
    pub fn played(player: PlayerId, play: Play, round_number: u32) -> Self {
        Self {
            player,
            cards: play.cards.clone(),
            play: Some(play),
            round_number,
            timestamp: Utc::now(),
        }
    }

    /// Record a pass.
    pub fn passed(player: PlayerId, round_number: u32) -> Self {
        Self {
            player,
            cards: PlayCards::new(),
            play: None,
            round_number,
            timestamp: Utc::now(),
        }
    }
}

/// Snapshot of the table from the deciding player's seat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // === Own seat ===
    /// Cards in the deciding player's hand.
    pub hand: Vector<Card>,

    /// Seat of the deciding player.
    pub position: PlayerId,

    /// Players at the table.
    pub player_count: usize,

    // === Trick ===
    /// Play to beat, `None` when leading.
    pub last_play: Option<Play>,

    /// Who made `last_play`.
    pub last_player: Option<PlayerId>,

    /// Whose turn it is.
    pub current_player: PlayerId,

    // === History ===
    pub play_history: Vector<PlayRecord>,
    pub round_number: u32,

    /// Hand sizes of every other player, in seat order starting with the
    /// seat after `position`.
    pub opponent_hand_sizes: Vec<usize>,

    // === Teams ===
    pub team_mode: bool,
    pub team_config: Option<TeamConfig>,
    pub team_id: Option<usize>,

    // === Scores ===
    pub current_round_score: i64,

    /// Cumulative score per seat.
    pub cumulative_scores: Vec<i64>,

    pub phase: GamePhase,

    /// Turn clock, if the table runs one.
    pub time_remaining_ms: Option<u64>,
}

impl GameState {
    /// Create a snapshot for `position` at a table of `player_count`.
    ///
    /// Every other player starts with the same hand size as ours; call the
    /// `with_*` methods to fill in the rest of the table.
    pub fn new(
        position: PlayerId,
        player_count: usize,
        hand: impl IntoIterator<Item = Card>,
    ) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        let hand: Vector<Card> = hand.into_iter().collect();
        let others = player_count - 1;
        Self {
            opponent_hand_sizes: vec![hand.len(); others],
            hand,
            position,
            player_count,
            last_play: None,
            last_player: None,
            current_player: position,
            play_history: Vector::new(),
            round_number: 1,
            team_mode: false,
            team_config: None,
            team_id: None,
            current_round_score: 0,
            cumulative_scores: vec![0; player_count],
            phase: GamePhase::Early,
            time_remaining_ms: None,
        }
    }

    /// Set the play to beat.
    #[must_use]
    pub fn with_last_play(mut self, play: Play, player: PlayerId) -> Self {
        self.last_play = Some(play);
        self.last_player = Some(player);
        self
    }

    /// Set the other players' hand sizes (seat order after `position`).
    #[must_use]
    pub fn with_opponent_hand_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.opponent_hand_sizes = sizes;
        self
    }

    #[must_use]
    pub fn with_phase(mut self, phase: GamePhase) -> Self {
        self.phase = phase;
        self
    }

    #[must_use]
    pub fn with_round(mut self, round_number: u32) -> Self {
        self.round_number = round_number;
        self
    }

    /// Enable team mode with the given layout.
    #[must_use]
    pub fn with_teams(mut self, config: TeamConfig) -> Self {
        self.team_id = config.team_of(self.position);
        self.team_config = Some(config);
        self.team_mode = true;
        self
    }

    #[must_use]
    pub fn with_scores(mut self, current_round: i64, cumulative: Vec<i64>) -> Self {
        self.current_round_score = current_round;
        self.cumulative_scores = cumulative;
        self
    }

    /// Append a history record.
    #[must_use]
    pub fn with_history(mut self, record: PlayRecord) -> Self {
        self.play_history.push_back(record);
        self
    }

    /// Number of cards in our hand.
    #[must_use]
    pub fn hand_size(&self) -> usize {
        self.hand.len()
    }

    /// Are we leading the trick?
    #[must_use]
    pub fn is_leading(&self) -> bool {
        self.last_play.is_none()
    }

    /// Every other player with their hand size, in seat order.
    pub fn others(&self) -> impl Iterator<Item = (PlayerId, usize)> + '_ {
        self.opponent_hand_sizes
            .iter()
            .enumerate()
            .map(move |(i, &size)| (self.position.seat_after(i + 1, self.player_count), size))
    }

    /// Is `player` on our team? Always false outside team mode.
    #[must_use]
    pub fn is_teammate(&self, player: PlayerId) -> bool {
        if !self.team_mode || player == self.position {
            return false;
        }
        let (Some(config), Some(team)) = (&self.team_config, self.team_id) else {
            return false;
        };
        config.team_of(player) == Some(team)
    }

    /// Teammates with their hand sizes.
    pub fn teammates(&self) -> impl Iterator<Item = (PlayerId, usize)> + '_ {
        self.others().filter(|(p, _)| self.is_teammate(*p))
    }

    /// Players competing against us with their hand sizes.
    pub fn rivals(&self) -> impl Iterator<Item = (PlayerId, usize)> + '_ {
        self.others().filter(|(p, _)| !self.is_teammate(*p))
    }

    /// Smallest rival hand, `None` when there are no rivals.
    #[must_use]
    pub fn min_rival_hand(&self) -> Option<usize> {
        self.rivals().map(|(_, size)| size).min()
    }

    /// Cumulative score for a seat (0 if unknown).
    #[must_use]
    pub fn score_of(&self, player: PlayerId) -> i64 {
        self.cumulative_scores.get(player.index()).copied().unwrap_or(0)
    }
}
