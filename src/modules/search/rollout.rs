//! Random playouts from our seat.
//!
//! Opponent hands are hidden, so the other seats are simulated from their
//! hand sizes alone: whether a seat beats the current play is a coin flip
//! weighted by how high the play already is. Our own seat plays real cards
//! through [`PlayRules`].

use crate::core::{Card, GameAction, GameState, Play, PlayKind, Rank, SeededRng, Suit};
use crate::rules::PlayRules;

/// Reward when a teammate goes out first.
const TEAMMATE_FINISH_REWARD: f64 = 0.6;

/// Share of reward earned by shedding cards when someone else finishes.
const PROGRESS_REWARD: f64 = 0.3;

/// Chance a hidden hand can beat a play, before scaling by its height.
const MAX_BEAT_CHANCE: f64 = 0.8;

const HIDDEN_CARD_ID: u16 = u16::MAX;

#[derive(Clone, Copy, Debug)]
struct Seat {
    cards: usize,
    teammate: bool,
}

/// Playout driver. Borrowed state is read-only.
pub struct Rollout<'a> {
    rules: &'a dyn PlayRules,
    rng: &'a mut SeededRng,
    aggression: f64,
    max_turns: u32,
}

impl<'a> Rollout<'a> {
    pub fn new(
        rules: &'a dyn PlayRules,
        rng: &'a mut SeededRng,
        aggression: f64,
        max_turns: u32,
    ) -> Self {
        Self {
            rules,
            rng,
            aggression: aggression.clamp(0.0, 1.0),
            max_turns,
        }
    }

    /// Take `action` from `state` and play on to the first finisher.
    /// Returns a reward in [0, 1].
    pub fn run(&mut self, state: &GameState, action: &GameAction) -> f64 {
        let initial = state.hand_size().max(1);
        let mut hand: Vec<Card> = state.hand.iter().copied().collect();
        let mut seats: Vec<Seat> = state
            .others()
            .map(|(player, cards)| Seat {
                cards,
                teammate: state.is_teammate(player),
            })
            .collect();
        let seat_count = seats.len() + 1;

        // Seat 0 is us; seat i is the i-th player after us.
        let mut last: Option<(Play, usize)> = match action {
            GameAction::Play(play) => {
                remove_cards(&mut hand, play);
                Some((play.clone(), 0))
            }
            GameAction::Pass => state.last_play.clone().map(|play| {
                let owner = state
                    .last_player
                    .and_then(|p| state.others().position(|(other, _)| other == p))
                    .map_or(seat_count - 1, |i| i + 1);
                (play, owner)
            }),
        };
        if hand.is_empty() {
            return 1.0;
        }

        for turn in 1..=self.max_turns as usize {
            let seat = turn % seat_count;
            if last.as_ref().is_some_and(|(_, owner)| *owner == seat) {
                // Everyone else passed; the owner leads again.
                last = None;
            }

            if seat == 0 {
                if let Some(play) = self.choose_own(&hand, last.as_ref().map(|(p, _)| p)) {
                    remove_cards(&mut hand, &play);
                    last = Some((play, 0));
                    if hand.is_empty() {
                        return 1.0;
                    }
                }
                continue;
            }

            let index = seat - 1;
            let Some(current) = seats.get(index).copied() else {
                continue;
            };
            if current.cards == 0 {
                continue;
            }
            let friendly_trick = last.as_ref().is_some_and(|(_, owner)| {
                *owner == 0 || seats.get(owner - 1).is_some_and(|s| s.teammate)
            });
            if current.teammate && friendly_trick {
                continue;
            }

            if let Some(play) = self.simulate_hidden(current.cards, last.as_ref().map(|(p, _)| p)) {
                let shed = play.len().max(1).min(current.cards);
                seats[index].cards -= shed;
                last = Some((play, seat));
                if seats[index].cards == 0 {
                    let progress = 1.0 - hand.len() as f64 / initial as f64;
                    return if current.teammate {
                        TEAMMATE_FINISH_REWARD + PROGRESS_REWARD * progress
                    } else {
                        PROGRESS_REWARD * progress
                    };
                }
            }
        }

        let progress = 1.0 - hand.len() as f64 / initial as f64;
        0.5 * progress
    }

    /// Our move: cheapest play, or with probability `aggression` the play
    /// that sheds the most cards. Following, we sometimes hold back.
    fn choose_own(&mut self, hand: &[Card], last: Option<&Play>) -> Option<Play> {
        let options = self.rules.legal_plays(hand, last);
        if options.is_empty() {
            return None;
        }
        if last.is_some() && self.rng.gen_bool(0.2 * (1.0 - self.aggression)) {
            return None;
        }
        if self.rng.gen_bool(self.aggression) {
            options
                .iter()
                .filter(|p| !p.kind.is_bomb())
                .max_by_key(|p| (p.len(), std::cmp::Reverse(p.value)))
                .or_else(|| options.first())
                .cloned()
        } else {
            options.first().cloned()
        }
    }

    /// A hidden hand's move, built from placeholder cards.
    fn simulate_hidden(&mut self, cards: usize, last: Option<&Play>) -> Option<Play> {
        match last {
            None => {
                let size = (1 + self.rng.gen_range_usize(0..3)).min(cards);
                let kind = match size {
                    1 => PlayKind::Single,
                    2 => PlayKind::Pair,
                    _ => PlayKind::Triple,
                };
                let value = Rank::new(3 + self.rng.gen_range_usize(0..10) as u8);
                Some(hidden_play(kind, value, size))
            }
            Some(last) => {
                if cards < last.len() || last.value >= Rank::BIG_JOKER {
                    return None;
                }
                let mut chance = beat_chance(last.value);
                if last.kind.is_bomb() {
                    chance *= 0.3;
                }
                if !self.rng.gen_bool(chance) {
                    return None;
                }
                let low = last.value.value() + 1;
                let high = Rank::BIG_JOKER.value();
                let span = usize::from(high - low) + 1;
                let value = Rank::new(low + self.rng.gen_range_usize(0..span) as u8);
                Some(hidden_play(last.kind, value, last.len()))
            }
        }
    }
}

/// Placeholder play of `size` cards. Ids count down from the top of the id
/// space so they never collide with dealt cards.
fn hidden_play(kind: PlayKind, value: Rank, size: usize) -> Play {
    let cards = (0..size).map(|i| Card::new(HIDDEN_CARD_ID - i as u16, value, Suit::Spades));
    Play::new(cards, kind, value)
}

/// Chance a hidden hand holds something above `value`.
fn beat_chance(value: Rank) -> f64 {
    let headroom = f64::from(Rank::BIG_JOKER.value().saturating_sub(value.value()));
    (headroom / 14.0 * MAX_BEAT_CHANCE).clamp(0.05, MAX_BEAT_CHANCE)
}

fn remove_cards(hand: &mut Vec<Card>, play: &Play) {
    hand.retain(|c| !play.cards.iter().any(|p| p.id == c.id));
}
