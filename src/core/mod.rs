//! Core types: cards, actions, game snapshots, players, RNG, errors.
//!
//! These are the values that flow through every layer of the engine. The
//! engine never mutates a [`GameState`]; it only reads snapshots produced
//! by the surrounding game loop.

pub mod card;
pub mod action;
pub mod player;
pub mod state;
pub mod rng;
pub mod error;

pub use card::{Card, CardId, Rank, Suit};
pub use action::{ActionKey, GameAction, Play, PlayCards, PlayKind};
pub use player::PlayerId;
pub use state::{GamePhase, GameState, PlayRecord, TeamConfig};
pub use rng::SeededRng;
pub use error::{BrainError, ModuleError, ModuleResult, Result};
