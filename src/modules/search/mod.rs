//! Monte-Carlo search module.
//!
//! A flat UCB1 bandit over our candidate actions, with each arm scored by
//! playouts in which hidden hands are simulated from their sizes.
//!
//! ## Example
//!
//! ```
//! use ccg_brain::core::{Card, GameState, PlayerId, Rank, Suit};
//! use ccg_brain::modules::search::{SearchConfig, SearchModule};
//! use ccg_brain::rules::StandardRules;
//!
//! let hand = [
//!     Card::new(0, Rank::new(5), Suit::Hearts),
//!     Card::new(1, Rank::new(5), Suit::Spades),
//! ];
//! let state = GameState::new(PlayerId::new(0), 4, hand);
//! let config = SearchConfig::default().with_iterations(64);
//! let bandit = SearchModule::run_search(&StandardRules, &state, &config, 0.5, 1);
//! assert_eq!(bandit.visits, 64);
//! ```

pub mod bandit;
pub mod config;
pub mod module;
pub mod rollout;

pub use bandit::{Arm, Bandit};
pub use config::SearchConfig;
pub use module::{SearchModule, SEARCH_MODULE_NAME};
pub use rollout::Rollout;
