//! Decision modules.
//!
//! Every backend implements [`DecisionModule`]. Built-in modules share
//! [`ModuleCore`] for configuration, lifecycle and statistics:
//!
//! - [`SearchModule`] (`"mcts"`): Monte-Carlo search over legal plays
//! - [`RuleModule`] (`"rule"`): heuristic scoring of legal plays

pub mod base;
pub mod rule;
pub mod search;
pub mod stats;
pub mod suggestion;
pub mod traits;

pub use base::ModuleCore;
pub use rule::{RuleModule, RULE_MODULE_NAME};
pub use search::{SearchConfig, SearchModule, SEARCH_MODULE_NAME};
pub use stats::ModuleStatistics;
pub use suggestion::{ActionSuggestion, ModuleAnalysis};
pub use traits::{DecisionModule, Trainable, EVALUATE_DEPTH, UNRANKED_SCORE};
