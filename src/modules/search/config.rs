//! Search module parameters.

use serde::{Deserialize, Serialize};

use crate::config::ModuleConfig;
use crate::core::{ModuleError, ModuleResult};

/// Search parameters, read from the module's `options`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Rollouts per analysis.
    pub iterations: u32,

    /// UCB1 exploration constant (default: 1.414).
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Random seed for rollouts.
    /// Same seed and call sequence produce the same searches.
    pub seed: u64,

    /// Turns simulated before a rollout is scored as unfinished.
    pub max_rollout_turns: u32,

    /// Initial rollout bias toward shedding big combinations (0-1).
    pub aggression: f64,

    /// Step size used when learning from labelled samples.
    pub learning_rate: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            exploration_constant: 1.414,
            seed: 42,
            max_rollout_turns: 200,
            aggression: 0.5,
            learning_rate: 0.01,
        }
    }
}

impl SearchConfig {
    /// Read options over the defaults. Unknown keys are ignored; known keys
    /// with unusable values are an error.
    pub fn from_module_config(module: &str, config: &ModuleConfig) -> ModuleResult<Self> {
        let invalid = |option: &str, reason: &str| ModuleError::InvalidOption {
            module: module.to_string(),
            option: option.to_string(),
            reason: reason.to_string(),
        };
        let mut search = Self::default();

        if config.options.contains_key("iterations") {
            let iterations = config
                .option_u64("iterations")
                .filter(|&n| n > 0)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| invalid("iterations", "expected a positive integer"))?;
            search.iterations = iterations;
        }
        if config.options.contains_key("exploration_constant") {
            search.exploration_constant = config
                .option_f64("exploration_constant")
                .filter(|c| c.is_finite() && *c >= 0.0)
                .ok_or_else(|| invalid("exploration_constant", "expected a non-negative number"))?;
        }
        if config.options.contains_key("seed") {
            search.seed = config
                .option_u64("seed")
                .ok_or_else(|| invalid("seed", "expected an unsigned integer"))?;
        }
        if config.options.contains_key("aggression") {
            search.aggression = config
                .option_f64("aggression")
                .filter(|a| (0.0..=1.0).contains(a))
                .ok_or_else(|| invalid("aggression", "expected a number between 0 and 1"))?;
        }
        if config.options.contains_key("learning_rate") {
            search.learning_rate = config
                .option_f64("learning_rate")
                .filter(|r| (0.0..=1.0).contains(r))
                .ok_or_else(|| invalid("learning_rate", "expected a number between 0 and 1"))?;
        }
        Ok(search)
    }

    /// Create a new config with custom iteration count.
    #[must_use]
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Create a new config with custom exploration constant.
    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Create a new config with custom seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_aggression(mut self, aggression: f64) -> Self {
        self.aggression = aggression;
        self
    }
}
