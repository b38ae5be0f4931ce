//! Error types.
//!
//! Two layers: [`ModuleError`] is what a decision module reports to the
//! orchestrator, and it never escapes `make_decision`. [`BrainError`] is
//! what the public API returns, which in practice means configuration
//! problems and lifecycle misuse.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrainError {
    #[error("Invalid config: {}", .0.join(", "))]
    InvalidConfig(Vec<String>),

    #[error("Fallback module '{0}' is not registered")]
    UnknownFallbackModule(String),

    #[error("Unknown weight condition: {0}")]
    UnknownCondition(String),

    #[error("Brain not initialized")]
    NotInitialized,

    #[error("Brain not active")]
    NotActive,

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BrainError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    #[error("Module {0} not initialized")]
    NotInitialized(String),

    #[error("Module {module} failed: {reason}")]
    Failed { module: String, reason: String },

    #[error("Module {module} has invalid option '{option}': {reason}")]
    InvalidOption {
        module: String,
        option: String,
        reason: String,
    },

    #[error("Module {module} worker did not complete: {reason}")]
    Join { module: String, reason: String },
}

impl ModuleError {
    /// Convenience constructor for a generic failure.
    pub fn failed(module: impl Into<String>, reason: impl Into<String>) -> Self {
        ModuleError::Failed {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

pub type ModuleResult<T> = std::result::Result<T, ModuleError>;
