//! # ccg-brain
//!
//! Decision-fusion engine for AI seats in a shedding card game.
//!
//! ## Design Principles
//!
//! 1. **Pluggable Modules**: Decision backends implement one contract
//!    ([`DecisionModule`]) and are registered at runtime. The engine never
//!    depends on how a module decides.
//!
//! 2. **Failure Isolation**: A module that errors, panics or runs past its
//!    time budget is dropped from the current cycle. Every cycle ends in a
//!    decision.
//!
//! 3. **Order-Independent Fusion**: Candidates are canonicalized before
//!    fusion, so the result never depends on which module answered first.
//!
//! ## Architecture
//!
//! - **Read-Only Snapshots**: The engine only reads [`GameState`]s produced
//!   by the surrounding game loop. Hands and play history are `im-rs`
//!   vectors, so snapshots clone in O(1) for the context window.
//!
//! - **Concurrent Fan-Out**: Module calls run concurrently under
//!   `tokio::time::timeout`; CPU-bound search runs on blocking threads.
//!
//! ## Modules
//!
//! - `core`: Cards, actions, snapshots, players, RNG, errors
//! - `rules`: Play classification and legality
//! - `cognitive`: Situation analysis before any module runs
//! - `config`: Engine configuration, presets and partial updates
//! - `modules`: Module contract and built-in modules
//! - `fusion`: Combining candidates into a decision
//! - `context`: Recent states, decisions and history
//! - `learning`: Training samples and their store
//! - `brain`: The orchestrator

pub mod core;
pub mod rules;
pub mod cognitive;
pub mod config;
pub mod modules;
pub mod fusion;
pub mod context;
pub mod learning;
pub mod brain;

// Re-export commonly used types
pub use crate::core::{
    Card, CardId, Rank, Suit,
    ActionKey, GameAction, Play, PlayKind,
    PlayerId, SeededRng,
    GamePhase, GameState, PlayRecord, TeamConfig,
    BrainError, ModuleError, ModuleResult, Result,
};

pub use crate::rules::{PlayRules, StandardRules};

pub use crate::cognitive::{
    CognitiveLayer, SituationAnalysis, StrategicIntent,
    Threat, ThreatKind, Opportunity, OpportunityKind,
};

pub use crate::config::{
    BrainConfig, BrainConfigPatch, FusionStrategy, ModuleConfig, ModuleConfigPatch,
    PersonalityConfig, PersonalityPreset, WeightCondition, WeightRule,
};

pub use crate::modules::{
    ActionSuggestion, DecisionModule, ModuleAnalysis, ModuleCore, ModuleStatistics,
    RuleModule, SearchModule, Trainable,
};

pub use crate::fusion::{Decision, DecisionSource, FusionLayer, FusionMethod, RiskLevel};

pub use crate::context::ContextManager;

pub use crate::learning::{DataCollector, GameOutcome, SampleLabel, TrainingSample};

pub use crate::brain::{
    event_channel, Brain, BrainEvent, BrainMetrics, BrainState, CancelHandle, ModuleStatus,
};
