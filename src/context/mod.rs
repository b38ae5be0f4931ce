//! Context manager: what the engine remembers between decisions.

pub mod manager;

pub use manager::{
    ContextManager, ContextStatistics, ExecutionResult, HistoryRecord, HISTORY_SIZE,
    RECENT_DECISIONS, RECENT_STATES,
};
