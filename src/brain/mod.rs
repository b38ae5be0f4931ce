//! The orchestrator and what it reports.
//!
//! - `brain`: [`Brain`], its lifecycle and the decision cycle
//! - `events`: optional notification stream
//! - `metrics`: call metrics and state snapshots

#[allow(clippy::module_inception)]
pub mod brain;
pub mod events;
pub mod metrics;

pub use brain::{Brain, CancelHandle};
pub use events::{event_channel, BrainEvent, EventReceiver, EventSender};
pub use metrics::{BrainMetrics, BrainState, ModuleMetrics, ModuleStatus, LATENCY_ALPHA};
