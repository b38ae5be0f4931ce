//! Notifications emitted by the brain.
//!
//! Subscribers receive events through an unbounded channel handed to
//! [`Brain::with_events`](super::Brain::with_events). Sending never blocks
//! a decision; a dropped receiver is ignored.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::core::GameAction;
use crate::fusion::FusionMethod;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BrainEvent {
    DecisionMade {
        action: GameAction,
        confidence: f64,
        method: FusionMethod,
        compute_time_ms: f64,
    },
    ModuleTimedOut {
        module: String,
        timeout_ms: u64,
    },
    ModuleFailed {
        module: String,
        reason: String,
    },
    /// No candidate survived the cycle. `module` is the fallback module
    /// when it produced the decision.
    FallbackUsed {
        module: Option<String>,
        reason: String,
    },
    ConfigUpdated,
}

pub type EventSender = mpsc::UnboundedSender<BrainEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<BrainEvent>;

/// New event channel.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
