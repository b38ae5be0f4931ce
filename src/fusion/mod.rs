//! Fusion layer: combine module candidates into one [`Decision`].
//!
//! Four strategies are available:
//! - `weighted_average`: highest weight x confidence
//! - `voting`: pooled votes per canonical action
//! - `cascade`: confidence first, near-ties broken by weight
//! - `adaptive`: one of the above, chosen from situation complexity
//!
//! Every strategy is independent of candidate arrival order.

pub mod decision;
pub mod layer;
pub mod policy;

pub use decision::{Decision, DecisionSource, FusionMethod, RiskLevel, SAFE_PASS_CONFIDENCE};
pub use layer::{FusionLayer, MAX_ALTERNATIVES};
pub use policy::{
    weighted_confidence, Adaptive, AdaptiveChoice, Cascade, Fused, FusionPolicy, Voting,
    WeightedAverage, CASCADE_TIE_GAP,
};
