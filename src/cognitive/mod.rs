//! Cognitive layer: what the table looks like before any module runs.

pub mod analysis;
pub mod layer;

pub use analysis::{
    CooperationKind, CooperationOpportunity, FactorKind, KeyFactor, Opportunity,
    OpportunityKind, PlayStyle, PlayerStatus, SituationAnalysis, StrategicIntent, TeamContext,
    TeamStrategy, Threat, ThreatKind,
};
pub use layer::CognitiveLayer;
