//! Engine configuration: modules, fusion, learning, performance.
//!
//! - `brain`: [`BrainConfig`] and its sections, validation, TOML I/O
//! - `module`: per-module config, weight rules and their conditions
//! - `merge`: typed partial updates with field-level merge
//! - `presets`: named starting points

pub mod brain;
pub mod merge;
pub mod module;
pub mod presets;

pub use brain::{
    AdaptiveTuning, BrainConfig, CommunicationConfig, DataQuality, FusionConfig, FusionStrategy,
    LearningConfig, PerformanceConfig, PersonalityConfig, PersonalityPreset, SignalStyle,
    UpdateStrategy,
};
pub use merge::{
    merge_json, AdaptiveTuningPatch, BrainConfigPatch, CommunicationConfigPatch,
    FusionConfigPatch, LearningConfigPatch, ModuleConfigPatch, PerformanceConfigPatch,
};
pub use module::{
    is_complex_situation, is_simple_situation, ModuleConfig, Predicate, WeightCondition, WeightRule,
};
pub use presets::PRESET_NAMES;
