//! Learning data: labelled samples and the collector that stores them.

pub mod collector;
pub mod sample;

pub use collector::{
    CollectorConfig, CollectorStatistics, DataCollector, DEFAULT_MAX_SAMPLES,
    HIGH_QUALITY_THRESHOLD, OUTCOME_WINDOW,
};
pub use sample::{GameOutcome, SampleLabel, SampleSource, TrainingSample};
