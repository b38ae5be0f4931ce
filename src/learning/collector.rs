//! Sample store for training.
//!
//! A bounded FIFO of [`TrainingSample`]s: when full, the oldest sample is
//! dropped. Samples are gathered from the context manager's history,
//! labelled when a game ends, and handed to trainable modules in seeded
//! random batches.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DataQuality, LearningConfig};
use crate::context::ContextManager;
use crate::core::{GameState, Result, SeededRng};
use crate::fusion::Decision;

use super::sample::{GameOutcome, SampleLabel, SampleSource, TrainingSample};

/// Default sample capacity.
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Minimum quality for `high_quality_only` collection.
pub const HIGH_QUALITY_THRESHOLD: f64 = 0.7;

/// Samples labelled by one game outcome, newest first.
pub const OUTCOME_WINDOW: usize = 20;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub enabled: bool,
    pub max_samples: usize,
    /// Samples below this quality are dropped on collection.
    pub quality_threshold: Option<f64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_samples: DEFAULT_MAX_SAMPLES,
            quality_threshold: None,
        }
    }
}

impl CollectorConfig {
    /// Collector settings implied by the learning section.
    pub fn from_learning(learning: &LearningConfig) -> Self {
        Self {
            enabled: learning.collect_data,
            max_samples: DEFAULT_MAX_SAMPLES,
            quality_threshold: match learning.data_quality {
                DataQuality::All => None,
                DataQuality::HighQualityOnly => Some(HIGH_QUALITY_THRESHOLD),
            },
        }
    }

    #[must_use]
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    #[must_use]
    pub fn with_quality_threshold(mut self, threshold: f64) -> Self {
        self.quality_threshold = Some(threshold);
        self
    }
}

/// Summary of the stored samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectorStatistics {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub avg_quality: f64,
    pub by_source: BTreeMap<SampleSource, usize>,
}

#[derive(Clone, Debug, Default)]
pub struct DataCollector {
    samples: VecDeque<TrainingSample>,
    config: CollectorConfig,
    /// Newest decision already taken from a context history.
    collected_until: Option<DateTime<Utc>>,
}

impl DataCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            samples: VecDeque::new(),
            config,
            collected_until: None,
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Replace the settings; samples already stored are kept up to the new
    /// capacity.
    pub fn set_config(&mut self, config: CollectorConfig) {
        self.config = config;
        while self.samples.len() > self.config.max_samples {
            self.samples.pop_front();
        }
    }

    /// Store a sample. Returns false when collection is off or the sample
    /// is below the quality threshold.
    pub fn collect_sample(&mut self, sample: TrainingSample) -> bool {
        if !self.config.enabled || self.config.max_samples == 0 {
            return false;
        }
        if self.config.quality_threshold.is_some_and(|t| sample.quality < t) {
            return false;
        }
        if self.samples.len() >= self.config.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        true
    }

    /// Store a sample for one decision.
    pub fn collect_decision(&mut self, state: GameState, decision: &Decision) -> bool {
        self.collect_sample(TrainingSample::from_decision(state, decision))
    }

    /// Store a sample for every decided record in the context's history
    /// that was not collected by an earlier call. Returns how many were
    /// accepted.
    pub fn collect_from_context(&mut self, context: &ContextManager) -> usize {
        let since = self.collected_until;
        let fresh: Vec<TrainingSample> = context
            .training_samples()
            .into_iter()
            .filter(|sample| since.map_or(true, |t| sample.timestamp > t))
            .collect();
        if let Some(newest) = fresh.iter().map(|s| s.timestamp).max() {
            self.collected_until = Some(newest);
        }
        let accepted = fresh
            .into_iter()
            .map(|sample| self.collect_sample(sample))
            .filter(|&accepted| accepted)
            .count();
        debug!(accepted, total = self.samples.len(), "collected samples from context");
        accepted
    }

    /// Label the most recent [`OUTCOME_WINDOW`] samples with a finished game.
    pub fn label_game_outcome(&mut self, outcome: &GameOutcome) {
        for sample in self.samples.iter_mut().rev().take(OUTCOME_WINDOW) {
            sample.label_outcome(outcome);
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = &TrainingSample> {
        self.samples.iter()
    }

    pub fn high_quality_samples(&self, min_quality: f64) -> Vec<&TrainingSample> {
        self.samples.iter().filter(|s| s.quality >= min_quality).collect()
    }

    pub fn positive_samples(&self) -> Vec<&TrainingSample> {
        self.with_label(SampleLabel::Positive)
    }

    pub fn negative_samples(&self) -> Vec<&TrainingSample> {
        self.with_label(SampleLabel::Negative)
    }

    fn with_label(&self, label: SampleLabel) -> Vec<&TrainingSample> {
        self.samples.iter().filter(|s| s.label == label).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn statistics(&self) -> CollectorStatistics {
        let mut stats = CollectorStatistics {
            total: self.samples.len(),
            ..CollectorStatistics::default()
        };
        let mut quality = 0.0;
        for sample in &self.samples {
            match sample.label {
                SampleLabel::Positive => stats.positive += 1,
                SampleLabel::Negative => stats.negative += 1,
                SampleLabel::Neutral => stats.neutral += 1,
            }
            *stats.by_source.entry(sample.source).or_insert(0) += 1;
            quality += sample.quality;
        }
        if stats.total > 0 {
            stats.avg_quality = quality / stats.total as f64;
        }
        stats
    }

    /// Random batch of up to `batch_size` distinct samples.
    ///
    /// Uses the provided seed for reproducibility.
    pub fn sample_batch(&self, batch_size: usize, seed: u64) -> Vec<TrainingSample> {
        if self.samples.is_empty() || batch_size == 0 {
            return Vec::new();
        }

        let mut rng = SeededRng::new(seed);
        let mut indices: Vec<usize> = (0..self.samples.len()).collect();
        rng.partial_shuffle(&mut indices, batch_size);

        indices
            .into_iter()
            .take(batch_size)
            .filter_map(|i| self.samples.get(i).cloned())
            .collect()
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.samples)?)
    }

    /// Replace the stored samples. On error nothing changes.
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let samples: VecDeque<TrainingSample> = serde_json::from_str(json)?;
        Ok(self.replace(samples))
    }

    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.samples)?)
    }

    /// Replace the stored samples from [`export_bytes`](Self::export_bytes) output.
    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let samples: VecDeque<TrainingSample> = bincode::deserialize(bytes)?;
        Ok(self.replace(samples))
    }

    fn replace(&mut self, mut samples: VecDeque<TrainingSample>) -> usize {
        while samples.len() > self.config.max_samples {
            samples.pop_front();
        }
        self.samples = samples;
        debug!(count = self.samples.len(), "imported samples");
        self.samples.len()
    }
}
