//! Bounded memory of recent snapshots and decisions.
//!
//! The manager keeps three FIFO windows: recent states, recent decisions,
//! and a longer history of records pairing each snapshot with the decision
//! made from it and, once known, what happened next. Snapshots clone in
//! O(1) because hand and play history are persistent vectors.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cognitive::SituationAnalysis;
use crate::core::{GameAction, GameState, Result};
use crate::fusion::Decision;
use crate::learning::TrainingSample;

/// Recent snapshots kept.
pub const RECENT_STATES: usize = 10;

/// Recent decisions kept.
pub const RECENT_DECISIONS: usize = 10;

/// History records kept.
pub const HISTORY_SIZE: usize = 100;

/// What actually happened after a decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub action: GameAction,
    pub result_state: GameState,
    pub timestamp: DateTime<Utc>,
}

/// One snapshot and what came of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub state: GameState,
    pub decision: Option<Decision>,
    pub analysis: Option<SituationAnalysis>,
    pub execution: Option<ExecutionResult>,
}

impl HistoryRecord {
    fn new(state: GameState) -> Self {
        Self {
            timestamp: Utc::now(),
            state,
            decision: None,
            analysis: None,
            execution: None,
        }
    }
}

/// Decision counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStatistics {
    pub total_decisions: u64,
    pub pass_count: u64,
    pub play_count: u64,
}

#[derive(Clone, Debug)]
pub struct ContextManager {
    recent_states: VecDeque<GameState>,
    recent_decisions: VecDeque<Decision>,
    history: VecDeque<HistoryRecord>,
    history_capacity: usize,
    statistics: ContextStatistics,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, capacity: usize) {
    if capacity == 0 {
        return;
    }
    while buffer.len() >= capacity {
        buffer.pop_front();
    }
    buffer.push_back(item);
}

impl ContextManager {
    pub fn new() -> Self {
        Self::with_history_capacity(HISTORY_SIZE)
    }

    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            recent_states: VecDeque::with_capacity(RECENT_STATES),
            recent_decisions: VecDeque::with_capacity(RECENT_DECISIONS),
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            statistics: ContextStatistics::default(),
        }
    }

    /// Remember a new snapshot and open a history record for it.
    pub fn update_context(&mut self, state: &GameState) {
        push_bounded(&mut self.recent_states, state.clone(), RECENT_STATES);
        push_bounded(
            &mut self.history,
            HistoryRecord::new(state.clone()),
            self.history_capacity,
        );
    }

    /// Count a decision and attach it to the newest history record.
    pub fn record_decision(&mut self, decision: &Decision, analysis: Option<&SituationAnalysis>) {
        push_bounded(&mut self.recent_decisions, decision.clone(), RECENT_DECISIONS);

        self.statistics.total_decisions += 1;
        if decision.action.is_pass() {
            self.statistics.pass_count += 1;
        } else {
            self.statistics.play_count += 1;
        }

        if let Some(record) = self.history.back_mut() {
            record.decision = Some(decision.clone());
            record.analysis = analysis.cloned();
        }
    }

    /// Attach the real outcome of `decision` to the newest history record.
    pub fn record_action_execution(&mut self, decision: &Decision, result_state: GameState) {
        if let Some(record) = self.history.back_mut() {
            record.execution = Some(ExecutionResult {
                action: decision.action.clone(),
                result_state,
                timestamp: Utc::now(),
            });
        }
    }

    /// Up to `count` most recent snapshots, oldest first.
    pub fn recent_states(&self, count: usize) -> Vec<&GameState> {
        let skip = self.recent_states.len().saturating_sub(count);
        self.recent_states.iter().skip(skip).collect()
    }

    /// Up to `count` most recent decisions, oldest first.
    pub fn recent_decisions(&self, count: usize) -> Vec<&Decision> {
        let skip = self.recent_decisions.len().saturating_sub(count);
        self.recent_decisions.iter().skip(skip).collect()
    }

    pub fn history(&self) -> &VecDeque<HistoryRecord> {
        &self.history
    }

    pub fn statistics(&self) -> ContextStatistics {
        self.statistics
    }

    /// One unlabelled sample per history record that has a decision.
    pub fn training_samples(&self) -> Vec<TrainingSample> {
        self.history
            .iter()
            .filter_map(|record| {
                let decision = record.decision.as_ref()?;
                let sample = TrainingSample::from_decision(record.state.clone(), decision);
                Some(match &record.analysis {
                    Some(analysis) => sample.with_analysis(analysis.clone()),
                    None => sample,
                })
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.recent_states.clear();
        self.recent_decisions.clear();
        self.history.clear();
        self.statistics = ContextStatistics::default();
    }

    /// History as JSON.
    pub fn export_history(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.history)?)
    }

    /// Replace the history with previously exported JSON. Keeps the newest
    /// records if the import is larger than the history window. On error
    /// the current history is left untouched.
    pub fn import_history(&mut self, json: &str) -> Result<()> {
        let mut history: VecDeque<HistoryRecord> = serde_json::from_str(json)?;
        while history.len() > self.history_capacity {
            history.pop_front();
        }
        self.history = history;
        Ok(())
    }
}
