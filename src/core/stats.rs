//! Aggregate metrics derived from a transition history.

use super::history::{TransitionHistory, TransitionOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-state execution counters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStats {
    pub executions: usize,
    pub successes: usize,
    pub failures: usize,
    pub total_time: Duration,
    pub average_time: Duration,
}

impl StateStats {
    pub fn success_rate(&self) -> f64 {
        ratio(self.successes, self.executions)
    }
}

/// Aggregate view of a navigation run.
///
/// Computed from the history alone, so deriving it twice from the same
/// history yields identical numbers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationStats {
    pub total_transitions: usize,
    pub successful_transitions: usize,
    pub failed_transitions: usize,
    /// Successful transitions over total transitions, 0.0 for an empty run.
    pub success_rate: f64,
    /// How many times each state was executed
    pub visits: BTreeMap<String, usize>,
    pub per_state: BTreeMap<String, StateStats>,
    pub mean_duration: Duration,
    /// Longest run of consecutive executions of a single state
    pub longest_repeat_streak: usize,
}

impl NavigationStats {
    pub fn from_history(history: &TransitionHistory) -> Self {
        let records = history.records();
        let mut stats = NavigationStats {
            total_transitions: records.len(),
            ..Default::default()
        };

        let mut total_time = Duration::ZERO;
        let mut streak = 0usize;
        let mut previous: Option<&str> = None;

        for record in records {
            let success = record.outcome.is_success();
            if success {
                stats.successful_transitions += 1;
            }
            if record.outcome == TransitionOutcome::Failed {
                stats.failed_transitions += 1;
            }
            total_time += record.duration;

            *stats.visits.entry(record.from_state.clone()).or_insert(0) += 1;

            let entry = stats.per_state.entry(record.from_state.clone()).or_default();
            entry.executions += 1;
            entry.total_time += record.duration;
            if success {
                entry.successes += 1;
            } else if record.outcome == TransitionOutcome::Failed {
                entry.failures += 1;
            }

            streak = if previous == Some(record.from_state.as_str()) {
                streak + 1
            } else {
                1
            };
            stats.longest_repeat_streak = stats.longest_repeat_streak.max(streak);
            previous = Some(record.from_state.as_str());
        }

        for entry in stats.per_state.values_mut() {
            entry.average_time = mean(entry.total_time, entry.executions);
        }

        stats.success_rate = ratio(stats.successful_transitions, stats.total_transitions);
        stats.mean_duration = mean(total_time, stats.total_transitions);
        stats
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

fn mean(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(n) => total / n,
        Err(_) => Duration::from_secs_f64(total.as_secs_f64() / count as f64),
    }
}
