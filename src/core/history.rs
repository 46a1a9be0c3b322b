//! Transition history tracking.
//!
//! Every executed state produces one [`TransitionRecord`]. Records are
//! collected in an append-only [`TransitionHistory`] that drives the
//! statistics report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a single state execution ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The state moved on to a different state.
    Success,
    /// The state failed and was routed through its error handler.
    Failed,
    /// The state asked to run again, or was forced into recovery.
    Retry,
    /// The state ended navigation.
    Terminated,
}

impl TransitionOutcome {
    /// Whether this outcome counts toward the success rate.
    ///
    /// Reaching a terminal state is the goal of a run, so it counts.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Terminated)
    }
}

/// Record of a single state execution.
///
/// # Example
///
/// ```rust
/// use menupilot::core::{TransitionOutcome, TransitionRecord};
/// use chrono::Utc;
/// use std::time::Duration;
///
/// let record = TransitionRecord {
///     from_state: "start_menu".to_string(),
///     to_state: Some("solo_menu".to_string()),
///     timestamp: Utc::now(),
///     duration: Duration::from_millis(420),
///     outcome: TransitionOutcome::Success,
///     error_message: None,
/// };
/// assert!(record.outcome.is_success());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state that was executed
    pub from_state: String,
    /// The state chosen next, `None` when navigation ended
    pub to_state: Option<String>,
    /// When execution started
    pub timestamp: DateTime<Utc>,
    /// How long the state took to execute
    pub duration: Duration,
    pub outcome: TransitionOutcome,
    pub error_message: Option<String>,
}

impl TransitionRecord {
    /// True when the state chose itself as the next state.
    pub fn is_self_transition(&self) -> bool {
        self.to_state.as_deref() == Some(self.from_state.as_str())
    }
}

/// Ordered, append-only history of state executions.
///
/// `record` returns a new history with the record appended; existing
/// records are never touched.
///
/// # Example
///
/// ```rust
/// use menupilot::core::{TransitionHistory, TransitionOutcome, TransitionRecord};
/// use chrono::Utc;
/// use std::time::Duration;
///
/// let step = |from: &str, to: Option<&str>, outcome| TransitionRecord {
///     from_state: from.to_string(),
///     to_state: to.map(str::to_string),
///     timestamp: Utc::now(),
///     duration: Duration::ZERO,
///     outcome,
///     error_message: None,
/// };
///
/// let history = TransitionHistory::new()
///     .record(step("start", Some("menu"), TransitionOutcome::Success))
///     .record(step("menu", None, TransitionOutcome::Terminated));
///
/// assert_eq!(history.get_path(), vec!["start", "menu"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: Vec<TransitionRecord>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record, returning the extended history.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Names of the states visited, in order.
    ///
    /// Starts with the first executed state and follows each record's
    /// target. A terminating record adds nothing.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(first.from_state.as_str());
        }
        for record in &self.records {
            if let Some(to) = &record.to_state {
                path.push(to.as_str());
            }
        }
        path
    }

    /// Wall-clock span between the first and last record.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let span = last.timestamp.signed_duration_since(first.timestamp);
            span.to_std().ok()
        } else {
            None
        }
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.last()
    }
}
