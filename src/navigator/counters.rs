//! Mutable per-run counters.

use serde::{Deserialize, Serialize};

/// Counters the loop updates between transitions.
///
/// Reset only when a run starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopCounters {
    pub current_state: String,
    /// Consecutive times the current state named itself as next
    pub repeat_count: u32,
    /// Forced recoveries so far this run
    pub recovery_count: u32,
    pub iterations: usize,
}

impl LoopCounters {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current_state: initial.into(),
            ..Self::default()
        }
    }

    /// Track a decided transition. Returns the updated repeat count.
    pub fn observe(&mut self, next: &str) -> u32 {
        if next == self.current_state {
            self.repeat_count += 1;
        } else {
            self.repeat_count = 0;
        }
        self.repeat_count
    }

    /// Count a forced recovery and start a fresh repeat streak.
    pub fn force_recovery(&mut self) -> u32 {
        self.recovery_count += 1;
        self.repeat_count = 0;
        self.recovery_count
    }
}
