//! Serializable summary of a navigation run.
//!
//! A [`RunReport`] carries the full transition history together with the
//! derived statistics, so a logging or CLI layer can render a run without
//! access to the loop. Reports encode to pretty JSON for people and to
//! bincode for compact storage.

mod error;

pub use error::ReportError;

use crate::core::{NavigationStats, TransitionHistory};
use crate::navigator::{LoopCounters, Termination};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Version identifier for the report format
pub const REPORT_VERSION: u32 = 1;

/// Everything known about one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Report format version
    pub version: u32,

    /// Unique report identifier
    pub id: Uuid,

    pub started_at: DateTime<Utc>,

    /// Unset while the run is still going
    pub finished_at: Option<DateTime<Utc>>,

    pub initial_state: String,

    /// Unset while the run is still going
    pub termination: Option<Termination>,

    pub counters: LoopCounters,

    /// Complete transition history
    pub history: TransitionHistory,

    /// Aggregates derived from `history`
    pub stats: NavigationStats,
}

impl RunReport {
    pub fn new(
        initial_state: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: Option<DateTime<Utc>>,
        termination: Option<Termination>,
        counters: LoopCounters,
        history: TransitionHistory,
    ) -> Self {
        let stats = NavigationStats::from_history(&history);
        Self {
            version: REPORT_VERSION,
            id: Uuid::new_v4(),
            started_at,
            finished_at,
            initial_state: initial_state.into(),
            termination,
            counters,
            history,
            stats,
        }
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReportError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        let report: Self = serde_json::from_str(json)
            .map_err(|e| ReportError::DeserializationFailed(e.to_string()))?;
        report.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ReportError> {
        bincode::serialize(self).map_err(|e| ReportError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReportError> {
        let report: Self = bincode::deserialize(bytes)
            .map_err(|e| ReportError::DeserializationFailed(e.to_string()))?;
        report.check_version()
    }

    /// Write the report as JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    fn check_version(self) -> Result<Self, ReportError> {
        if self.version != REPORT_VERSION {
            return Err(ReportError::UnsupportedVersion {
                found: self.version,
                supported: REPORT_VERSION,
            });
        }
        Ok(self)
    }
}
