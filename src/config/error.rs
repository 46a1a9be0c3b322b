//! Configuration error types.

use thiserror::Error;

/// A single rejected configuration value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("vision.threshold must be within [0.0, 1.0] (got {value})")]
    ThresholdOutOfRange { value: f64 },

    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} is too large to represent as a duration (got {value})")]
    DurationOverflow { field: &'static str, value: f64 },

    #[error("{field} rounds down to zero (got {value})")]
    DurationUnderflow { field: &'static str, value: f64 },

    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

/// Errors raised while loading or saving a configuration document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration rejected with {} violation(s): {}", .0.len(), summarize(.0))]
    Invalid(Vec<ConfigViolation>),
}

fn summarize(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
