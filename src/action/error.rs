//! Input injection errors.

use thiserror::Error;

/// Failures reported by an input device. Transient: callers retry or fall
/// back, they never abort navigation on these.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("Pointer move to ({x}, {y}) failed: {reason}")]
    MoveFailed { x: i32, y: i32, reason: String },

    #[error("Click at ({x}, {y}) failed: {reason}")]
    ClickFailed { x: i32, y: i32, reason: String },

    #[error("Key press '{key}' failed: {reason}")]
    KeyFailed { key: String, reason: String },

    #[error("Typing '{text}' failed: {reason}")]
    TypeFailed { text: String, reason: String },

    #[error("Input cancelled by stop signal")]
    Cancelled,
}
