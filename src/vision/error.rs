//! Vision and asset error types.

use std::path::PathBuf;
use thiserror::Error;

/// Template asset problems. These are configuration errors and are never
/// retried.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Template '{name}' is not loaded")]
    MissingTemplate { name: String },

    #[error("Template file {} not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to decode template {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
}

/// Screen capture failures. Transient: a failed capture counts as a miss.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CaptureError {
    #[error("Capture backend unavailable: {0}")]
    Unavailable(String),

    #[error("Capture failed: {0}")]
    Failed(String),
}
