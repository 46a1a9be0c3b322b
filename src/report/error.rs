//! Report error types.

use thiserror::Error;

/// Errors that can occur while encoding or decoding a run report
#[derive(Debug, Error)]
pub enum ReportError {
    /// Encoding to JSON or binary failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Decoding from JSON or binary failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Report was written by an incompatible version
    #[error("Unsupported report version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Failed to access report file: {0}")]
    Io(#[from] std::io::Error),
}
