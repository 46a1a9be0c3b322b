//! Errors raised by state behaviors and the state graph.

use crate::action::InputError;
use crate::vision::AssetError;
use thiserror::Error;

/// Failure inside a state's `on_enter` or `execute`.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("State behavior failed: {0}")]
    Failed(String),
}

impl StateError {
    /// Asset errors end the run; everything else becomes a next-state decision.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Asset(_))
    }
}

/// Errors from registering or looking up states.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("State '{name}' is already registered")]
    Duplicate { name: String },

    #[error("State '{name}' not found")]
    NotFound { name: String },

    #[error("State '{state}' can transition to unregistered state '{target}'")]
    UnknownTarget { state: String, target: String },
}
