//! Build errors for graph and navigator builders.

use crate::config::ConfigViolation;
use crate::states::GraphError;
use crate::vision::AssetError;
use thiserror::Error;

/// Errors that can occur when assembling a navigator.
///
/// All of them are configuration mistakes and surface before any state runs.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("State graph not specified. Call .graph(graph) before .build()")]
    MissingGraph,

    #[error("Frame source not specified. Call .frame_source(source) before .build()")]
    MissingFrameSource,

    #[error("Input device not specified. Call .input(device) before .build()")]
    MissingInput,

    #[error("State '{name}' is registered more than once")]
    DuplicateState { name: String },

    #[error("The {role} state '{name}' is not registered")]
    UnknownState { role: &'static str, name: String },

    #[error("{} state target(s) point at unregistered states", .0.len())]
    DanglingTargets(Vec<GraphError>),

    #[error("Invalid configuration: {} violation(s)", .0.len())]
    InvalidConfig(Vec<ConfigViolation>),

    #[error("Templates missing from the library: {}", .0.join(", "))]
    MissingTemplates(Vec<String>),

    #[error(transparent)]
    Asset(#[from] AssetError),
}
