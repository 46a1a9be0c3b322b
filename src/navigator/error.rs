//! Errors that end a navigation run abnormally.

use crate::states::GraphError;
use crate::vision::AssetError;
use thiserror::Error;

/// The only failures that unwind the loop. Stalls, missed matches and
/// failed clicks become next-state decisions instead.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("State '{name}' not found in the state graph")]
    StateNotFound { name: String },

    #[error("Navigation has not been started. Call .start(state) first")]
    NotStarted,

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
