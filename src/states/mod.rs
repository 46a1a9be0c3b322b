//! State behaviors and the graph that holds them.
//!
//! Every state implements [`NavState`]. Three shapes ship with the crate:
//!
//! - [`ImageState`]: find a landmark, click it, go to a fixed next state
//! - [`FnState`]: any closure the integrator supplies
//! - [`RecoveryState`]: identify an unknown screen or press the fallback key
//!
//! [`TerminalState`] ends the run. Anything else implements the trait
//! directly and is registered the same way.

mod custom;
mod error;
mod graph;
mod image;
mod recovery;
mod state;

pub use custom::{FnState, TerminalState};
pub use error::{GraphError, StateError};
pub use graph::StateGraph;
pub use image::ImageState;
pub use recovery::RecoveryState;
pub use state::NavState;
