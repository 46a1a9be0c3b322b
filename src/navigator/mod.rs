//! The navigation control loop and the context states run in.
//!
//! [`NavigationLoop`] owns the [`StateGraph`](crate::states::StateGraph)
//! and a [`NavContext`]. Each step runs one state, records a
//! [`TransitionRecord`](crate::core::TransitionRecord) and applies the
//! stall and recovery policy from
//! [`NavigationConfig`](crate::config::NavigationConfig).

mod context;
mod counters;
mod error;
mod machine;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{Clicked, FindOptions, NavContext};
pub use counters::LoopCounters;
pub use error::NavError;
pub use machine::{AbortReason, LoopPhase, LoopStatus, NavigationLoop, Step, Termination};
