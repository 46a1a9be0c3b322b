//! Core value types for navigation.
//!
//! This module holds the pure part of the crate:
//! - Screen geometry shared by matching and input
//! - Append-only transition history
//! - Statistics derived from that history
//!
//! Nothing in here captures frames, injects input or sleeps.

mod geometry;
mod history;
mod stats;

pub use geometry::{Point, Region};
pub use history::{TransitionHistory, TransitionOutcome, TransitionRecord};
pub use stats::{NavigationStats, StateStats};
