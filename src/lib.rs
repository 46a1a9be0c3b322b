//! Menupilot: template-matching navigation for game menus
//!
//! Menupilot drives a graphical application by capturing the screen, looking
//! for known UI landmarks with template matching, and clicking or pressing
//! keys to move from menu to menu until a target screen is reached.
//!
//! # Core Concepts
//!
//! - **States**: named behaviors implementing [`NavState`] that inspect the
//!   screen, act, and name the next state
//! - **Graph**: a [`StateGraph`] of uniquely named states
//! - **Loop**: the [`NavigationLoop`] that runs states, detects stalls, forces
//!   recovery and gives up after too many recoveries
//! - **History**: an append-only [`TransitionHistory`] and the
//!   [`NavigationStats`] derived from it
//!
//! Capture and input are traits ([`vision::FrameSource`],
//! [`action::InputDevice`]); the [`sim`] module has in-memory versions for
//! dry runs and tests.
//!
//! # Example
//!
//! ```rust
//! use menupilot::builder::{NavigatorBuilder, StateGraphBuilder};
//! use menupilot::clock::ManualClock;
//! use menupilot::config::NavigatorConfig;
//! use menupilot::core::Point;
//! use menupilot::navigator::Termination;
//! use menupilot::sim::{RecordingInput, ScriptedMatcher, StaticFrameSource};
//! use menupilot::vision::{Template, TemplateLibrary};
//! use image::GrayImage;
//!
//! let graph = StateGraphBuilder::new()
//!     .image_state("start", "start.png", "menu")
//!     .image_state("menu", "play.png", "play")
//!     .terminal("play")
//!     .build()
//!     .unwrap();
//!
//! let templates = TemplateLibrary::from_templates([
//!     Template::new("start.png", GrayImage::new(8, 8)),
//!     Template::new("play.png", GrayImage::new(8, 8)),
//! ]);
//!
//! let matcher = ScriptedMatcher::new();
//! matcher.show("start.png", Point::new(10, 10), 0.95);
//! matcher.show("play.png", Point::new(40, 10), 0.95);
//!
//! let mut config = NavigatorConfig::default();
//! config.navigation.initial_state = "start".to_string();
//! config.navigation.recovery_state = "start".to_string();
//!
//! let mut navigator = NavigatorBuilder::new()
//!     .config(config)
//!     .graph(graph)
//!     .templates(templates)
//!     .frame_source(StaticFrameSource::new(64, 64))
//!     .matcher(matcher)
//!     .input(RecordingInput::new())
//!     .clock(ManualClock::new())
//!     .build()
//!     .unwrap();
//!
//! let termination = navigator.run().unwrap();
//!
//! assert_eq!(termination, Termination::Success);
//! assert_eq!(navigator.history().get_path(), vec!["start", "menu", "play"]);
//! assert_eq!(navigator.statistics().success_rate, 1.0);
//! ```

pub mod action;
pub mod builder;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod core;
pub mod navigator;
pub mod report;
pub mod sim;
pub mod states;
pub mod vision;

// Re-export commonly used types
pub use crate::builder::{BuildError, NavigatorBuilder, StateGraphBuilder};
pub use crate::cancel::StopHandle;
pub use crate::config::NavigatorConfig;
pub use crate::core::{NavigationStats, TransitionHistory, TransitionOutcome, TransitionRecord};
pub use crate::navigator::{NavContext, NavError, NavigationLoop, Termination};
pub use crate::report::RunReport;
pub use crate::states::{FnState, ImageState, NavState, RecoveryState, StateGraph, TerminalState};
