//! Builder API for assembling state graphs and navigators.
//!
//! # Example
//!
//! ```
//! use menupilot::builder::{NavigatorBuilder, StateGraphBuilder};
//! use menupilot::clock::ManualClock;
//! use menupilot::config::NavigatorConfig;
//! use menupilot::sim::{RecordingInput, ScriptedMatcher, StaticFrameSource};
//! use menupilot::vision::{Template, TemplateLibrary};
//! use image::GrayImage;
//!
//! let graph = StateGraphBuilder::new()
//!     .image_state("title", "press_start.png", "game")
//!     .terminal("game")
//!     .build()
//!     .unwrap();
//!
//! let mut config = NavigatorConfig::default();
//! config.navigation.initial_state = "title".to_string();
//! config.navigation.recovery_state = "title".to_string();
//!
//! let navigator = NavigatorBuilder::new()
//!     .config(config)
//!     .graph(graph)
//!     .frame_source(StaticFrameSource::new(64, 64))
//!     .input(RecordingInput::new())
//!     .matcher(ScriptedMatcher::new())
//!     .templates(TemplateLibrary::from_templates([Template::new(
//!         "press_start.png",
//!         GrayImage::new(8, 8),
//!     )]))
//!     .clock(ManualClock::new())
//!     .build()
//!     .unwrap();
//!
//! assert!(navigator.report().is_none());
//! ```

pub mod error;
pub mod graph;
pub mod navigator;

pub use error::BuildError;
pub use graph::StateGraphBuilder;
pub use navigator::NavigatorBuilder;
