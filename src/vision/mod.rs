//! Perception: frames, templates, matching and waiting.
//!
//! - [`FrameSource`] captures the display on demand
//! - [`TemplateLibrary`] holds the reference images by name
//! - [`TemplateMatcher`] scores a template against a frame
//! - [`WaitEngine`] polls until a candidate template appears

mod error;
mod frame;
mod matcher;
mod template;
mod wait;

pub use error::{AssetError, CaptureError};
pub use frame::{Frame, FrameSource, ReplayFrameSource};
pub use matcher::{Located, MatchResult, NccMatcher, TemplateMatcher};
pub use template::{Template, TemplateLibrary};
pub use wait::{WaitEngine, WaitHit};
