//! Input injection seam.

use super::error::InputError;
use crate::core::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pointer button used for a click.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
        }
    }
}

/// Synthetic pointer and keyboard input.
///
/// Implemented by the platform backend; every call may fail independently
/// of matching.
pub trait InputDevice {
    /// Move the pointer without clicking.
    fn move_to(&mut self, position: Point) -> Result<(), InputError>;

    /// Move the pointer to `position` and click `button`.
    fn click(&mut self, position: Point, button: MouseButton) -> Result<(), InputError>;

    /// Two clicks in quick succession. Backends with a native double click
    /// should override this.
    fn double_click(&mut self, position: Point, button: MouseButton) -> Result<(), InputError> {
        self.click(position, button)?;
        self.click(position, button)
    }

    /// Press and release a named key, e.g. `"esc"`.
    fn press_key(&mut self, key: &str) -> Result<(), InputError>;

    /// Hold `keys` down in order, then release them in reverse, e.g.
    /// `["ctrl", "c"]`.
    fn key_combination(&mut self, keys: &[&str]) -> Result<(), InputError>;

    /// Type a single character.
    fn type_char(&mut self, ch: char) -> Result<(), InputError>;
}
