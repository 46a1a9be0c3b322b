//! Clicking and key presses with a bounded retry policy.

use super::error::InputError;
use super::input::{InputDevice, MouseButton};
use crate::cancel::StopHandle;
use crate::clock::Clock;
use crate::core::Point;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of a click, covering every attempt made.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClickResult {
    pub success: bool,
    /// Where the click was aimed, offset included
    pub position: Point,
    /// Duration of the last attempt
    pub elapsed: Duration,
    pub attempts: u32,
    /// Error from the last failed attempt
    pub error: Option<String>,
}

/// Drives an [`InputDevice`] on behalf of state behaviors.
pub struct ActionExecutor {
    input: Box<dyn InputDevice>,
    clock: Rc<dyn Clock>,
    stop: StopHandle,
}

impl ActionExecutor {
    pub fn new(input: Box<dyn InputDevice>, clock: Rc<dyn Clock>, stop: StopHandle) -> Self {
        Self { input, clock, stop }
    }

    /// Left-click at `position + offset`, trying up to `attempts` times.
    ///
    /// Sleeps `backoff` between failed attempts. Each attempt is timed on
    /// its own. A stop request skips the remaining attempts.
    pub fn click_at(
        &mut self,
        position: Point,
        offset: Point,
        attempts: u32,
        backoff: Duration,
    ) -> ClickResult {
        self.click_button_at(position, offset, MouseButton::Left, attempts, backoff)
    }

    /// Like [`click_at`](Self::click_at) with an explicit button.
    pub fn click_button_at(
        &mut self,
        position: Point,
        offset: Point,
        button: MouseButton,
        attempts: u32,
        backoff: Duration,
    ) -> ClickResult {
        self.attempt(position.offset_by(offset), attempts, backoff, |input, target| {
            input.click(target, button)
        })
    }

    /// Double-click at `position + offset` with the same retry policy as
    /// [`click_at`](Self::click_at).
    pub fn double_click_at(
        &mut self,
        position: Point,
        offset: Point,
        button: MouseButton,
        attempts: u32,
        backoff: Duration,
    ) -> ClickResult {
        self.attempt(position.offset_by(offset), attempts, backoff, |input, target| {
            input.double_click(target, button)
        })
    }

    pub fn press_key(&mut self, key: &str) -> Result<(), InputError> {
        self.input.press_key(key)?;
        debug!(key, "key pressed");
        Ok(())
    }

    /// Press `keys` together, e.g. `["ctrl", "c"]`.
    pub fn key_combination(&mut self, keys: &[&str]) -> Result<(), InputError> {
        self.input.key_combination(keys)?;
        debug!(combo = %keys.join("+"), "key combination pressed");
        Ok(())
    }

    /// Type `text` one character at a time, sleeping `interval` between
    /// characters. A stop request ends typing early.
    pub fn type_text(&mut self, text: &str, interval: Duration) -> Result<(), InputError> {
        for (index, ch) in text.chars().enumerate() {
            if self.stop.is_stopped() {
                return Err(InputError::Cancelled);
            }
            if index > 0 {
                self.clock.sleep(interval);
            }
            self.input.type_char(ch).map_err(|e| InputError::TypeFailed {
                text: text.to_string(),
                reason: e.to_string(),
            })?;
        }
        debug!(chars = text.chars().count(), "text typed");
        Ok(())
    }

    pub fn move_to(&mut self, position: Point) -> Result<(), InputError> {
        self.input.move_to(position)?;
        debug!(%position, "pointer moved");
        Ok(())
    }

    fn attempt<F>(
        &mut self,
        target: Point,
        attempts: u32,
        backoff: Duration,
        mut act: F,
    ) -> ClickResult
    where
        F: FnMut(&mut dyn InputDevice, Point) -> Result<(), InputError>,
    {
        let attempts = attempts.max(1);
        let mut result = ClickResult {
            success: false,
            position: target,
            elapsed: Duration::ZERO,
            attempts: 0,
            error: None,
        };

        for attempt in 1..=attempts {
            if self.stop.is_stopped() {
                result.error = Some(InputError::Cancelled.to_string());
                break;
            }
            let started = self.clock.now();
            let outcome = act(self.input.as_mut(), target);
            result.elapsed = self.clock.since(started);
            result.attempts = attempt;

            match outcome {
                Ok(()) => {
                    info!(position = %target, attempt, "clicked");
                    result.success = true;
                    result.error = None;
                    return result;
                }
                Err(e) => {
                    warn!(position = %target, attempt, attempts, error = %e, "click failed");
                    result.error = Some(e.to_string());
                    if attempt < attempts {
                        self.clock.sleep(backoff);
                    }
                }
            }
        }
        result
    }
}
