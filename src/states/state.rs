//! The state behavior interface.

use super::error::StateError;
use crate::navigator::NavContext;

/// A named unit of navigation behavior.
///
/// `execute` looks at the screen through the context, acts, and names the
/// state to run next. Returning `Ok(None)` ends the run successfully.
///
/// # Example
///
/// ```rust
/// use menupilot::navigator::NavContext;
/// use menupilot::states::{NavState, StateError};
///
/// struct Splash;
///
/// impl NavState for Splash {
///     fn name(&self) -> &str {
///         "splash"
///     }
///
///     fn execute(&mut self, ctx: &mut NavContext) -> Result<Option<String>, StateError> {
///         ctx.press_key("enter")?;
///         Ok(Some("main_menu".to_string()))
///     }
///
///     fn static_targets(&self) -> Vec<String> {
///         vec!["main_menu".to_string()]
///     }
/// }
/// ```
pub trait NavState {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Run the behavior and return the next state name, or `None` to stop.
    fn execute(&mut self, ctx: &mut NavContext) -> Result<Option<String>, StateError>;

    /// Called before every `execute`. An error skips `execute` and goes to
    /// `on_error`.
    fn on_enter(&mut self, _ctx: &mut NavContext) -> Result<(), StateError> {
        Ok(())
    }

    /// Called once the transition is recorded, with the resolved next state.
    fn on_exit(&mut self, _ctx: &mut NavContext, _next: Option<&str>) {}

    /// Pick a fallback after a non-fatal error. `None` means the recovery
    /// state.
    fn on_error(&mut self, _error: &StateError) -> Option<String> {
        None
    }

    /// Template names this state may ask the matcher for.
    fn expected_templates(&self) -> Vec<String> {
        Vec::new()
    }

    /// State names this state is known to return, checked at build time.
    fn static_targets(&self) -> Vec<String> {
        Vec::new()
    }
}
