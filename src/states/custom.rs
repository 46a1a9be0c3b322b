//! Integrator-supplied behaviors.

use super::error::StateError;
use super::state::NavState;
use crate::navigator::NavContext;

type Behavior = Box<dyn FnMut(&mut NavContext) -> Result<Option<String>, StateError>>;
type ErrorHandler = Box<dyn FnMut(&StateError) -> Option<String>>;

/// A state whose `execute` is a closure.
///
/// ```rust
/// use menupilot::states::{FnState, NavState};
///
/// let state = FnState::new("loading", |ctx| {
///     if ctx.is_present("spinner.png")? {
///         Ok(Some("loading".to_string()))
///     } else {
///         Ok(Some("lobby".to_string()))
///     }
/// })
/// .with_templates(["spinner.png"])
/// .with_targets(["loading", "lobby"]);
///
/// assert_eq!(state.name(), "loading");
/// ```
pub struct FnState {
    name: String,
    description: String,
    behavior: Behavior,
    error_handler: Option<ErrorHandler>,
    templates: Vec<String>,
    targets: Vec<String>,
}

impl FnState {
    pub fn new<F>(name: impl Into<String>, behavior: F) -> Self
    where
        F: FnMut(&mut NavContext) -> Result<Option<String>, StateError> + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            behavior: Box::new(behavior),
            error_handler: None,
            templates: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Handler consulted when the behavior fails.
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&StateError) -> Option<String> + 'static,
    {
        self.error_handler = Some(Box::new(handler));
        self
    }

    /// Templates the behavior looks for, checked against the library at build.
    pub fn with_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates.extend(templates.into_iter().map(Into::into));
        self
    }

    /// States the behavior may return, checked against the graph at build.
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Debug for FnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnState")
            .field("name", &self.name)
            .field("templates", &self.templates)
            .field("targets", &self.targets)
            .finish_non_exhaustive()
    }
}

impl NavState for FnState {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&mut self, ctx: &mut NavContext) -> Result<Option<String>, StateError> {
        (self.behavior)(ctx)
    }

    fn on_error(&mut self, error: &StateError) -> Option<String> {
        self.error_handler.as_mut().and_then(|handler| handler(error))
    }

    fn expected_templates(&self) -> Vec<String> {
        self.templates.clone()
    }

    fn static_targets(&self) -> Vec<String> {
        self.targets.clone()
    }
}

/// Ends the run successfully as soon as it is reached.
#[derive(Clone, Debug)]
pub struct TerminalState {
    name: String,
}

impl TerminalState {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl NavState for TerminalState {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "end of navigation"
    }

    fn execute(&mut self, _ctx: &mut NavContext) -> Result<Option<String>, StateError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::testing::Rig;

    #[test]
    fn closure_decides_next_state() {
        let rig = Rig::new(&[]);
        let mut ctx = rig.context();
        let mut calls = 0;
        let mut state = FnState::new("counter", move |_ctx| {
            calls += 1;
            Ok(Some(format!("step_{calls}")))
        });

        assert_eq!(state.execute(&mut ctx).unwrap().as_deref(), Some("step_1"));
        assert_eq!(state.execute(&mut ctx).unwrap().as_deref(), Some("step_2"));
    }

    #[test]
    fn error_handler_supplies_fallback() {
        let mut state = FnState::new("flaky", |_ctx| Err(StateError::Failed("boom".into())))
            .with_error_handler(|_err| Some("title".to_string()));

        let fallback = state.on_error(&StateError::Failed("boom".into()));

        assert_eq!(fallback.as_deref(), Some("title"));
    }

    #[test]
    fn default_error_handler_defers_to_recovery() {
        let mut state = FnState::new("plain", |_ctx| Ok(None));
        assert!(state.on_error(&StateError::Failed("x".into())).is_none());
    }

    #[test]
    fn terminal_state_ends_run() {
        let rig = Rig::new(&[]);
        let mut ctx = rig.context();
        let mut state = TerminalState::new("play");

        assert_eq!(state.execute(&mut ctx).unwrap(), None);
    }
}
