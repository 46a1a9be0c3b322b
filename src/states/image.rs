//! Image-driven state: find a landmark, click it, move on.

use super::error::StateError;
use super::state::NavState;
use crate::core::Point;
use crate::navigator::{FindOptions, NavContext};
use std::time::Duration;
use tracing::{debug, warn};

/// Clicks the first visible of a target template and its alternatives.
///
/// On success the state sleeps the post-click delay and returns `next`.
/// When nothing is found or every click fails it returns the fallback, or
/// the recovery state if no fallback is set.
///
/// ```rust
/// use menupilot::core::Point;
/// use menupilot::states::{ImageState, NavState};
///
/// let state = ImageState::new("main_menu", "play_button.png", "lobby")
///     .with_alternatives(["play_button_hover.png"])
///     .with_offset(Point::new(0, 12));
///
/// assert_eq!(state.expected_templates().len(), 2);
/// assert_eq!(state.static_targets(), vec!["lobby".to_string()]);
/// ```
#[derive(Clone, Debug)]
pub struct ImageState {
    name: String,
    description: String,
    target: String,
    alternatives: Vec<String>,
    next: String,
    offset: Point,
    fallback: Option<String>,
    timeout: Option<Duration>,
}

impl ImageState {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        next: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let target = target.into();
        let next = next.into();
        Self {
            description: format!("click {target} then go to {next}"),
            name,
            target,
            alternatives: Vec::new(),
            next,
            offset: Point::ORIGIN,
            fallback: None,
            timeout: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Templates tried after the target, in order.
    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives.extend(alternatives.into_iter().map(Into::into));
        self
    }

    /// Offset added to the matched centre before clicking.
    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    /// State returned when the target cannot be clicked.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Wait timeout overriding the configured one.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn candidates(&self) -> Vec<&str> {
        std::iter::once(self.target.as_str())
            .chain(self.alternatives.iter().map(String::as_str))
            .collect()
    }
}

impl NavState for ImageState {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn execute(&mut self, ctx: &mut NavContext) -> Result<Option<String>, StateError> {
        let mut options = FindOptions::from_config(ctx.settings()).with_offset(self.offset);
        if let Some(timeout) = self.timeout {
            options.timeout = timeout;
        }

        match ctx.find_and_click_with(&self.candidates(), &options)? {
            Some(clicked) => {
                debug!(state = %self.name, template = %clicked.template, "landmark clicked");
                ctx.sleep(ctx.settings().post_click_delay());
                Ok(Some(self.next.clone()))
            }
            None => {
                let fallback = self
                    .fallback
                    .clone()
                    .unwrap_or_else(|| ctx.recovery_state().to_string());
                warn!(state = %self.name, target = %self.target, %fallback, "landmark not clicked");
                Ok(Some(fallback))
            }
        }
    }

    fn expected_templates(&self) -> Vec<String> {
        self.candidates().into_iter().map(String::from).collect()
    }

    fn static_targets(&self) -> Vec<String> {
        let mut targets = vec![self.next.clone()];
        targets.extend(self.fallback.clone());
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::testing::Rig;

    #[test]
    fn clicks_target_and_returns_next() {
        let rig = Rig::new(&["start.png"]);
        rig.matcher.show("start.png", Point::new(10, 20), 0.95);
        let mut ctx = rig.context();
        let mut state = ImageState::new("start", "start.png", "menu").with_offset(Point::new(1, 1));

        let next = state.execute(&mut ctx).unwrap();

        assert_eq!(next.as_deref(), Some("menu"));
        // centre of an 8x8 template at (10, 20) is (14, 24), plus offset
        assert_eq!(rig.input.clicks(), vec![Point::new(15, 25)]);
    }

    #[test]
    fn falls_back_to_recovery_state_when_not_found() {
        let rig = Rig::new(&["start.png"]);
        let mut ctx = rig.context();
        let mut state = ImageState::new("start", "start.png", "menu");

        let next = state.execute(&mut ctx).unwrap();

        assert_eq!(next.as_deref(), Some(Rig::RECOVERY));
        assert!(rig.input.clicks().is_empty());
    }

    #[test]
    fn explicit_fallback_wins_over_recovery() {
        let rig = Rig::new(&["start.png"]);
        let mut ctx = rig.context();
        let mut state = ImageState::new("start", "start.png", "menu").with_fallback("title");

        assert_eq!(state.execute(&mut ctx).unwrap().as_deref(), Some("title"));
    }

    #[test]
    fn alternative_template_is_clicked() {
        let rig = Rig::new(&["start.png", "start_alt.png"]);
        rig.matcher.show("start_alt.png", Point::new(0, 0), 0.9);
        let mut ctx = rig.context();
        let mut state =
            ImageState::new("start", "start.png", "menu").with_alternatives(["start_alt.png"]);

        assert_eq!(state.execute(&mut ctx).unwrap().as_deref(), Some("menu"));
        assert_eq!(rig.input.clicks(), vec![Point::new(4, 4)]);
    }

    #[test]
    fn missing_template_is_fatal() {
        let rig = Rig::new(&[]);
        let mut ctx = rig.context();
        let mut state = ImageState::new("start", "start.png", "menu");

        let err = state.execute(&mut ctx).unwrap_err();

        assert!(err.is_fatal());
    }
}
