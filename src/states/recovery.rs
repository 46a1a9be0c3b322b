//! The catch-all state entered when the current screen is unknown.

use super::error::StateError;
use super::state::NavState;
use crate::core::Point;
use crate::navigator::NavContext;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Works out where the UI is by probing known landmarks.
///
/// Each tick parks the pointer on a safe point (so hover effects do not hide
/// landmarks), then probes the detections in order and returns the state of
/// the first landmark visible. When none is visible it presses the fallback
/// key, waits for the UI to settle and returns its own name, which the loop
/// treats as a stall.
#[derive(Clone, Debug)]
pub struct RecoveryState {
    name: String,
    safe_point: Option<Point>,
    detections: Vec<(String, String)>,
    settle: Duration,
}

impl RecoveryState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            safe_point: None,
            detections: Vec::new(),
            settle: Duration::from_secs(1),
        }
    }

    /// Go to `state` when `template` is visible. Earlier detections win.
    pub fn detect(mut self, template: impl Into<String>, state: impl Into<String>) -> Self {
        self.detections.push((template.into(), state.into()));
        self
    }

    pub fn with_safe_point(mut self, point: Point) -> Self {
        self.safe_point = Some(point);
        self
    }

    /// Pause after pressing the fallback key.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

impl NavState for RecoveryState {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "identify the current screen"
    }

    fn execute(&mut self, ctx: &mut NavContext) -> Result<Option<String>, StateError> {
        if let Some(point) = self.safe_point {
            if let Err(e) = ctx.move_to(point) {
                warn!(error = %e, "could not park pointer");
            }
        }

        for (template, state) in &self.detections {
            if ctx.is_present(template)? {
                info!(%template, %state, "screen identified");
                return Ok(Some(state.clone()));
            }
        }

        let key = ctx.fallback_key().to_string();
        debug!(%key, "screen unknown, pressing fallback key");
        ctx.press_key(&key)?;
        ctx.sleep(self.settle);
        Ok(Some(self.name.clone()))
    }

    fn expected_templates(&self) -> Vec<String> {
        self.detections.iter().map(|(t, _)| t.clone()).collect()
    }

    fn static_targets(&self) -> Vec<String> {
        let mut targets: Vec<String> = self.detections.iter().map(|(_, s)| s.clone()).collect();
        targets.push(self.name.clone());
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::testing::Rig;
    use crate::sim::InputEvent;

    #[test]
    fn first_visible_detection_wins() {
        let rig = Rig::new(&["title.png", "lobby.png"]);
        rig.matcher.show("title.png", Point::new(0, 0), 0.9);
        rig.matcher.show("lobby.png", Point::new(20, 0), 0.9);
        let mut ctx = rig.context();
        let mut state = RecoveryState::new(Rig::RECOVERY)
            .detect("lobby.png", "lobby")
            .detect("title.png", "title");

        assert_eq!(state.execute(&mut ctx).unwrap().as_deref(), Some("lobby"));
        assert_eq!(rig.input.key_presses("esc"), 0);
    }

    #[test]
    fn unknown_screen_presses_fallback_and_stays() {
        let rig = Rig::new(&["title.png"]);
        let mut ctx = rig.context();
        let mut state = RecoveryState::new(Rig::RECOVERY)
            .detect("title.png", "title")
            .with_safe_point(Point::new(1, 1));

        let next = state.execute(&mut ctx).unwrap();

        assert_eq!(next.as_deref(), Some(Rig::RECOVERY));
        assert_eq!(
            rig.input.events(),
            vec![
                InputEvent::Move(Point::new(1, 1)),
                InputEvent::Key("esc".to_string()),
            ]
        );
    }

    #[test]
    fn targets_include_itself() {
        let state = RecoveryState::new("undefined_menu").detect("title.png", "title");

        assert_eq!(
            state.static_targets(),
            vec!["title".to_string(), "undefined_menu".to_string()]
        );
        assert_eq!(state.expected_templates(), vec!["title.png".to_string()]);
    }
}
