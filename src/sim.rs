//! In-memory collaborators for dry runs and tests.
//!
//! Each type hands out clones that share state, so a caller can keep one
//! handle for inspection while the navigator owns another.

use crate::action::{InputDevice, InputError, MouseButton};
use crate::core::{Point, Region};
use crate::vision::{CaptureError, Frame, FrameSource, Located, Template, TemplateMatcher};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Returns the same blank frame on every capture, optionally failing some.
#[derive(Clone, Debug)]
pub struct StaticFrameSource {
    frame: Frame,
    failures: Rc<Cell<u32>>,
    captures: Rc<Cell<usize>>,
}

impl StaticFrameSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: Frame::blank(width, height, 0),
            failures: Rc::new(Cell::new(0)),
            captures: Rc::new(Cell::new(0)),
        }
    }

    /// Make the next `count` captures fail.
    pub fn fail_next(&self, count: u32) {
        self.failures.set(count);
    }

    /// Number of capture calls so far, failed ones included.
    pub fn captures(&self) -> usize {
        self.captures.get()
    }
}

impl FrameSource for StaticFrameSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        self.captures.set(self.captures.get() + 1);
        let failures = self.failures.get();
        if failures > 0 {
            self.failures.set(failures - 1);
            return Err(CaptureError::Failed("scripted capture failure".to_string()));
        }
        Ok(self.frame.clone())
    }
}

/// Matcher whose answers are set by name instead of computed from pixels.
///
/// A template that was never shown (or was hidden) scores 0.0.
#[derive(Clone, Debug, Default)]
pub struct ScriptedMatcher {
    screen: Rc<RefCell<HashMap<String, Located>>>,
    calls: Rc<Cell<usize>>,
}

impl ScriptedMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `template` match with its top-left at `at`.
    pub fn show(&self, template: &str, at: Point, confidence: f64) {
        self.screen.borrow_mut().insert(
            template.to_string(),
            Located {
                top_left: at,
                confidence,
            },
        );
    }

    pub fn hide(&self, template: &str) {
        self.screen.borrow_mut().remove(template);
    }

    pub fn clear(&self) {
        self.screen.borrow_mut().clear();
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl TemplateMatcher for ScriptedMatcher {
    fn locate(
        &self,
        _frame: &Frame,
        template: &Template,
        _region: Option<Region>,
    ) -> Option<Located> {
        self.calls.set(self.calls.get() + 1);
        let located = self.screen.borrow().get(template.name()).copied();
        Some(located.unwrap_or(Located {
            top_left: Point::ORIGIN,
            confidence: 0.0,
        }))
    }
}

/// Input event captured by [`RecordingInput`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Move(Point),
    Click(Point, MouseButton),
    DoubleClick(Point, MouseButton),
    Key(String),
    Combo(Vec<String>),
    Type(char),
}

type ClickHook = Box<dyn FnMut(Point)>;

/// Records every input call and can be told to fail clicks.
#[derive(Clone, Default)]
pub struct RecordingInput {
    events: Rc<RefCell<Vec<InputEvent>>>,
    click_failures: Rc<Cell<u32>>,
    on_click: Rc<RefCell<Option<ClickHook>>>,
}

impl RecordingInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` clicks fail, double clicks included.
    pub fn fail_next_clicks(&self, count: u32) {
        self.click_failures.set(count);
    }

    /// Run `hook` after every successful click, e.g. to switch screens.
    pub fn on_click(&self, hook: impl FnMut(Point) + 'static) {
        *self.on_click.borrow_mut() = Some(Box::new(hook));
    }

    pub fn events(&self) -> Vec<InputEvent> {
        self.events.borrow().clone()
    }

    pub fn clicks(&self) -> Vec<Point> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                InputEvent::Click(p, _) | InputEvent::DoubleClick(p, _) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// How many times `key` was pressed.
    pub fn key_presses(&self, key: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, InputEvent::Key(k) if k == key))
            .count()
    }

    /// Every typed character, concatenated.
    pub fn typed(&self) -> String {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                InputEvent::Type(ch) => Some(*ch),
                _ => None,
            })
            .collect()
    }

    fn pointer_event(&self, event: InputEvent, position: Point) -> Result<(), InputError> {
        let failures = self.click_failures.get();
        if failures > 0 {
            self.click_failures.set(failures - 1);
            return Err(InputError::ClickFailed {
                x: position.x,
                y: position.y,
                reason: "scripted click failure".to_string(),
            });
        }
        self.events.borrow_mut().push(event);
        if let Some(hook) = self.on_click.borrow_mut().as_mut() {
            hook(position);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RecordingInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingInput")
            .field("events", &self.events.borrow())
            .field("click_failures", &self.click_failures.get())
            .finish()
    }
}

impl InputDevice for RecordingInput {
    fn move_to(&mut self, position: Point) -> Result<(), InputError> {
        self.events.borrow_mut().push(InputEvent::Move(position));
        Ok(())
    }

    fn click(&mut self, position: Point, button: MouseButton) -> Result<(), InputError> {
        self.pointer_event(InputEvent::Click(position, button), position)
    }

    fn double_click(&mut self, position: Point, button: MouseButton) -> Result<(), InputError> {
        self.pointer_event(InputEvent::DoubleClick(position, button), position)
    }

    fn press_key(&mut self, key: &str) -> Result<(), InputError> {
        self.events.borrow_mut().push(InputEvent::Key(key.to_string()));
        Ok(())
    }

    fn key_combination(&mut self, keys: &[&str]) -> Result<(), InputError> {
        let keys = keys.iter().map(|k| k.to_string()).collect();
        self.events.borrow_mut().push(InputEvent::Combo(keys));
        Ok(())
    }

    fn type_char(&mut self, ch: char) -> Result<(), InputError> {
        self.events.borrow_mut().push(InputEvent::Type(ch));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn static_source_fails_then_recovers() {
        let mut source = StaticFrameSource::new(8, 8);
        source.fail_next(1);

        assert!(source.capture().is_err());
        assert!(source.capture().is_ok());
        assert_eq!(source.captures(), 2);
    }

    #[test]
    fn scripted_matcher_follows_screen() {
        let matcher = ScriptedMatcher::new();
        let template = Template::new("btn.png", GrayImage::new(2, 2));
        let frame = Frame::blank(8, 8, 0);

        matcher.show("btn.png", Point::new(3, 4), 0.95);
        let shown = matcher.locate(&frame, &template, None).unwrap();
        matcher.hide("btn.png");
        let hidden = matcher.locate(&frame, &template, None).unwrap();

        assert_eq!(shown.top_left, Point::new(3, 4));
        assert_eq!(hidden.confidence, 0.0);
        assert_eq!(matcher.calls(), 2);
    }

    #[test]
    fn click_hook_runs_after_click() {
        let mut input = RecordingInput::new();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        input.on_click(move |p| sink.set(Some(p)));

        input.click(Point::new(7, 8), MouseButton::Left).unwrap();

        assert_eq!(seen.get(), Some(Point::new(7, 8)));
        assert_eq!(input.clicks(), vec![Point::new(7, 8)]);
    }
}
