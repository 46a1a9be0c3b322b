//! Polling until a template shows up.

use super::error::AssetError;
use super::frame::FrameSource;
use super::matcher::{MatchResult, TemplateMatcher};
use super::template::{Template, TemplateLibrary};
use crate::cancel::StopHandle;
use crate::clock::Clock;
use crate::core::Region;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The candidate that matched and its match result.
#[derive(Clone, Debug, PartialEq)]
pub struct WaitHit {
    pub template: String,
    pub result: MatchResult,
}

/// Captures frames and runs the matcher until a candidate is found or a
/// timeout passes.
///
/// All waiting is a plain blocking sleep on the injected clock. Methods take
/// `&mut self`, so two waits can never interleave.
pub struct WaitEngine {
    frames: Box<dyn FrameSource>,
    matcher: Box<dyn TemplateMatcher>,
    templates: TemplateLibrary,
    threshold: f64,
    clock: Rc<dyn Clock>,
    stop: StopHandle,
}

impl WaitEngine {
    pub fn new(
        frames: Box<dyn FrameSource>,
        matcher: Box<dyn TemplateMatcher>,
        templates: TemplateLibrary,
        threshold: f64,
        clock: Rc<dyn Clock>,
        stop: StopHandle,
    ) -> Self {
        Self {
            frames,
            matcher,
            templates,
            threshold,
            clock,
            stop,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Capture one frame and match a single template against it.
    ///
    /// A capture failure is reported as an unmatched result carrying the
    /// error; a missing template is returned as an error.
    pub fn match_template(
        &mut self,
        name: &str,
        region: Option<Region>,
    ) -> Result<MatchResult, AssetError> {
        let template = self.templates.get(name)?;
        let started = self.clock.now();
        let result = match self.frames.capture() {
            Ok(frame) => {
                let located = self.matcher.locate(&frame, template, region);
                MatchResult::evaluate(
                    located,
                    template.dimensions(),
                    self.threshold,
                    self.clock.since(started),
                )
            }
            Err(e) => {
                warn!(template = name, error = %e, "capture failed");
                MatchResult::failed(template.dimensions(), self.clock.since(started), e.to_string())
            }
        };
        debug!(
            template = name,
            found = result.found,
            confidence = result.confidence,
            "match attempt"
        );
        Ok(result)
    }

    /// Poll until one of `candidates` is found.
    ///
    /// Each tick captures one frame and tries the candidates in list order;
    /// the earliest-listed match wins. Ticks run while less than `timeout`
    /// has elapsed, sleeping `poll_interval` between them. Returns `None` on
    /// timeout or when a stop is requested.
    pub fn wait_for<S: AsRef<str>>(
        &mut self,
        candidates: &[S],
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Option<WaitHit>, AssetError> {
        let templates = self.resolve(candidates)?;
        let names: Vec<&str> = templates.iter().map(|t| t.name()).collect();
        debug!(candidates = ?names, ?timeout, "waiting for templates");

        let started = self.clock.now();
        let mut ticks = 0usize;
        while self.clock.since(started) < timeout {
            if self.stop.is_stopped() {
                info!("wait cancelled by stop signal");
                return Ok(None);
            }
            ticks += 1;
            if let Some(hit) = self.tick(&templates) {
                info!(template = %hit.template, ticks, "template detected");
                return Ok(Some(hit));
            }
            self.clock.sleep(poll_interval);
        }

        warn!(candidates = ?names, ticks, "timed out waiting for templates");
        Ok(None)
    }

    /// Single-tick presence check.
    pub fn probe(&mut self, name: &str) -> Result<bool, AssetError> {
        Ok(self.match_template(name, None)?.found)
    }

    fn resolve<S: AsRef<str>>(&self, candidates: &[S]) -> Result<Vec<Template>, AssetError> {
        candidates
            .iter()
            .map(|name| self.templates.get(name.as_ref()).cloned())
            .collect()
    }

    fn tick(&mut self, templates: &[Template]) -> Option<WaitHit> {
        let frame = match self.frames.capture() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "capture failed, treating tick as a miss");
                return None;
            }
        };
        templates.iter().find_map(|template| {
            let started = self.clock.now();
            let located = self.matcher.locate(&frame, template, None);
            let result = MatchResult::evaluate(
                located,
                template.dimensions(),
                self.threshold,
                self.clock.since(started),
            );
            result.found.then(|| WaitHit {
                template: template.name().to_string(),
                result,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::core::Point;
    use crate::sim::{ScriptedMatcher, StaticFrameSource};
    use image::{GrayImage, Luma};

    const POLL: Duration = Duration::from_millis(500);

    fn library(names: &[&str]) -> TemplateLibrary {
        TemplateLibrary::from_templates(
            names
                .iter()
                .map(|n| Template::new(*n, GrayImage::from_pixel(10, 6, Luma([0])))),
        )
    }

    fn engine(
        frames: &StaticFrameSource,
        matcher: &ScriptedMatcher,
        clock: &ManualClock,
        stop: &StopHandle,
    ) -> WaitEngine {
        WaitEngine::new(
            Box::new(frames.clone()),
            Box::new(matcher.clone()),
            library(&["a.png", "b.png"]),
            0.8,
            Rc::new(clock.clone()),
            stop.clone(),
        )
    }

    #[test]
    fn earliest_listed_candidate_wins_ties() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        matcher.show("a.png", Point::new(0, 0), 0.9);
        matcher.show("b.png", Point::new(30, 30), 0.99);
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        let hit = engine.wait_for(&["a.png", "b.png"], POLL * 4, POLL).unwrap().unwrap();

        assert_eq!(hit.template, "a.png");
        assert_eq!(hit.result.position, Some(Point::new(5, 3)));
        assert_eq!(frames.captures(), 1);
    }

    #[test]
    fn list_order_not_score_decides() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        matcher.show("a.png", Point::new(0, 0), 0.9);
        matcher.show("b.png", Point::new(30, 30), 0.99);
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        let hit = engine.wait_for(&["b.png", "a.png"], POLL, POLL).unwrap().unwrap();

        assert_eq!(hit.template, "b.png");
    }

    #[test]
    fn timeout_of_two_intervals_polls_twice() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        let hit = engine.wait_for(&["a.png", "b.png"], POLL * 2, POLL).unwrap();

        assert!(hit.is_none());
        assert_eq!(frames.captures(), 2);
        assert_eq!(clock.elapsed(), POLL * 2);
    }

    #[test]
    fn below_threshold_is_not_found() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        matcher.show("a.png", Point::new(0, 0), 0.79);
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        assert!(engine.wait_for(&["a.png"], POLL, POLL).unwrap().is_none());
    }

    #[test]
    fn capture_failure_is_retried_on_next_tick() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        frames.fail_next(1);
        matcher.show("a.png", Point::new(0, 0), 1.0);
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        let hit = engine.wait_for(&["a.png"], POLL * 4, POLL).unwrap();

        assert!(hit.is_some());
        assert_eq!(frames.captures(), 2);
        assert_eq!(clock.elapsed(), POLL);
    }

    #[test]
    fn missing_template_fails_before_polling() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        let result = engine.wait_for(&["a.png", "missing.png"], POLL, POLL);

        assert!(matches!(result, Err(AssetError::MissingTemplate { .. })));
        assert_eq!(frames.captures(), 0);
    }

    #[test]
    fn stop_signal_ends_wait() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        stop.stop();
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        assert!(engine.wait_for(&["a.png"], POLL * 10, POLL).unwrap().is_none());
        assert_eq!(frames.captures(), 0);
    }

    #[test]
    fn match_template_degrades_capture_failure() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        frames.fail_next(1);
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        let result = engine.match_template("a.png", None).unwrap();

        assert!(!result.found);
        assert!(result.error.is_some());
    }

    #[test]
    fn probe_reports_presence() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        matcher.show("b.png", Point::new(4, 4), 0.95);
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        assert!(engine.probe("b.png").unwrap());
        assert!(!engine.probe("a.png").unwrap());
    }

    #[test]
    fn hit_reports_matching_time_not_wait_time() {
        let (frames, matcher, clock, stop) = (
            StaticFrameSource::new(64, 64),
            ScriptedMatcher::new(),
            ManualClock::new(),
            StopHandle::new(),
        );
        frames.fail_next(3);
        matcher.show("a.png", Point::new(0, 0), 0.95);
        let mut engine = engine(&frames, &matcher, &clock, &stop);

        let hit = engine.wait_for(&["a.png"], POLL * 10, POLL).unwrap().unwrap();

        assert_eq!(clock.elapsed(), POLL * 3);
        assert_eq!(hit.result.elapsed, Duration::ZERO);
    }
}
