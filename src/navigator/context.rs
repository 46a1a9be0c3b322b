//! Services handed to state behaviors.

use crate::action::{ActionExecutor, ClickResult, InputError, MouseButton};
use crate::cancel::StopHandle;
use crate::clock::Clock;
use crate::config::VisionConfig;
use crate::core::{Point, Region};
use crate::vision::{AssetError, MatchResult, WaitEngine, WaitHit};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// Parameters for one find-and-click.
#[derive(Clone, Debug, PartialEq)]
pub struct FindOptions {
    /// Wait per attempt
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Total wait-and-click attempts
    pub attempts: u32,
    /// Sleep between failed attempts
    pub backoff: Duration,
    /// Added to the matched centre before clicking
    pub offset: Point,
}

impl FindOptions {
    pub fn from_config(config: &VisionConfig) -> Self {
        Self {
            timeout: config.timeout(),
            poll_interval: config.check_interval(),
            attempts: config.retries,
            backoff: config.retry_backoff(),
            offset: Point::ORIGIN,
        }
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

/// A successful find-and-click.
#[derive(Clone, Debug, PartialEq)]
pub struct Clicked {
    /// Candidate that was found
    pub template: String,
    pub matched: MatchResult,
    pub click: ClickResult,
    /// Attempt on which the click landed, starting at 1
    pub attempt: u32,
}

/// Everything a state may use while it runs: vision, input, time and the
/// recovery policy it should fall back on.
pub struct NavContext {
    vision: WaitEngine,
    actions: ActionExecutor,
    clock: Rc<dyn Clock>,
    settings: VisionConfig,
    recovery_state: String,
    fallback_key: String,
    stop: StopHandle,
}

impl NavContext {
    pub fn new(
        vision: WaitEngine,
        actions: ActionExecutor,
        clock: Rc<dyn Clock>,
        settings: VisionConfig,
        recovery_state: impl Into<String>,
        fallback_key: impl Into<String>,
        stop: StopHandle,
    ) -> Self {
        Self {
            vision,
            actions,
            clock,
            settings,
            recovery_state: recovery_state.into(),
            fallback_key: fallback_key.into(),
            stop,
        }
    }

    /// Wait for any of `candidates` and click it, using the configured
    /// retry policy.
    pub fn find_and_click<S: AsRef<str>>(
        &mut self,
        candidates: &[S],
        offset: Point,
    ) -> Result<Option<Clicked>, AssetError> {
        let options = FindOptions::from_config(&self.settings).with_offset(offset);
        self.find_and_click_with(candidates, &options)
    }

    /// Wait for any of `candidates` and click it.
    ///
    /// Each attempt waits up to `options.timeout` and clicks once; a missed
    /// wait or a failed click costs one attempt. Returns `None` once the
    /// attempts are spent or a stop is requested. A missing template fails
    /// straight away.
    pub fn find_and_click_with<S: AsRef<str>>(
        &mut self,
        candidates: &[S],
        options: &FindOptions,
    ) -> Result<Option<Clicked>, AssetError> {
        let attempts = options.attempts.max(1);
        for attempt in 1..=attempts {
            if self.stop.is_stopped() {
                debug!("find-and-click abandoned by stop signal");
                return Ok(None);
            }

            let hit = self
                .vision
                .wait_for(candidates, options.timeout, options.poll_interval)?;
            let target = hit.and_then(|hit| {
                let position = hit.result.position?;
                Some((hit, position))
            });
            match target {
                Some((hit, position)) => {
                    let click = self
                        .actions
                        .click_at(position, options.offset, 1, Duration::ZERO);
                    if click.success {
                        return Ok(Some(Clicked {
                            template: hit.template,
                            matched: hit.result,
                            click,
                            attempt,
                        }));
                    }
                    warn!(template = %hit.template, attempt, "click on match failed");
                }
                None => debug!(attempt, attempts, "no candidate visible"),
            }

            if attempt < attempts {
                self.clock.sleep(options.backoff);
            }
        }
        Ok(None)
    }

    /// Whether `template` shows up within the probe timeout.
    pub fn is_present(&mut self, template: &str) -> Result<bool, AssetError> {
        let hit = self.vision.wait_for(
            &[template],
            self.settings.probe_timeout(),
            self.settings.check_interval(),
        )?;
        Ok(hit.is_some())
    }

    /// Poll for candidates with explicit timing.
    pub fn wait_for<S: AsRef<str>>(
        &mut self,
        candidates: &[S],
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Option<WaitHit>, AssetError> {
        self.vision.wait_for(candidates, timeout, poll_interval)
    }

    /// One capture, one template, optionally restricted to a region.
    pub fn match_template(
        &mut self,
        template: &str,
        region: Option<Region>,
    ) -> Result<MatchResult, AssetError> {
        self.vision.match_template(template, region)
    }

    pub fn click_at(&mut self, position: Point, offset: Point) -> ClickResult {
        self.actions.click_at(
            position,
            offset,
            self.settings.retries,
            self.settings.retry_backoff(),
        )
    }

    /// Click with `button` using the configured retry policy.
    pub fn click_button(
        &mut self,
        position: Point,
        offset: Point,
        button: MouseButton,
    ) -> ClickResult {
        self.actions.click_button_at(
            position,
            offset,
            button,
            self.settings.retries,
            self.settings.retry_backoff(),
        )
    }

    pub fn double_click_at(&mut self, position: Point, offset: Point) -> ClickResult {
        self.actions.double_click_at(
            position,
            offset,
            MouseButton::Left,
            self.settings.retries,
            self.settings.retry_backoff(),
        )
    }

    pub fn press_key(&mut self, key: &str) -> Result<(), InputError> {
        self.actions.press_key(key)
    }

    pub fn key_combination(&mut self, keys: &[&str]) -> Result<(), InputError> {
        self.actions.key_combination(keys)
    }

    pub fn type_text(&mut self, text: &str, interval: Duration) -> Result<(), InputError> {
        self.actions.type_text(text, interval)
    }

    pub fn move_to(&mut self, position: Point) -> Result<(), InputError> {
        self.actions.move_to(position)
    }

    pub fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration);
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    pub fn settings(&self) -> &VisionConfig {
        &self.settings
    }

    pub fn recovery_state(&self) -> &str {
        &self.recovery_state
    }

    pub fn fallback_key(&self) -> &str {
        &self.fallback_key
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn stop_handle(&self) -> &StopHandle {
        &self.stop
    }

    pub fn vision(&self) -> &WaitEngine {
        &self.vision
    }
}
