//! The navigation loop: run states, detect stalls, force recovery.

use super::context::NavContext;
use super::counters::LoopCounters;
use super::error::NavError;
use crate::cancel::StopHandle;
use crate::clock::Clock;
use crate::config::NavigationConfig;
use crate::core::{NavigationStats, TransitionHistory, TransitionOutcome, TransitionRecord};
use crate::report::RunReport;
use crate::states::{NavState, StateError, StateGraph};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, info, info_span, warn};

/// Why a run gave up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    /// Forced recoveries reached the break count
    RecoveryExhausted { recoveries: u32 },
    /// The stop handle was triggered
    Cancelled,
    /// An unrecoverable error, e.g. an unknown state or a missing asset
    Fatal { message: String },
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A state returned no next state
    Success,
    Aborted(AbortReason),
    /// `max_iterations` states ran without the run ending
    IterationLimit { iterations: usize },
}

impl Termination {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Aborted(AbortReason::RecoveryExhausted { recoveries }) => {
                write!(f, "aborted after {recoveries} forced recoveries")
            }
            Self::Aborted(AbortReason::Cancelled) => write!(f, "cancelled"),
            Self::Aborted(AbortReason::Fatal { message }) => write!(f, "aborted: {message}"),
            Self::IterationLimit { iterations } => {
                write!(f, "iteration limit reached after {iterations} iterations")
            }
        }
    }
}

/// Where the loop is in its own lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopPhase {
    Idle,
    Running,
    /// The next state was forced after a stall
    Recovering,
    Terminated(Termination),
}

/// Result of a single [`NavigationLoop::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Continue(TransitionRecord),
    Finished(Termination),
}

/// Snapshot for a control surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopStatus {
    pub phase: LoopPhase,
    pub counters: LoopCounters,
    pub transitions: usize,
}

/// Drives a [`StateGraph`] from an initial state until a state ends the run,
/// the recovery budget is spent, the iteration limit is hit, or a stop is
/// requested.
///
/// Per iteration the current state is entered and executed. A next state
/// equal to the current one counts as a repeat; `max_stop_count` repeats in
/// a row force the recovery state and press the fallback key. `break_count`
/// forced recoveries abort the run.
pub struct NavigationLoop {
    graph: StateGraph,
    ctx: NavContext,
    policy: NavigationConfig,
    clock: Rc<dyn Clock>,
    stop: StopHandle,
    counters: LoopCounters,
    history: TransitionHistory,
    phase: LoopPhase,
    initial_state: Option<String>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl NavigationLoop {
    pub fn new(graph: StateGraph, ctx: NavContext, policy: NavigationConfig) -> Self {
        let clock = Rc::clone(ctx.clock());
        let stop = ctx.stop_handle().clone();
        Self {
            graph,
            ctx,
            policy,
            clock,
            stop,
            counters: LoopCounters::default(),
            history: TransitionHistory::new(),
            phase: LoopPhase::Idle,
            initial_state: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Begin a fresh run at `initial`, clearing counters, history and any
    /// earlier stop request.
    pub fn start(&mut self, initial: &str) -> Result<(), NavError> {
        if !self.graph.contains(initial) {
            return Err(NavError::StateNotFound {
                name: initial.to_string(),
            });
        }
        self.stop.reset();
        self.counters = LoopCounters::new(initial);
        self.history = TransitionHistory::new();
        self.phase = LoopPhase::Running;
        self.initial_state = Some(initial.to_string());
        self.started_at = Some(Utc::now());
        self.finished_at = None;
        info!(initial, "navigation started");
        Ok(())
    }

    /// Run from the configured initial state until the run ends.
    pub fn run(&mut self) -> Result<Termination, NavError> {
        let initial = self.policy.initial_state.clone();
        self.run_from(&initial)
    }

    pub fn run_from(&mut self, initial: &str) -> Result<Termination, NavError> {
        self.start(initial)?;
        loop {
            if let Step::Finished(termination) = self.step()? {
                return Ok(termination);
            }
        }
    }

    /// Execute the current state once and record the transition.
    pub fn step(&mut self) -> Result<Step, NavError> {
        match &self.phase {
            LoopPhase::Idle => return Err(NavError::NotStarted),
            LoopPhase::Terminated(termination) => {
                return Ok(Step::Finished(termination.clone()));
            }
            LoopPhase::Running | LoopPhase::Recovering => {}
        }

        if self.stop.is_stopped() {
            return Ok(Step::Finished(self.cancel()));
        }
        if self.counters.iterations >= self.policy.max_iterations {
            let iterations = self.counters.iterations;
            warn!(iterations, "iteration limit reached");
            return Ok(Step::Finished(
                self.finish(Termination::IterationLimit { iterations }),
            ));
        }

        let current = self.counters.current_state.clone();
        self.counters.iterations += 1;
        let span = info_span!("state", name = %current, iteration = self.counters.iterations);
        let _entered = span.enter();

        let state = match self.graph.get_mut(&current) {
            Ok(state) => state,
            Err(_) => return Err(self.abort_unknown(&current)),
        };

        let started = self.clock.now();
        let executed = execute(state, &mut self.ctx);
        let duration = self.clock.since(started);

        let (mut next, mut outcome, mut error_message) = match executed {
            Ok(Some(next)) if next == current => (Some(next), TransitionOutcome::Retry, None),
            Ok(Some(next)) => (Some(next), TransitionOutcome::Success, None),
            Ok(None) => (None, TransitionOutcome::Terminated, None),
            Err(StateError::Asset(asset)) => {
                error!(state = %current, error = %asset, "fatal asset error");
                let message = asset.to_string();
                let record = transition_record(
                    &current,
                    None,
                    duration,
                    TransitionOutcome::Failed,
                    Some(message.clone()),
                );
                self.history = self.history.record(record);
                self.finish(Termination::Aborted(AbortReason::Fatal { message }));
                return Err(NavError::Asset(asset));
            }
            Err(err) => {
                let fallback = state
                    .on_error(&err)
                    .unwrap_or_else(|| self.policy.recovery_state.clone());
                warn!(state = %current, error = %err, %fallback, "state failed, falling back");
                (Some(fallback), TransitionOutcome::Failed, Some(err.to_string()))
            }
        };

        let mut forced = false;
        if let Some(decided) = &next {
            let repeats = self.counters.observe(decided);
            if repeats >= self.policy.max_stop_count {
                let recoveries = self.counters.force_recovery();
                warn!(
                    state = %current,
                    repeats,
                    recoveries,
                    recovery = %self.policy.recovery_state,
                    "stall detected, forcing recovery"
                );
                if let Err(e) = self.ctx.press_key(&self.policy.fallback_key) {
                    warn!(key = %self.policy.fallback_key, error = %e, "fallback key failed");
                }
                next = Some(self.policy.recovery_state.clone());
                outcome = TransitionOutcome::Failed;
                error_message = Some(format!(
                    "stalled in '{current}' for {repeats} repeats, forced recovery {recoveries}"
                ));
                forced = true;
            }
        }

        let record = transition_record(&current, next.clone(), duration, outcome, error_message);
        self.history = self.history.record(record.clone());
        state.on_exit(&mut self.ctx, next.as_deref());

        if forced && self.counters.recovery_count >= self.policy.break_count {
            let recoveries = self.counters.recovery_count;
            warn!(recoveries, "recovery budget exhausted");
            return Ok(Step::Finished(self.finish(Termination::Aborted(
                AbortReason::RecoveryExhausted { recoveries },
            ))));
        }

        let Some(next) = next else {
            return Ok(Step::Finished(self.finish(Termination::Success)));
        };

        if self.stop.is_stopped() {
            return Ok(Step::Finished(self.cancel()));
        }
        if !self.graph.contains(&next) {
            return Err(self.abort_unknown(&next));
        }

        self.clock.sleep(self.policy.state_transition_delay());
        self.counters.current_state = next;
        self.phase = if forced {
            LoopPhase::Recovering
        } else {
            LoopPhase::Running
        };
        Ok(Step::Continue(record))
    }

    /// Handle for stopping the run from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn phase(&self) -> &LoopPhase {
        &self.phase
    }

    pub fn status(&self) -> LoopStatus {
        LoopStatus {
            phase: self.phase.clone(),
            counters: self.counters.clone(),
            transitions: self.history.len(),
        }
    }

    pub fn counters(&self) -> &LoopCounters {
        &self.counters
    }

    /// The state that will run next, `None` once the run has ended.
    pub fn current_state(&self) -> Option<&str> {
        match self.phase {
            LoopPhase::Running | LoopPhase::Recovering => {
                Some(self.counters.current_state.as_str())
            }
            LoopPhase::Idle | LoopPhase::Terminated(_) => None,
        }
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn statistics(&self) -> NavigationStats {
        NavigationStats::from_history(&self.history)
    }

    /// Serializable summary of the latest run. `None` before the first start.
    pub fn report(&self) -> Option<RunReport> {
        let initial_state = self.initial_state.clone()?;
        let started_at = self.started_at?;
        let termination = match &self.phase {
            LoopPhase::Terminated(termination) => Some(termination.clone()),
            _ => None,
        };
        Some(RunReport::new(
            initial_state,
            started_at,
            self.finished_at,
            termination,
            self.counters.clone(),
            self.history.clone(),
        ))
    }

    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    /// Add a state between runs.
    pub fn register(&mut self, state: impl NavState + 'static) -> Result<(), NavError> {
        Ok(self.graph.register(state)?)
    }

    pub fn context_mut(&mut self) -> &mut NavContext {
        &mut self.ctx
    }

    fn abort_unknown(&mut self, name: &str) -> NavError {
        error!(state = name, "transition into unregistered state");
        let err = NavError::StateNotFound {
            name: name.to_string(),
        };
        self.finish(Termination::Aborted(AbortReason::Fatal {
            message: err.to_string(),
        }));
        err
    }

    fn cancel(&mut self) -> Termination {
        info!("stop requested");
        self.finish(Termination::Aborted(AbortReason::Cancelled))
    }

    fn finish(&mut self, termination: Termination) -> Termination {
        info!(
            %termination,
            iterations = self.counters.iterations,
            recoveries = self.counters.recovery_count,
            "navigation finished"
        );
        self.phase = LoopPhase::Terminated(termination.clone());
        self.finished_at = Some(Utc::now());
        termination
    }
}

fn transition_record(
    from: &str,
    to: Option<String>,
    duration: Duration,
    outcome: TransitionOutcome,
    error_message: Option<String>,
) -> TransitionRecord {
    TransitionRecord {
        from_state: from.to_string(),
        to_state: to,
        timestamp: Utc::now(),
        duration,
        outcome,
        error_message,
    }
}

fn execute(state: &mut dyn NavState, ctx: &mut NavContext) -> Result<Option<String>, StateError> {
    state.on_enter(ctx)?;
    state.execute(ctx)
}
