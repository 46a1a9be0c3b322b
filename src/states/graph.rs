//! Registry of state behaviors keyed by name.

use super::error::GraphError;
use super::state::NavState;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

/// Ordered collection of uniquely named states.
///
/// Registration order is kept, so `names` and `expected_templates` are
/// stable across runs.
///
/// ```rust
/// use menupilot::states::{ImageState, StateGraph, TerminalState};
///
/// let mut graph = StateGraph::new();
/// graph.register(ImageState::new("menu", "play.png", "play")).unwrap();
/// graph.register(TerminalState::new("play")).unwrap();
///
/// assert!(graph.register(TerminalState::new("play")).is_err());
/// assert_eq!(graph.names(), vec!["menu", "play"]);
/// assert!(graph.validate_targets().is_success());
/// ```
#[derive(Default)]
pub struct StateGraph {
    states: Vec<Box<dyn NavState>>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state. A name that is already taken is rejected.
    pub fn register(&mut self, state: impl NavState + 'static) -> Result<(), GraphError> {
        self.register_boxed(Box::new(state))
    }

    pub fn register_boxed(&mut self, state: Box<dyn NavState>) -> Result<(), GraphError> {
        if self.contains(state.name()) {
            return Err(GraphError::Duplicate {
                name: state.name().to_string(),
            });
        }
        debug!(state = state.name(), "state registered");
        self.states.push(state);
        Ok(())
    }

    /// Add or overwrite a state, returning the one it displaced.
    pub fn replace(&mut self, state: impl NavState + 'static) -> Option<Box<dyn NavState>> {
        let state: Box<dyn NavState> = Box::new(state);
        match self.position(state.name()) {
            Some(index) => Some(std::mem::replace(&mut self.states[index], state)),
            None => {
                self.states.push(state);
                None
            }
        }
    }

    pub fn unregister(&mut self, name: &str) -> Result<Box<dyn NavState>, GraphError> {
        let index = self.position(name).ok_or_else(|| not_found(name))?;
        Ok(self.states.remove(index))
    }

    pub fn get(&self, name: &str) -> Result<&dyn NavState, GraphError> {
        self.states
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
            .ok_or_else(|| not_found(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut (dyn NavState + 'static), GraphError> {
        match self.position(name) {
            Some(index) => Ok(self.states[index].as_mut()),
            None => Err(not_found(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.states.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Every template any state may look for, first occurrence order.
    pub fn expected_templates(&self) -> Vec<String> {
        let mut templates: Vec<String> = Vec::new();
        for template in self.states.iter().flat_map(|s| s.expected_templates()) {
            if !templates.contains(&template) {
                templates.push(template);
            }
        }
        templates
    }

    /// Check that every declared target names a registered state.
    ///
    /// All dangling targets are reported, not just the first.
    pub fn validate_targets(&self) -> Validation<(), NonEmptyVec<GraphError>> {
        let checks: Vec<Validation<(), NonEmptyVec<GraphError>>> = self
            .states
            .iter()
            .flat_map(|state| {
                state.static_targets().into_iter().map(move |target| {
                    if self.contains(&target) {
                        Validation::success(())
                    } else {
                        Validation::fail(GraphError::UnknownTarget {
                            state: state.name().to_string(),
                            target,
                        })
                    }
                })
            })
            .collect();

        Validation::all_vec(checks).map(|_| ())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| s.name() == name)
    }
}

impl std::fmt::Debug for StateGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateGraph")
            .field("states", &self.names())
            .finish()
    }
}

fn not_found(name: &str) -> GraphError {
    GraphError::NotFound {
        name: name.to_string(),
    }
}
