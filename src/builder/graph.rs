//! Builder for state graphs.

use crate::builder::error::BuildError;
use crate::navigator::NavContext;
use crate::states::{
    FnState, GraphError, ImageState, NavState, StateError, StateGraph, TerminalState,
};

/// Collects states and registers them in order on `build`.
///
/// Names are checked when the graph is built, so a duplicate anywhere in the
/// chain is reported instead of silently overwriting.
pub struct StateGraphBuilder {
    states: Vec<Box<dyn NavState>>,
}

impl StateGraphBuilder {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Add any state.
    pub fn state(mut self, state: impl NavState + 'static) -> Self {
        self.states.push(Box::new(state));
        self
    }

    /// Add an image-driven state with no alternatives or offset.
    pub fn image_state(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        next: impl Into<String>,
    ) -> Self {
        self.state(ImageState::new(name, target, next))
    }

    /// Add a closure-driven state.
    pub fn custom<F>(self, name: impl Into<String>, behavior: F) -> Self
    where
        F: FnMut(&mut NavContext) -> Result<Option<String>, StateError> + 'static,
    {
        self.state(FnState::new(name, behavior))
    }

    /// Add a state that ends the run.
    pub fn terminal(self, name: impl Into<String>) -> Self {
        self.state(TerminalState::new(name))
    }

    pub fn build(self) -> Result<StateGraph, BuildError> {
        let mut graph = StateGraph::new();
        for state in self.states {
            graph.register_boxed(state).map_err(|e| match e {
                GraphError::Duplicate { name } => BuildError::DuplicateState { name },
                other => BuildError::DanglingTargets(vec![other]),
            })?;
        }
        Ok(graph)
    }
}

impl Default for StateGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
