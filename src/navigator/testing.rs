//! Shared fixture for navigator and state unit tests.

use super::{NavContext, NavigationLoop};
use crate::action::ActionExecutor;
use crate::cancel::StopHandle;
use crate::clock::ManualClock;
use crate::config::{NavigationConfig, VisionConfig};
use crate::sim::{RecordingInput, ScriptedMatcher, StaticFrameSource};
use crate::states::StateGraph;
use crate::vision::{Template, TemplateLibrary, WaitEngine};
use image::GrayImage;
use std::rc::Rc;

/// Simulated collaborators; every field shares state with the contexts it
/// builds.
pub(crate) struct Rig {
    pub frames: StaticFrameSource,
    pub matcher: ScriptedMatcher,
    pub input: RecordingInput,
    pub clock: ManualClock,
    pub stop: StopHandle,
    pub templates: TemplateLibrary,
    pub settings: VisionConfig,
}

impl Rig {
    pub const RECOVERY: &'static str = "recovery";

    /// A rig whose library holds an 8x8 template for each name.
    pub fn new(templates: &[&str]) -> Self {
        let library = TemplateLibrary::from_templates(
            templates
                .iter()
                .map(|name| Template::new(*name, GrayImage::new(8, 8))),
        );
        Self {
            frames: StaticFrameSource::new(64, 64),
            matcher: ScriptedMatcher::new(),
            input: RecordingInput::new(),
            clock: ManualClock::new(),
            stop: StopHandle::new(),
            templates: library,
            settings: VisionConfig::default(),
        }
    }

    pub fn context(&self) -> NavContext {
        let clock = Rc::new(self.clock.clone());
        let vision = WaitEngine::new(
            Box::new(self.frames.clone()),
            Box::new(self.matcher.clone()),
            self.templates.clone(),
            self.settings.threshold,
            clock.clone(),
            self.stop.clone(),
        );
        let actions = ActionExecutor::new(
            Box::new(self.input.clone()),
            clock.clone(),
            self.stop.clone(),
        );
        NavContext::new(
            vision,
            actions,
            clock,
            self.settings.clone(),
            Self::RECOVERY,
            "esc",
            self.stop.clone(),
        )
    }

    pub fn policy(&self) -> NavigationConfig {
        NavigationConfig {
            initial_state: "start".to_string(),
            recovery_state: Self::RECOVERY.to_string(),
            ..NavigationConfig::default()
        }
    }

    pub fn navigator(&self, graph: StateGraph, policy: NavigationConfig) -> NavigationLoop {
        NavigationLoop::new(graph, self.context(), policy)
    }
}
