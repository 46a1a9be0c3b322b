//! Builder that wires collaborators into a navigation loop.

use crate::action::{ActionExecutor, InputDevice};
use crate::builder::error::BuildError;
use crate::cancel::StopHandle;
use crate::clock::{Clock, SystemClock};
use crate::config::NavigatorConfig;
use crate::navigator::{NavContext, NavigationLoop};
use crate::states::StateGraph;
use crate::vision::{FrameSource, NccMatcher, TemplateLibrary, TemplateMatcher, WaitEngine};
use std::rc::Rc;
use stillwater::validation::Validation;
use tracing::info;

/// Assembles a [`NavigationLoop`] from a configuration, a state graph and
/// the platform collaborators.
///
/// Required: a graph, a frame source and an input device. Defaults: the
/// default configuration, [`NccMatcher`], [`SystemClock`], and templates
/// loaded from `paths.images_dir` for every template the graph expects.
///
/// `build` checks everything it can before any state runs: configuration
/// values, the initial and recovery states, declared targets and template
/// assets.
pub struct NavigatorBuilder {
    config: NavigatorConfig,
    graph: Option<StateGraph>,
    frames: Option<Box<dyn FrameSource>>,
    input: Option<Box<dyn InputDevice>>,
    matcher: Option<Box<dyn TemplateMatcher>>,
    templates: Option<TemplateLibrary>,
    clock: Option<Rc<dyn Clock>>,
    stop: Option<StopHandle>,
}

impl NavigatorBuilder {
    pub fn new() -> Self {
        Self {
            config: NavigatorConfig::default(),
            graph: None,
            frames: None,
            input: None,
            matcher: None,
            templates: None,
            clock: None,
            stop: None,
        }
    }

    pub fn config(mut self, config: NavigatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn graph(mut self, graph: StateGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn frame_source(mut self, frames: impl FrameSource + 'static) -> Self {
        self.frames = Some(Box::new(frames));
        self
    }

    pub fn input(mut self, input: impl InputDevice + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn matcher(mut self, matcher: impl TemplateMatcher + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    /// Use an already loaded library instead of reading `images_dir`.
    pub fn templates(mut self, templates: TemplateLibrary) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Rc::new(clock));
        self
    }

    /// Share a stop handle created ahead of the loop.
    pub fn stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn build(self) -> Result<NavigationLoop, BuildError> {
        if let Validation::Failure(violations) = self.config.validate() {
            return Err(BuildError::InvalidConfig(
                violations.iter().cloned().collect(),
            ));
        }

        let graph = self.graph.ok_or(BuildError::MissingGraph)?;
        let frames = self.frames.ok_or(BuildError::MissingFrameSource)?;
        let input = self.input.ok_or(BuildError::MissingInput)?;

        let navigation = &self.config.navigation;
        for (role, name) in [
            ("initial", &navigation.initial_state),
            ("recovery", &navigation.recovery_state),
        ] {
            if !graph.contains(name) {
                return Err(BuildError::UnknownState {
                    role,
                    name: name.clone(),
                });
            }
        }
        if let Validation::Failure(dangling) = graph.validate_targets() {
            return Err(BuildError::DanglingTargets(dangling.iter().cloned().collect()));
        }

        let expected = graph.expected_templates();
        let templates = match self.templates {
            Some(library) => {
                let missing = library.missing(&expected);
                if !missing.is_empty() {
                    return Err(BuildError::MissingTemplates(missing));
                }
                library
            }
            None => TemplateLibrary::load_all(&self.config.paths.images_dir, &expected)?,
        };

        let clock = self.clock.unwrap_or_else(|| Rc::new(SystemClock));
        let stop = self.stop.unwrap_or_default();
        let matcher = self.matcher.unwrap_or_else(|| Box::new(NccMatcher));

        let vision = WaitEngine::new(
            frames,
            matcher,
            templates,
            self.config.vision.threshold,
            Rc::clone(&clock),
            stop.clone(),
        );
        let actions = ActionExecutor::new(input, Rc::clone(&clock), stop.clone());
        let ctx = NavContext::new(
            vision,
            actions,
            clock,
            self.config.vision.clone(),
            navigation.recovery_state.clone(),
            navigation.fallback_key.clone(),
            stop,
        );

        info!(
            states = graph.len(),
            templates = expected.len(),
            initial = %navigation.initial_state,
            "navigator assembled"
        );
        Ok(NavigationLoop::new(graph, ctx, self.config.navigation))
    }
}

impl Default for NavigatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateGraphBuilder;
    use crate::clock::ManualClock;
    use crate::sim::{RecordingInput, ScriptedMatcher, StaticFrameSource};
    use crate::vision::Template;
    use image::GrayImage;

    fn config() -> NavigatorConfig {
        let mut config = NavigatorConfig::default();
        config.navigation.initial_state = "start".to_string();
        config.navigation.recovery_state = "start".to_string();
        config
    }

    fn graph() -> StateGraph {
        StateGraphBuilder::new()
            .image_state("start", "start.png", "end")
            .terminal("end")
            .build()
            .unwrap()
    }

    fn library() -> TemplateLibrary {
        TemplateLibrary::from_templates([Template::new("start.png", GrayImage::new(4, 4))])
    }

    fn complete() -> NavigatorBuilder {
        NavigatorBuilder::new()
            .config(config())
            .graph(graph())
            .frame_source(StaticFrameSource::new(32, 32))
            .input(RecordingInput::new())
            .matcher(ScriptedMatcher::new())
            .templates(library())
            .clock(ManualClock::new())
    }

    #[test]
    fn complete_builder_produces_idle_loop() {
        let nav = complete().build().unwrap();
        assert!(nav.current_state().is_none());
        assert_eq!(nav.graph().len(), 2);
    }

    #[test]
    fn missing_collaborators_are_reported() {
        let no_graph = NavigatorBuilder::new()
            .config(config())
            .frame_source(StaticFrameSource::new(8, 8))
            .input(RecordingInput::new())
            .build();
        let no_frames = NavigatorBuilder::new()
            .config(config())
            .graph(graph())
            .input(RecordingInput::new())
            .build();
        let no_input = NavigatorBuilder::new()
            .config(config())
            .graph(graph())
            .frame_source(StaticFrameSource::new(8, 8))
            .build();

        assert!(matches!(no_graph, Err(BuildError::MissingGraph)));
        assert!(matches!(no_frames, Err(BuildError::MissingFrameSource)));
        assert!(matches!(no_input, Err(BuildError::MissingInput)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut bad = config();
        bad.vision.threshold = -0.5;
        bad.navigation.max_iterations = 0;

        let result = complete().config(bad).build();

        assert!(matches!(result, Err(BuildError::InvalidConfig(v)) if v.len() == 2));
    }

    #[test]
    fn unknown_recovery_state_is_rejected() {
        let mut cfg = config();
        cfg.navigation.recovery_state = "undefined_menu".to_string();

        let result = complete().config(cfg).build();

        assert!(matches!(
            result,
            Err(BuildError::UnknownState { role: "recovery", .. })
        ));
    }

    #[test]
    fn dangling_target_is_rejected() {
        let graph = StateGraphBuilder::new()
            .image_state("start", "start.png", "lobby")
            .build()
            .unwrap();

        let result = complete().graph(graph).build();

        assert!(matches!(result, Err(BuildError::DanglingTargets(e)) if e.len() == 1));
    }

    #[test]
    fn missing_template_is_rejected() {
        let result = complete().templates(TemplateLibrary::new()).build();

        assert!(matches!(
            result,
            Err(BuildError::MissingTemplates(names)) if names == vec!["start.png".to_string()]
        ));
    }

    #[test]
    fn templates_load_from_images_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        GrayImage::new(4, 4)
            .save(dir.path().join("start.png"))
            .unwrap();
        let mut cfg = config();
        cfg.paths.images_dir = dir.path().to_path_buf();

        let nav = NavigatorBuilder::new()
            .config(cfg)
            .graph(graph())
            .frame_source(StaticFrameSource::new(8, 8))
            .input(RecordingInput::new())
            .clock(ManualClock::new())
            .build();

        assert!(nav.is_ok());
    }

    #[test]
    fn absent_image_file_is_an_asset_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = config();
        cfg.paths.images_dir = dir.path().to_path_buf();

        let result = NavigatorBuilder::new()
            .config(cfg)
            .graph(graph())
            .frame_source(StaticFrameSource::new(8, 8))
            .input(RecordingInput::new())
            .build();

        assert!(matches!(result, Err(BuildError::Asset(_))));
    }
}
