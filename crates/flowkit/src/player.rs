//! The embedding facade.

use std::fmt;
use std::sync::Arc;

use flowkit_core::config::{DiagramConfig, ScenarioConfig};
use flowkit_core::draw::Surface;
use flowkit_core::value::Value;
use flowkit_parser::{ParseOptions, Parser};

use crate::engine::{PresetInfo, RunnerConfig, ScenarioRunner, StatState};
use crate::error::Error;
use crate::event::{EngineEvent, EventHub, RunState, SubscriptionId};
use crate::model::Diagram;
use crate::render::{SvgSurface, draw_diagram};

/// One loaded diagram plus its execution engine.
///
/// A `Player` is `Send + Sync`; wrap it in an [`Arc`] to drive a run
/// from one thread while another calls [`stop`](Self::stop) or
/// [`set_speed`](Self::set_speed).
pub struct Player {
    diagram: Arc<Diagram>,
    runner: ScenarioRunner,
    events: Arc<EventHub>,
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("state", &self.state())
            .field("speed", &self.speed())
            .finish_non_exhaustive()
    }
}

impl Player {
    /// Parses a diagram definition and builds a ready-to-run player.
    pub fn load(source: &str) -> Result<Self, Error> {
        Self::load_with_options(source, ParseOptions::default())
    }

    pub fn load_with_options(source: &str, options: ParseOptions) -> Result<Self, Error> {
        let config = Parser::new(options).parse(source)?;
        Ok(Self::from_config(config))
    }

    /// Builds a player from an already validated config.
    pub fn from_config(config: DiagramConfig) -> Self {
        Self::with_runner_config(config, RunnerConfig::default())
    }

    /// Builds a player with custom execution limits; mainly for tests
    /// and embedders that need tighter ceilings.
    pub fn with_runner_config(config: DiagramConfig, runner_config: RunnerConfig) -> Self {
        let diagram = Arc::new(Diagram::new(config));
        let events = Arc::new(EventHub::new());
        let runner = ScenarioRunner::new(Arc::clone(&diagram), Arc::clone(&events), runner_config);
        Self {
            diagram,
            runner,
            events,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn scenarios(&self) -> &[ScenarioConfig] {
        self.diagram.scenarios()
    }

    pub fn presets(&self) -> Vec<PresetInfo> {
        self.runner.presets()
    }

    /// Runs a scenario to completion on the calling thread.
    ///
    /// Events stream to subscribers while the run progresses. Returns
    /// when the scenario completes, errors, or is stopped from another
    /// thread (a stop is not an error).
    pub fn run_scenario(&self, scenario_id: &str) -> Result<(), Error> {
        self.runner.run_scenario(scenario_id)
    }

    /// Applies a preset's variables, then runs.
    pub fn run_with_preset(&self, scenario_id: &str, preset_id: &str) -> Result<(), Error> {
        self.runner.run_with_preset(scenario_id, preset_id)
    }

    pub fn apply_preset(&self, preset_id: &str) -> Result<(), Error> {
        self.runner.apply_preset(preset_id)
    }

    pub fn active_preset_id(&self) -> Option<String> {
        self.runner.active_preset_id()
    }

    /// Speed multiplier, clamped to `[0.1, 10]`; applies to waits
    /// resolved after the call.
    pub fn set_speed(&self, multiplier: f64) {
        self.runner.set_speed(multiplier);
    }

    pub fn speed(&self) -> f64 {
        self.runner.speed()
    }

    /// Cancels any in-flight run and clears animation state.
    pub fn stop(&self) {
        self.runner.stop();
    }

    /// Stops and restores diagram, variables, and stats to their
    /// initial state.
    pub fn reset(&self) {
        self.runner.reset();
    }

    pub fn state(&self) -> RunState {
        self.runner.state()
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(&EngineEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Draws the diagram's current state onto the given surface.
    pub fn render(&self, surface: &mut dyn Surface) {
        draw_diagram(&self.diagram, surface);
    }

    /// Renders the current state as an SVG document.
    pub fn render_svg(&self) -> String {
        let mut surface = SvgSurface::new();
        self.render(&mut surface);
        surface.to_svg_string()
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.runner.variable(name)
    }

    pub fn set_variable(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.runner.set_variable(name, value);
    }

    pub fn stat(&self, id: &str) -> Option<f64> {
        self.runner.stat(id)
    }

    pub fn stats(&self) -> Vec<StatState> {
        self.runner.stat_states()
    }

    pub fn format_stat(&self, id: &str) -> String {
        self.runner.format_stat(id)
    }
}
