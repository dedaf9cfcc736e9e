//! The scenario execution engine.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::{Duration, Instant};

use log::{debug, info};

use flowkit_core::config::{
    ActionKind, DEFAULT_STEP_DURATION_MS, PresetConfig, ScenarioConfig, StepConfig,
};
use flowkit_core::value::Value;

use super::cancel::{CancelToken, Cancelled};
use super::evaluator::Evaluator;
use super::presets::{PresetInfo, PresetStore};
use super::stats::{StatState, StatStore};
use super::variables::VariableStore;
use crate::error::{Error, LimitKind};
use crate::event::{EngineEvent, EventHub, RunState, StepProgress};
use crate::model::Diagram;

/// Execution limits and timing floors.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Ceiling on total step executions per run; guards `goto` loops.
    pub max_step_executions: usize,
    /// Ceiling on nested `goto` depth per run.
    pub max_goto_depth: usize,
    /// Floor on any step wait, in milliseconds, applied before speed
    /// scaling.
    pub min_step_duration_ms: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_step_executions: 1000,
            max_goto_depth: 10,
            min_step_duration_ms: 16.0,
        }
    }
}

/// Outcome of one step; cancellation unwinds without being an error.
enum StepError {
    Cancelled,
    Fatal(Error),
}

impl From<Cancelled> for StepError {
    fn from(_: Cancelled) -> Self {
        StepError::Cancelled
    }
}

impl From<Error> for StepError {
    fn from(error: Error) -> Self {
        StepError::Fatal(error)
    }
}

type StepResult = Result<(), StepError>;

/// Progress bookkeeping for the scenario currently executing. A `goto`
/// opens a fresh frame for the target scenario; conditional branches
/// extend the branch path; `parallel` children run suppressed.
struct Frame<'a> {
    scenario: &'a ScenarioConfig,
    total: usize,
    counter: &'a AtomicUsize,
    branch_path: Vec<String>,
    parent_scenario: Option<String>,
    suppress_progress: bool,
}

impl<'a> Frame<'a> {
    fn branch(&self, side: &str) -> Frame<'a> {
        let mut branch_path = self.branch_path.clone();
        branch_path.push(side.to_string());
        Frame {
            scenario: self.scenario,
            total: self.total,
            counter: self.counter,
            branch_path,
            parent_scenario: self.parent_scenario.clone(),
            suppress_progress: self.suppress_progress,
        }
    }

    fn suppressed(&self) -> Frame<'a> {
        Frame {
            scenario: self.scenario,
            total: self.total,
            counter: self.counter,
            branch_path: self.branch_path.clone(),
            parent_scenario: self.parent_scenario.clone(),
            suppress_progress: true,
        }
    }
}

/// Walks a scenario's steps, evaluating conditions and mutating the
/// diagram and the stores. One run is active at a time; starting a
/// second while one is in flight is rejected.
pub struct ScenarioRunner {
    diagram: Arc<Diagram>,
    config: RunnerConfig,

    variables: Arc<VariableStore>,
    evaluator: Evaluator,
    presets: Mutex<PresetStore>,
    stats: Arc<StatStore>,
    events: Arc<EventHub>,

    state: Mutex<RunState>,
    speed: Mutex<f64>,
    cancel: Mutex<Arc<CancelToken>>,
    step_count: AtomicUsize,
    goto_depth: AtomicUsize,
    active_preset: Mutex<Option<String>>,
}

impl ScenarioRunner {
    pub(crate) fn new(
        diagram: Arc<Diagram>,
        events: Arc<EventHub>,
        config: RunnerConfig,
    ) -> Self {
        let variables = Arc::new(VariableStore::new());
        let evaluator = Evaluator::new(Arc::clone(&variables));

        let stats = Arc::new(StatStore::new());
        stats.initialize(&diagram.config().stats);

        let mut presets = PresetStore::new();
        presets.load(&diagram.config().presets);
        let active_preset = presets.default_preset_id().map(String::from);

        Self {
            diagram,
            config,
            variables,
            evaluator,
            presets: Mutex::new(presets),
            stats,
            events,
            state: Mutex::new(RunState::Idle),
            speed: Mutex::new(1.0),
            cancel: Mutex::new(Arc::new(CancelToken::new())),
            step_count: AtomicUsize::new(0),
            goto_depth: AtomicUsize::new(0),
            active_preset: Mutex::new(active_preset),
        }
    }

    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    /// Clamped to `[0.1, 10]`.
    pub fn set_speed(&self, multiplier: f64) {
        *lock(&self.speed) = multiplier.clamp(0.1, 10.0);
    }

    pub fn speed(&self) -> f64 {
        *lock(&self.speed)
    }

    /// Runs a scenario to completion.
    ///
    /// Execution errors abort the run, surface on the event stream, and
    /// are returned; a `stop()` mid-run unwinds silently with `Ok`.
    pub fn run_scenario(&self, scenario_id: &str) -> Result<(), Error> {
        let scenario = self
            .diagram
            .scenario(scenario_id)
            .ok_or_else(|| Error::execution(format!("scenario not found: {scenario_id}")))?;

        self.begin_run()?;
        self.step_count.store(0, Ordering::Relaxed);
        self.goto_depth.store(0, Ordering::Relaxed);
        *lock(&self.cancel) = Arc::new(CancelToken::new());

        info!(scenario = scenario_id; "scenario started");
        self.events.emit(&EngineEvent::ScenarioStart {
            scenario: scenario_id.to_string(),
        });

        match self.execute_scenario(scenario, None) {
            Ok(()) => {
                if self.state() == RunState::Running {
                    self.set_state(RunState::Completed);
                }
                self.events.emit(&EngineEvent::ScenarioEnd {
                    scenario: scenario_id.to_string(),
                });
                info!(scenario = scenario_id; "scenario completed");
                Ok(())
            }
            Err(StepError::Cancelled) => {
                debug!(scenario = scenario_id; "scenario cancelled");
                Ok(())
            }
            Err(StepError::Fatal(error)) => {
                self.events.emit(&EngineEvent::Error {
                    message: error.to_string(),
                });
                self.set_state(RunState::Idle);
                Err(error)
            }
        }
    }

    /// Applies a preset then runs.
    pub fn run_with_preset(&self, scenario_id: &str, preset_id: &str) -> Result<(), Error> {
        self.apply_preset(preset_id)?;
        self.run_scenario(scenario_id)
    }

    /// Resolves a preset's inherited variables and bulk-assigns them.
    pub fn apply_preset(&self, preset_id: &str) -> Result<(), Error> {
        let variables = lock(&self.presets).get_variables(preset_id)?;
        self.variables
            .set_from_exprs(&variables, |expr| self.evaluator.evaluate(expr))?;
        *lock(&self.active_preset) = Some(preset_id.to_string());
        self.events.emit(&EngineEvent::PresetChange {
            preset: preset_id.to_string(),
        });
        Ok(())
    }

    pub fn active_preset_id(&self) -> Option<String> {
        lock(&self.active_preset).clone()
    }

    pub fn presets(&self) -> Vec<PresetInfo> {
        lock(&self.presets).list()
    }

    /// Re-registers presets, replacing the current set; the default
    /// flag picks the active preset.
    pub fn load_presets(&self, presets: &[PresetConfig]) {
        let mut store = lock(&self.presets);
        store.load(presets);
        if let Some(default_id) = store.default_preset_id() {
            *lock(&self.active_preset) = Some(default_id.to_string());
        }
    }

    /// Cancels any in-flight run and clears animation state.
    pub fn stop(&self) {
        lock(&self.cancel).cancel();
        self.set_state(RunState::Idle);
        self.diagram.clear_animations();
        self.events.emit(&EngineEvent::Render);
    }

    /// Stops, then restores the diagram, variables, and stats to their
    /// initial state. Idempotent.
    pub fn reset(&self) {
        self.stop();
        self.step_count.store(0, Ordering::Relaxed);
        self.goto_depth.store(0, Ordering::Relaxed);
        self.variables.clear();
        self.stats.reset();
        self.diagram.reset_visuals();
        self.events.emit(&EngineEvent::Render);
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name)
    }

    pub fn set_variable(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.variables.set(name, value);
    }

    pub fn stat(&self, id: &str) -> Option<f64> {
        self.stats.get(id)
    }

    pub fn stat_states(&self) -> Vec<StatState> {
        self.stats.all()
    }

    pub fn format_stat(&self, id: &str) -> String {
        self.stats.format_value(id)
    }

    fn begin_run(&self) -> Result<(), Error> {
        let from = {
            let mut state = lock(&self.state);
            if *state == RunState::Running {
                return Err(Error::execution(
                    "a scenario is already running; stop it first".to_string(),
                ));
            }
            let from = *state;
            *state = RunState::Running;
            from
        };
        self.events.emit(&EngineEvent::StateChange {
            from,
            to: RunState::Running,
        });
        Ok(())
    }

    fn set_state(&self, to: RunState) {
        let from = {
            let mut state = lock(&self.state);
            if *state == to {
                return;
            }
            let from = *state;
            *state = to;
            from
        };
        self.events.emit(&EngineEvent::StateChange { from, to });
    }

    fn execute_scenario(
        &self,
        scenario: &ScenarioConfig,
        parent: Option<&Frame<'_>>,
    ) -> StepResult {
        if scenario.steps.is_empty() {
            return Ok(());
        }

        self.variables
            .set_from_exprs(&scenario.init, |expr| self.evaluator.evaluate(expr))
            .map_err(StepError::Fatal)?;

        let counter = AtomicUsize::new(0);
        let frame = Frame {
            scenario,
            total: visible_steps(&scenario.steps),
            counter: &counter,
            branch_path: Vec::new(),
            parent_scenario: parent.map(|p| p.scenario.display_name().to_string()),
            suppress_progress: parent.is_some_and(|p| p.suppress_progress),
        };

        for (index, step) in scenario.steps.iter().enumerate() {
            if self.token().is_cancelled() {
                return Err(StepError::Cancelled);
            }
            self.execute_step(step, index, &frame)?;
        }
        Ok(())
    }

    fn execute_step(&self, step: &StepConfig, index: usize, frame: &Frame<'_>) -> StepResult {
        let executed = self.step_count.fetch_add(1, Ordering::Relaxed) + 1;
        if executed > self.config.max_step_executions {
            return Err(StepError::Fatal(Error::LimitExceeded {
                kind: LimitKind::StepExecutions,
                limit: self.config.max_step_executions,
                actual: executed,
            }));
        }

        let scenario_id = frame.scenario.id.clone();
        self.events.emit(&EngineEvent::StepStart {
            scenario: scenario_id.clone(),
            action: step.action,
            index,
        });
        self.emit_progress(step, frame);

        match step.action {
            ActionKind::Highlight => self.execute_highlight(step)?,
            ActionKind::AnimateEdge => self.execute_animate_edge(step)?,
            ActionKind::Delay => self.wait(self.resolve_duration(step)?)?,
            ActionKind::Reset => {
                self.diagram.reset_visuals();
                self.events.emit(&EngineEvent::Render);
            }
            ActionKind::Log => self.emit_log(step),
            ActionKind::UpdateStat => self.apply_stats(step)?,
            ActionKind::Conditional => self.execute_conditional(step, frame)?,
            ActionKind::Goto => self.execute_goto(step, frame)?,
            ActionKind::Parallel => self.execute_parallel(step, frame)?,
        }

        self.events.emit(&EngineEvent::StepEnd {
            scenario: scenario_id,
            action: step.action,
            index,
        });
        Ok(())
    }

    fn emit_progress(&self, step: &StepConfig, frame: &Frame<'_>) {
        if frame.suppress_progress || step.action == ActionKind::Goto {
            return;
        }
        let current = frame.counter.fetch_add(1, Ordering::Relaxed) + 1;
        self.events.emit(&EngineEvent::Progress(StepProgress {
            scenario: frame.scenario.id.clone(),
            current,
            total: frame.total,
            label: step_label(step),
            branch_path: frame.branch_path.clone(),
            parent_scenario: frame.parent_scenario.clone(),
        }));
    }

    fn execute_highlight(&self, step: &StepConfig) -> StepResult {
        let color = step.style.as_ref().and_then(|style| style.color.clone());
        let glow = step.style.as_ref().is_some_and(|style| style.glow);

        for node_id in &step.nodes {
            match self.diagram.node(node_id) {
                Some(node) => node.set_highlight(color.clone(), glow),
                None => {
                    return Err(StepError::Fatal(Error::execution(format!(
                        "highlight target node not found: {node_id}"
                    ))));
                }
            }
        }
        for edge_id in &step.edges {
            match self.diagram.edge(edge_id) {
                Some(edge) => edge.set_highlight(color.clone()),
                None => {
                    return Err(StepError::Fatal(Error::execution(format!(
                        "highlight target edge not found: {edge_id}"
                    ))));
                }
            }
        }
        self.events.emit(&EngineEvent::Render);

        self.emit_log(step);
        self.apply_stats(step)?;
        self.wait(self.resolve_duration(step)?)
    }

    fn execute_animate_edge(&self, step: &StepConfig) -> StepResult {
        let edge_id = step
            .edge
            .as_deref()
            .ok_or_else(|| Error::execution("animate-edge step missing edge".to_string()))?;
        let edge = self.diagram.edge(edge_id).ok_or_else(|| {
            Error::execution(format!("animation target edge not found: {edge_id}"))
        })?;

        self.emit_log(step);
        self.apply_stats(step)?;

        let color = step.style.as_ref().and_then(|style| style.color.clone());
        edge.begin_animation(step.animation_label.clone(), color);
        self.events.emit(&EngineEvent::Render);

        // Drive progress 0 -> 1 at ~16 ms granularity, clearing the
        // animation even when the sweep is cancelled mid-flight.
        let total = Duration::from_secs_f64(self.resolve_duration(step)? / 1000.0);
        let tick = Duration::from_millis(16);
        let start = Instant::now();
        let result = loop {
            let elapsed = start.elapsed();
            if elapsed >= total {
                break Ok(());
            }
            if let Err(cancelled) = self.token().sleep(tick.min(total - elapsed)) {
                break Err(cancelled);
            }
            edge.set_progress(start.elapsed().as_secs_f64() / total.as_secs_f64());
            self.events.emit(&EngineEvent::Render);
        };

        match result {
            Ok(()) => {
                edge.set_progress(1.0);
                self.events.emit(&EngineEvent::Render);
                edge.end_animation();
                self.events.emit(&EngineEvent::Render);
                Ok(())
            }
            Err(cancelled) => {
                edge.end_animation();
                Err(cancelled.into())
            }
        }
    }

    fn execute_conditional(&self, step: &StepConfig, frame: &Frame<'_>) -> StepResult {
        // A missing condition always takes the then branch.
        let took_then = match &step.condition {
            Some(condition) => self.evaluator.evaluate_condition(condition)?,
            None => true,
        };
        self.events.emit(&EngineEvent::Branch {
            scenario: frame.scenario.id.clone(),
            took_then,
        });

        let (side, steps) = if took_then {
            ("then", Some(&step.then_steps))
        } else {
            ("else", step.else_steps.as_ref())
        };
        if let Some(steps) = steps {
            let branch_frame = frame.branch(side);
            for (index, sub_step) in steps.iter().enumerate() {
                if self.token().is_cancelled() {
                    return Err(StepError::Cancelled);
                }
                self.execute_step(sub_step, index, &branch_frame)?;
            }
        }
        Ok(())
    }

    fn execute_goto(&self, step: &StepConfig, frame: &Frame<'_>) -> StepResult {
        let target_id = step
            .scenario
            .as_deref()
            .ok_or_else(|| Error::execution("goto step missing scenario".to_string()))?;
        let target = self.diagram.scenario(target_id).ok_or_else(|| {
            Error::execution(format!("goto target scenario not found: {target_id}"))
        })?;

        let depth = self.goto_depth.fetch_add(1, Ordering::Relaxed) + 1;
        if depth > self.config.max_goto_depth {
            return Err(StepError::Fatal(Error::LimitExceeded {
                kind: LimitKind::GotoDepth,
                limit: self.config.max_goto_depth,
                actual: depth,
            }));
        }
        debug!(target = target_id, depth; "entering sub-scenario");

        let result = self.execute_scenario(target, Some(frame));
        self.goto_depth.fetch_sub(1, Ordering::Relaxed);
        result
    }

    fn execute_parallel(&self, step: &StepConfig, frame: &Frame<'_>) -> StepResult {
        if step.steps.is_empty() {
            return Ok(());
        }

        // Fan out, wait for all, then report the first fatal error if
        // any child hit one; a lone cancellation stays a cancellation.
        let child_frame = frame.suppressed();
        let results: Vec<StepResult> = std::thread::scope(|scope| {
            let handles: Vec<_> = step
                .steps
                .iter()
                .enumerate()
                .map(|(index, sub_step)| {
                    let child_frame = &child_frame;
                    scope.spawn(move || self.execute_step(sub_step, index, child_frame))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result,
                    Err(_) => Err(StepError::Fatal(Error::execution(
                        "parallel step panicked".to_string(),
                    ))),
                })
                .collect()
        });

        let mut cancelled = false;
        for result in results {
            match result {
                Ok(()) => {}
                Err(StepError::Cancelled) => cancelled = true,
                Err(fatal @ StepError::Fatal(_)) => return Err(fatal),
            }
        }
        if cancelled {
            return Err(StepError::Cancelled);
        }
        Ok(())
    }

    fn emit_log(&self, step: &StepConfig) {
        if let Some(spec) = &step.log {
            self.events.emit(&EngineEvent::Log {
                message: spec.message.clone(),
                level: spec.level,
            });
        }
    }

    /// Applies each entry as a delta to the named stat.
    fn apply_stats(&self, step: &StepConfig) -> StepResult {
        for (stat_id, expr) in &step.stats {
            let delta = self.evaluator.evaluate_number(expr)?;
            if let Some(change) = self.stats.increment(stat_id, delta) {
                self.events.emit(&EngineEvent::StatChange {
                    stat: stat_id.clone(),
                    old: change.old,
                    new: change.new,
                });
            }
        }
        Ok(())
    }

    /// Effective wait in milliseconds: `max(resolved, floor) / speed`.
    fn resolve_duration(&self, step: &StepConfig) -> Result<f64, Error> {
        let resolved = match &step.duration {
            Some(expr) => self.evaluator.evaluate_number(expr)?,
            None => DEFAULT_STEP_DURATION_MS,
        };
        Ok(resolved.max(self.config.min_step_duration_ms) / self.speed())
    }

    fn wait(&self, millis: f64) -> StepResult {
        self.token().sleep(Duration::from_secs_f64(millis / 1000.0))?;
        Ok(())
    }

    fn token(&self) -> Arc<CancelToken> {
        Arc::clone(&lock(&self.cancel))
    }
}

/// Visible-step count for progress totals: `goto` is invisible, a
/// conditional counts itself plus its larger branch, a parallel counts
/// as one.
fn visible_steps(steps: &[StepConfig]) -> usize {
    steps
        .iter()
        .map(|step| match step.action {
            ActionKind::Goto => 0,
            ActionKind::Conditional => {
                let then_count = visible_steps(&step.then_steps);
                let else_count = step
                    .else_steps
                    .as_deref()
                    .map(visible_steps)
                    .unwrap_or(0);
                1 + then_count.max(else_count)
            }
            _ => 1,
        })
        .sum()
}

/// Explicit label, or one synthesized from the action and its target.
fn step_label(step: &StepConfig) -> String {
    if let Some(label) = &step.label {
        return label.clone();
    }
    match step.action {
        ActionKind::Highlight => {
            let mut targets: Vec<&str> = step.nodes.iter().map(String::as_str).collect();
            targets.extend(step.edges.iter().map(String::as_str));
            if targets.is_empty() {
                "Highlight".to_string()
            } else {
                format!("Highlight {}", targets.join(", "))
            }
        }
        ActionKind::AnimateEdge => match &step.edge {
            Some(edge) => format!("Animate {edge}"),
            None => "Animate edge".to_string(),
        },
        ActionKind::Delay => "Wait".to_string(),
        ActionKind::Reset => "Reset".to_string(),
        ActionKind::Log => step
            .log
            .as_ref()
            .map(|spec| spec.message.clone())
            .unwrap_or_else(|| "Log".to_string()),
        ActionKind::UpdateStat => "Update stats".to_string(),
        ActionKind::Conditional => "Branch".to_string(),
        ActionKind::Goto => "Go to scenario".to_string(),
        ActionKind::Parallel => "Run in parallel".to_string(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
