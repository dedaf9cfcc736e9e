//! Scenario execution: evaluator, stores, cancellation, and the runner.

mod cancel;
mod evaluator;
mod presets;
mod runner;
mod stats;
mod variables;

pub use evaluator::Evaluator;
pub use presets::{PresetInfo, PresetStore};
pub use runner::{RunnerConfig, ScenarioRunner};
pub use stats::{StatChange, StatState, StatStore};
pub use variables::VariableStore;
