//! CLI logic for the flowkit diagram tool.

mod args;

pub use args::{Args, Command};

use std::fs;

use log::{info, warn};

use flowkit::{EngineEvent, Error, Player};

/// Run the flowkit CLI application
///
/// # Errors
///
/// Returns [`Error`] for file I/O failures, parse and validation
/// failures, and scenario execution failures.
pub fn run(args: &Args) -> Result<(), Error> {
    match &args.command {
        Command::Check { input } => check(input),
        Command::Render { input, output } => render(input, output),
        Command::Run {
            input,
            scenario,
            preset,
            speed,
            output,
        } => run_scenario(input, scenario, preset.as_deref(), *speed, output.as_deref()),
    }
}

fn load(input: &str) -> Result<Player, Error> {
    let source = fs::read_to_string(input)?;
    Player::load(&source)
}

fn check(input: &str) -> Result<(), Error> {
    let player = load(input)?;
    info!(
        nodes = player.diagram().nodes().count(),
        edges = player.diagram().edges().count(),
        scenarios = player.scenarios().len();
        "Diagram is valid"
    );
    Ok(())
}

fn render(input: &str, output: &str) -> Result<(), Error> {
    let player = load(input)?;
    fs::write(output, player.render_svg())?;
    info!(output_file = output; "SVG exported successfully");
    Ok(())
}

fn run_scenario(
    input: &str,
    scenario: &str,
    preset: Option<&str>,
    speed: f64,
    output: Option<&str>,
) -> Result<(), Error> {
    let player = load(input)?;
    player.set_speed(speed);

    player.subscribe(|event| match event {
        EngineEvent::Progress(progress) => {
            info!(
                scenario = progress.scenario,
                step = progress.current,
                total = progress.total;
                "{}",
                progress.label
            );
        }
        EngineEvent::Log { message, .. } => info!("{message}"),
        EngineEvent::StatChange { stat, new, .. } => {
            info!(stat, value = new; "stat updated");
        }
        EngineEvent::Error { message } => warn!("{message}"),
        _ => {}
    });

    match preset {
        Some(preset_id) => player.run_with_preset(scenario, preset_id)?,
        None => player.run_scenario(scenario)?,
    }

    if let Some(output) = output {
        fs::write(output, player.render_svg())?;
        info!(output_file = output; "Final state exported");
    }
    Ok(())
}
