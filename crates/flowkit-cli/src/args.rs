//! Command-line argument definitions for the flowkit CLI.
//!
//! This module defines the [`Args`] structure parsed from the command
//! line using [`clap`]. Subcommands cover validating a diagram
//! definition, rendering it to SVG, and executing a scenario.

use clap::{Parser, Subcommand};

/// Command-line arguments for the flowkit diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse and validate a diagram definition
    Check {
        /// Path to the input diagram file
        input: String,
    },

    /// Render a diagram's static state to SVG
    Render {
        /// Path to the input diagram file
        input: String,

        /// Path to the output SVG file
        #[arg(short, long, default_value = "out.svg")]
        output: String,
    },

    /// Execute a scenario, streaming its events to the log
    Run {
        /// Path to the input diagram file
        input: String,

        /// Id of the scenario to run
        scenario: String,

        /// Preset to apply before running
        #[arg(short, long)]
        preset: Option<String>,

        /// Speed multiplier, clamped to [0.1, 10]
        #[arg(short, long, default_value_t = 1.0)]
        speed: f64,

        /// Write the final diagram state to this SVG file
        #[arg(short, long)]
        output: Option<String>,
    },
}
