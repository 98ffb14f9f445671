//! qplace CLI: the command-line front end of the quadratic placer.
//!
//! Provides `qplace place` to place a JSON design and `qplace stats` to
//! inspect what the placer would see.

#![warn(missing_docs)]

mod pipeline;
mod place;
mod stats;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use qplace_config::SolveMode;

/// qplace: quadratic standard-cell placement.
#[derive(Parser, Debug)]
#[command(name = "qplace", version, about = "Quadratic placement engine")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also show note-level diagnostics.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `qplace.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Place a design and write the result.
    Place(PlaceArgs),
    /// Print instance, pad and net counts and the placement region.
    Stats {
        /// Design file (JSON).
        design: String,
    },
}

/// Arguments for the `qplace place` subcommand.
#[derive(Parser, Debug)]
pub struct PlaceArgs {
    /// Design file (JSON).
    pub design: String,

    /// Output path for the placed design; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Quadrisection depth (0 or 1 runs the global solve only).
    #[arg(long)]
    pub partition_depth: Option<u32>,

    /// Seed for the solver's initial guesses.
    #[arg(long)]
    pub seed: Option<u64>,

    /// How the global solve is organized.
    #[arg(long, value_enum)]
    pub solve_mode: Option<SolveModeArg>,
}

/// Global solve organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SolveModeArg {
    /// One system over all instances.
    Whole,
    /// One system per connected net group.
    NetGroups,
}

impl From<SolveModeArg> for SolveMode {
    fn from(arg: SolveModeArg) -> Self {
        match arg {
            SolveModeArg::Whole => SolveMode::Whole,
            SolveModeArg::NetGroups => SolveMode::NetGroups,
        }
    }
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to show notes.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var("TERM").is_ok_and(|t| t != "dumb"),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Place(ref args) => place::run(args, &global),
        Command::Stats { ref design } => stats::run(design, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
