//! fractb CLI: the command-line interface for the escape-time core testbench.
//!
//! Provides `fractb run` for the sweeps named in `fractb.toml`, `fractb sweep`
//! for an ad-hoc sweep described by flags, and `fractb point` for verifying a
//! single coordinate. Every command drives the behavioral [`EscapeCore`]
//! model through the same handshake a simulated or physical core would see.
//!
//! [`EscapeCore`]: fractb_dut::EscapeCore

#![warn(missing_docs)]

mod console;
mod point;
mod run;
mod sweep;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::prelude::*;

/// fractb: hardware-in-the-loop verification of escape-time cores.
#[derive(Parser, Debug)]
#[command(name = "fractb", version, about = "Escape-time core testbench")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output, including passing points.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `fractb.toml` file or the directory containing one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run sweeps defined in `fractb.toml`.
    Run(RunArgs),
    /// Run one sweep described on the command line.
    Sweep(SweepArgs),
    /// Verify a single coordinate.
    Point(PointArgs),
}

/// Arguments for the `fractb run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Specific sweep name to run (optional).
    pub name: Option<String>,

    /// Substring filter for sweep names.
    #[arg(long)]
    pub filter: Option<String>,

    /// Override `harness.jobs`.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Summary output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Core family selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FamilyArg {
    /// Mandelbrot set: the coordinate is `c`.
    Mandelbrot,
    /// Julia set: the coordinate is the seed, `c` is fixed.
    Julia,
}

/// Grid endpoint policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EndpointsArg {
    /// `max` excluded on both axes.
    HalfOpen,
    /// Both ends included.
    Closed,
}

/// Summary output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Arguments for the `fractb sweep` subcommand.
#[derive(Parser, Debug)]
pub struct SweepArgs {
    /// Core family to verify.
    #[arg(long, value_enum, default_value_t = FamilyArg::Mandelbrot)]
    pub family: FamilyArg,

    /// Julia constant as `RE,IM` (default `-0.8,0.156`).
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    pub c: Option<Vec<f64>>,

    /// Real-axis range as `MIN,MAX`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, requires = "y")]
    pub x: Option<Vec<f64>>,

    /// Imaginary-axis range as `MIN,MAX`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, requires = "x")]
    pub y: Option<Vec<f64>>,

    /// Viewport center as `X,Y`.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, conflicts_with_all = ["x", "y"])]
    pub center: Option<Vec<f64>>,

    /// Viewport zoom factor.
    #[arg(long, conflicts_with_all = ["x", "y"])]
    pub zoom: Option<f64>,

    /// Samples per axis.
    #[arg(long, conflicts_with_all = ["width", "height"])]
    pub steps: Option<u32>,

    /// Columns.
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Rows.
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Sample placement policy.
    #[arg(long, value_enum, default_value_t = EndpointsArg::HalfOpen)]
    pub endpoints: EndpointsArg,

    /// Iteration cap driven onto the core.
    #[arg(long, default_value_t = 100)]
    pub max_iter: u32,

    /// Accepted `|hardware - reference|` difference.
    #[arg(long, default_value_t = 0)]
    pub tolerance: u32,

    /// Run-phase clock toggles allowed per point.
    #[arg(long, default_value_t = fractb_tb::DEFAULT_MAX_CYCLES)]
    pub max_cycles: u64,

    /// Worker threads.
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Clock edges per iteration in the core model.
    #[arg(long, default_value_t = 1)]
    pub latency: u32,

    /// Write the `x,y,iter` frame to this file.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write a VCD waveform of the whole sweep to this file.
    #[arg(long)]
    pub vcd: Option<PathBuf>,

    /// Summary output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `fractb point` subcommand.
#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
pub struct PointArgs {
    /// Real part of the coordinate.
    #[arg(allow_hyphen_values = true)]
    pub x: f64,

    /// Imaginary part of the coordinate.
    #[arg(allow_hyphen_values = true)]
    pub y: f64,

    /// Core family to verify.
    #[arg(long, value_enum, default_value_t = FamilyArg::Mandelbrot)]
    pub family: FamilyArg,

    /// Julia constant as `RE,IM` (default `-0.8,0.156`).
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    pub c: Option<Vec<f64>>,

    /// Iteration cap driven onto the core.
    #[arg(long, default_value_t = 1000)]
    pub max_iter: u32,

    /// Run-phase clock toggles allowed.
    #[arg(long, default_value_t = fractb_tb::DEFAULT_MAX_CYCLES)]
    pub max_cycles: u64,

    /// Clock edges per iteration in the core model.
    #[arg(long, default_value_t = 1)]
    pub latency: u32,

    /// Write a VCD waveform of the run to this file.
    #[arg(long)]
    pub vcd: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Sweep(ref args) => sweep::run(args, &global),
        Command::Point(ref args) => point::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(quiet: bool, verbose: bool) {
    let filter = default_log_level(quiet, verbose);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn default_log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}
