//! Sweep execution and terminal output shared by the subcommands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use fractb_common::SweepSpec;
use fractb_dut::{EscapeCore, PinMap};
use fractb_tb::{
    CsvSink, DriverConfig, Report, Sample, SampleSink, SweepRunner, TbError, VcdTrace,
};
use tracing::warn;

use crate::{GlobalArgs, ReportFormat};

/// Prints one line per sample to stdout: every mismatch, and passes when verbose.
pub struct ConsoleSink {
    quiet: bool,
    verbose: bool,
}

impl ConsoleSink {
    /// Creates a sink honoring the global verbosity flags.
    pub fn new(global: &GlobalArgs) -> Self {
        Self {
            quiet: global.quiet,
            verbose: global.verbose,
        }
    }
}

impl SampleSink for ConsoleSink {
    fn accept(&mut self, sample: &Sample) -> Result<(), TbError> {
        if self.quiet || (sample.matched && !self.verbose) {
            return Ok(());
        }
        println!("{}", describe(sample));
        Ok(())
    }
}

/// One-line description of a sample.
pub fn describe(sample: &Sample) -> String {
    let verdict = if sample.matched { "pass    " } else { "MISMATCH" };
    let hardware = match sample.outcome.iterations() {
        Some(n) => n.to_string(),
        None => format!("timeout after {} toggles", sample.outcome.cycles()),
    };
    format!(
        "{verdict} at {}: hardware={hardware} reference={}",
        sample.coordinate, sample.reference
    )
}

/// Everything needed to run one sweep on the behavioral core.
pub struct SweepJob<'a> {
    /// Sweep name, for status lines and the report.
    pub name: Option<&'a str>,
    /// The sweep itself.
    pub spec: SweepSpec,
    /// Port names of the core.
    pub pins: PinMap,
    /// Run-phase toggle budget per point.
    pub max_cycles: u64,
    /// Worker threads.
    pub jobs: usize,
    /// Clock edges per iteration in the core model.
    pub latency: u32,
    /// CSV frame output.
    pub csv: Option<PathBuf>,
    /// VCD waveform output.
    pub vcd: Option<PathBuf>,
}

/// Runs `job` and returns its report.
pub fn execute(job: &SweepJob<'_>, global: &GlobalArgs) -> Result<Report, Box<dyn std::error::Error>> {
    // Outputs are only truncated once the sweep is known to be runnable.
    fractb_tb::validate(&job.spec)?;
    let runner = SweepRunner::new(DriverConfig {
        max_cycles: job.max_cycles,
    })
    .with_pins(job.pins.clone());
    let make_core = || EscapeCore::with_pins(job.pins.clone()).with_iteration_latency(job.latency);

    let mut sinks: Vec<Box<dyn SampleSink>> = vec![Box::new(ConsoleSink::new(global))];
    if let Some(path) = &job.csv {
        ensure_parent(path)?;
        sinks.push(Box::new(CsvSink::create(path)?));
    }

    if !global.quiet {
        eprintln!(
            "   Sweeping {}{} over {} points (max_iter {}, tolerance {})",
            job.name.map(|n| format!("{n}: ")).unwrap_or_default(),
            job.spec.family,
            job.spec.total_samples(),
            job.spec.max_iter,
            job.spec.tolerance
        );
    }

    let started = Instant::now();
    let stats = match &job.vcd {
        Some(path) => {
            if job.jobs > 1 {
                warn!(jobs = job.jobs, "waveform tracing runs serially; ignoring jobs");
            }
            ensure_parent(path)?;
            let mut trace = VcdTrace::create(path)?;
            runner.run(&job.spec, &mut make_core(), &mut sinks, Some(&mut trace))?
        }
        None if job.jobs > 1 => runner.run_parallel(&job.spec, job.jobs, make_core, &mut sinks)?,
        None => runner.run(&job.spec, &mut make_core(), &mut sinks, None)?,
    };

    let report = Report::new(&stats, started.elapsed());
    Ok(match job.name {
        Some(name) => report.named(name),
        None => report,
    })
}

/// Prints finished reports in the requested format.
pub fn print_reports(
    reports: &[Report],
    format: ReportFormat,
    global: &GlobalArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        ReportFormat::Json => {
            let text = if reports.len() == 1 {
                serde_json::to_string_pretty(&reports[0])?
            } else {
                serde_json::to_string_pretty(reports)?
            };
            println!("{text}");
        }
        ReportFormat::Text => {
            if global.quiet {
                return Ok(());
            }
            for report in reports {
                eprintln!();
                for line in report.to_string().lines() {
                    eprintln!("   {line}");
                }
                eprintln!(
                    "   {} points, mean latency {:.1} toggles, {:.2}s elapsed",
                    report.total_samples, report.mean_cycles, report.elapsed_secs
                );
            }
        }
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), TbError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| TbError::SinkOpen {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
