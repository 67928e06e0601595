//! `fractb run`: run the sweeps defined in `fractb.toml`.
//!
//! Loads the configuration, selects sweeps by exact name or substring
//! filter, runs each against the behavioral core, and prints one report per
//! sweep. Output paths in the configuration are relative to the directory
//! holding `fractb.toml`.

use std::path::{Path, PathBuf};

use fractb_config::{resolve_matching, resolve_sweep, CONFIG_FILE_NAME};

use crate::console::{execute, print_reports, SweepJob};
use crate::{GlobalArgs, RunArgs};

/// Runs the `fractb run` command.
///
/// Mismatches are reported, not failed: the exit code is 0 whenever every
/// selected sweep ran to completion.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config_path = resolve_config_path(global)?;
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let config = fractb_config::load_config_from_path(&config_path)?;

    let sweeps = match &args.name {
        Some(name) => vec![resolve_sweep(&config, name)?],
        None => resolve_matching(&config, args.filter.as_deref())?,
    };

    if sweeps.is_empty() {
        if !global.quiet {
            eprintln!("warning: no sweeps match the given filter");
        }
        return Ok(0);
    }

    if !global.quiet {
        eprintln!(
            "   Found {} sweep(s) in {}",
            sweeps.len(),
            config_path.display()
        );
    }

    let mut reports = Vec::with_capacity(sweeps.len());
    for sweep in &sweeps {
        let job = SweepJob {
            name: Some(&sweep.name),
            spec: sweep.spec,
            pins: sweep.pins.clone(),
            max_cycles: sweep.max_cycles,
            jobs: args.jobs.unwrap_or(sweep.jobs).max(1),
            latency: 1,
            csv: sweep.csv.as_ref().map(|p| base_dir.join(p)),
            vcd: sweep.vcd.as_ref().map(|p| base_dir.join(p)),
        };
        reports.push(execute(&job, global)?);
    }

    print_reports(&reports, args.format, global)?;
    Ok(0)
}

/// Locates `fractb.toml`: the `--config` file itself, `fractb.toml` inside
/// the `--config` directory, or `fractb.toml` in the working directory.
pub fn resolve_config_path(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match &global.config {
        Some(config) => {
            let p = PathBuf::from(config);
            if p.is_dir() {
                Ok(p.join(CONFIG_FILE_NAME))
            } else {
                Ok(p)
            }
        }
        None => Ok(std::env::current_dir()?.join(CONFIG_FILE_NAME)),
    }
}
