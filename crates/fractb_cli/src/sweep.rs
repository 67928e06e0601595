//! `fractb sweep`: run one sweep described entirely by flags.
//!
//! The flags are folded into the same table a `[sweeps.<name>]` entry would
//! produce, so ad-hoc sweeps go through the configuration layer's checks.
//! Without a region the sweep covers the default viewport (zoom 1, centered
//! on `-0.5` for Mandelbrot and on the origin for Julia).

use fractb_common::{Coordinate, Endpoints};
use fractb_config::{FamilyName, SweepDef};
use fractb_dut::PinMap;

use crate::console::{execute, print_reports, SweepJob};
use crate::{EndpointsArg, FamilyArg, GlobalArgs, SweepArgs};

/// Julia constant used when `--c` is not given.
pub const DEFAULT_JULIA_C: Coordinate = Coordinate::new(-0.8, 0.156);

/// Samples per axis used when no resolution is given.
const DEFAULT_STEPS: u32 = 64;

/// Runs the `fractb sweep` command.
pub fn run(args: &SweepArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let def = sweep_def(args)?;
    let spec = fractb_config::sweep_spec("sweep", &def)?;
    let job = SweepJob {
        name: None,
        spec,
        pins: PinMap::for_family(&spec.family),
        max_cycles: args.max_cycles,
        jobs: args.jobs.max(1),
        latency: args.latency,
        csv: args.csv.clone(),
        vcd: args.vcd.clone(),
    };
    let report = execute(&job, global)?;
    print_reports(&[report], args.format, global)?;
    Ok(0)
}

/// Folds the sweep flags into a sweep table, filling in defaults.
fn sweep_def(args: &SweepArgs) -> Result<SweepDef, Box<dyn std::error::Error>> {
    let family = family_name(args.family);
    let c = match family {
        FamilyName::Julia => Some(pair("c", &args.c)?.unwrap_or([DEFAULT_JULIA_C.x, DEFAULT_JULIA_C.y])),
        FamilyName::Mandelbrot => pair("c", &args.c)?,
    };

    let x = pair("x", &args.x)?;
    let y = pair("y", &args.y)?;
    let (center, zoom) = if x.is_some() || y.is_some() {
        (pair("center", &args.center)?, args.zoom)
    } else {
        let default_center = match family {
            FamilyName::Mandelbrot => [-0.5, 0.0],
            FamilyName::Julia => [0.0, 0.0],
        };
        (
            Some(pair("center", &args.center)?.unwrap_or(default_center)),
            Some(args.zoom.unwrap_or(1.0)),
        )
    };

    let steps = match (args.steps, args.width, args.height) {
        (None, None, None) => Some(DEFAULT_STEPS),
        (steps, _, _) => steps,
    };

    Ok(SweepDef {
        family,
        c,
        x,
        y,
        center,
        zoom,
        steps,
        width: args.width,
        height: args.height,
        endpoints: endpoints(args.endpoints),
        max_iter: args.max_iter,
        tolerance: args.tolerance,
        csv: args.csv.clone(),
        vcd: args.vcd.clone(),
    })
}

pub(crate) fn family_name(arg: FamilyArg) -> FamilyName {
    match arg {
        FamilyArg::Mandelbrot => FamilyName::Mandelbrot,
        FamilyArg::Julia => FamilyName::Julia,
    }
}

fn endpoints(arg: EndpointsArg) -> Endpoints {
    match arg {
        EndpointsArg::HalfOpen => Endpoints::HalfOpen,
        EndpointsArg::Closed => Endpoints::Closed,
    }
}

/// Checks that a comma-separated flag carried exactly two numbers.
pub(crate) fn pair(
    flag: &str,
    values: &Option<Vec<f64>>,
) -> Result<Option<[f64; 2]>, Box<dyn std::error::Error>> {
    match values.as_deref() {
        None => Ok(None),
        Some(&[a, b]) => Ok(Some([a, b])),
        Some(other) => Err(format!(
            "--{flag} takes two comma-separated numbers, got {}",
            other.len()
        )
        .into()),
    }
}
