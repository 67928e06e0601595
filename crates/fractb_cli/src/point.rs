//! `fractb point`: verify a single coordinate and show the details.

use fractb_common::{AxisRange, Coordinate, Endpoints, Family, Resolution, SweepSpec};
use fractb_dut::{EscapeCore, PinMap};
use fractb_tb::{
    verify_coordinate, DriverConfig, FixedCoordinate, RunOutcome, Sample, SweepRunner,
    TraceSink, VcdTrace,
};

use crate::sweep::{family_name, pair, DEFAULT_JULIA_C};
use crate::{GlobalArgs, PointArgs, ReportFormat};

/// Runs the `fractb point` command.
pub fn run(args: &PointArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let spec = point_spec(args)?;
    fractb_tb::validate(&spec)?;
    let coordinate = Coordinate::new(args.x, args.y);
    let pins = PinMap::for_family(&spec.family);
    let driver = SweepRunner::new(DriverConfig {
        max_cycles: args.max_cycles,
    })
    .driver_for(&spec)?;
    let mut core = EscapeCore::with_pins(pins).with_iteration_latency(args.latency);

    let sample = match &args.vcd {
        Some(path) => {
            let mut trace = VcdTrace::create(path)?;
            let sample = verify_coordinate(&driver, &spec, coordinate, &mut core, Some(&mut trace))?;
            trace.finish()?;
            sample
        }
        None => verify_coordinate(&driver, &spec, coordinate, &mut core, None)?,
    };

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&sample)?),
        ReportFormat::Text => {
            if !global.quiet {
                print!("{}", render(&spec.family, &sample)?);
            }
        }
    }
    Ok(0)
}

fn point_spec(args: &PointArgs) -> Result<SweepSpec, Box<dyn std::error::Error>> {
    let family = match family_name(args.family) {
        fractb_config::FamilyName::Mandelbrot => {
            if args.c.is_some() {
                return Err("-c is only meaningful with --family julia".into());
            }
            Family::Mandelbrot
        }
        fractb_config::FamilyName::Julia => {
            let [re, im] = pair("c", &args.c)?.unwrap_or([DEFAULT_JULIA_C.x, DEFAULT_JULIA_C.y]);
            Family::Julia {
                c: Coordinate::new(re, im),
            }
        }
    };
    if args.max_iter == 0 {
        return Err("--max-iter must be positive".into());
    }
    Ok(SweepSpec {
        family,
        x: AxisRange::new(args.x, args.x),
        y: AxisRange::new(args.y, args.y),
        resolution: Resolution::Steps(1),
        endpoints: Endpoints::Closed,
        max_iter: args.max_iter,
        tolerance: 0,
    })
}

fn render(family: &Family, sample: &Sample) -> Result<String, Box<dyn std::error::Error>> {
    let fixed = FixedCoordinate::encode(sample.coordinate)?;
    let mut out = format!("point {} [{family}]\n", sample.coordinate);
    out.push_str(&format!(
        "  stimulus   x=0x{:08x} y=0x{:08x}\n",
        fixed.x.to_bits(),
        fixed.y.to_bits()
    ));
    match sample.outcome {
        RunOutcome::Completed { iterations, cycles } => out.push_str(&format!(
            "  hardware   {iterations} ({cycles} toggles)\n"
        )),
        RunOutcome::TimedOut { cycles } => {
            out.push_str(&format!("  hardware   timeout after {cycles} toggles\n"))
        }
    }
    out.push_str(&format!("  reference  {}\n", sample.reference));
    out.push_str(if sample.matched {
        "  PASS\n"
    } else {
        "  MISMATCH\n"
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Command};
    use clap::Parser;

    fn parse(argv: &[&str]) -> PointArgs {
        match Cli::parse_from(argv).command {
            Command::Point(args) => args,
            _ => panic!("expected Point command"),
        }
    }

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        }
    }

    #[test]
    fn render_escaping_point() {
        let args = parse(&["fractb", "point", "1", "1", "--max-iter", "50"]);
        let spec = point_spec(&args).unwrap();
        let driver = SweepRunner::default().driver_for(&spec).unwrap();
        let mut core = EscapeCore::new(fractb_dut::CoreKind::Mandelbrot);
        let sample =
            verify_coordinate(&driver, &spec, Coordinate::new(1.0, 1.0), &mut core, None).unwrap();
        let text = render(&spec.family, &sample).unwrap();
        assert!(text.starts_with("point (1, 1) [mandelbrot]\n"));
        assert!(text.contains("x=0x01000000 y=0x01000000"));
        assert!(text.contains("  hardware   2 ("));
        assert!(text.contains("  reference  2\n"));
        assert!(text.ends_with("  PASS\n"));
    }

    #[test]
    fn julia_point_uses_default_constant() {
        let args = parse(&["fractb", "point", "0", "0", "--family", "julia"]);
        let spec = point_spec(&args).unwrap();
        assert_eq!(spec.family.constant(), Some(DEFAULT_JULIA_C));
    }

    #[test]
    fn mandelbrot_rejects_constant() {
        let args = parse(&["fractb", "point", "0", "0", "-c", "0.1,0.2"]);
        assert!(point_spec(&args).is_err());
    }

    #[test]
    fn out_of_range_point_is_an_error() {
        let args = parse(&["fractb", "point", "200", "0"]);
        let err = run(&args, &quiet()).unwrap_err();
        assert!(err.to_string().contains("outside the Q8.24 range"));
    }

    #[test]
    fn point_writes_vcd() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("point.vcd");
        let path_arg = path.to_str().unwrap().to_string();
        let args = parse(&["fractb", "point", "-0.5", "0.5", "--vcd", &path_arg]);
        assert_eq!(run(&args, &quiet()).unwrap(), 0);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("$var wire 1 ' done_o $end"));
    }
}
