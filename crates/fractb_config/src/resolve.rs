//! Sweep resolution: turning `[sweeps.<name>]` tables into runnable sweeps.
//!
//! Each definition is checked field by field and converted into a
//! [`SweepSpec`] plus the [`PinMap`] for its core family, with the family's
//! `[pins.*]` overrides applied on top of the default port names.

use crate::error::ConfigError;
use crate::types::{FamilyName, HarnessConfig, PinNames, PinOverrides, SweepDef};
use fractb_common::{AxisRange, Coordinate, Family, Resolution, SweepSpec, Viewport};
use fractb_dut::{CoreKind, PinMap};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A sweep ready to hand to the runner.
#[derive(Debug, Clone)]
pub struct ResolvedSweep {
    /// The sweep's table name.
    pub name: String,
    /// Region, resolution, and comparison parameters.
    pub spec: SweepSpec,
    /// Port names of the core under test.
    pub pins: PinMap,
    /// Run-phase toggle budget per point.
    pub max_cycles: u64,
    /// Worker threads.
    pub jobs: usize,
    /// CSV frame output, if requested.
    pub csv: Option<PathBuf>,
    /// VCD waveform output, if requested.
    pub vcd: Option<PathBuf>,
}

/// Resolves the sweep called `name`.
pub fn resolve_sweep(config: &HarnessConfig, name: &str) -> Result<ResolvedSweep, ConfigError> {
    let def = config
        .sweeps
        .get(name)
        .ok_or_else(|| ConfigError::UnknownSweep(name.to_string()))?;
    let spec = sweep_spec(name, def)?;
    let pins = pin_map(&spec.family, &config.pins)?;
    Ok(ResolvedSweep {
        name: name.to_string(),
        spec,
        pins,
        max_cycles: config.harness.max_cycles,
        jobs: config.harness.jobs,
        csv: def.csv.clone(),
        vcd: def.vcd.clone(),
    })
}

/// Resolves every sweep whose name contains `filter`, in name order.
pub fn resolve_matching(
    config: &HarnessConfig,
    filter: Option<&str>,
) -> Result<Vec<ResolvedSweep>, ConfigError> {
    config
        .sweeps
        .keys()
        .filter(|name| filter.map_or(true, |f| name.contains(f)))
        .map(|name| resolve_sweep(config, name))
        .collect()
}

/// Converts one sweep table into a [`SweepSpec`], validating it.
pub fn sweep_spec(name: &str, def: &SweepDef) -> Result<SweepSpec, ConfigError> {
    let field = |f: &str| format!("sweeps.{name}.{f}");
    let invalid = |msg: String| ConfigError::ValidationError(format!("sweeps.{name}: {msg}"));

    let family = match (def.family, def.c) {
        (FamilyName::Mandelbrot, None) => Family::Mandelbrot,
        (FamilyName::Mandelbrot, Some(_)) => {
            return Err(invalid("`c` is only meaningful for julia sweeps".into()))
        }
        (FamilyName::Julia, Some([re, im])) => Family::Julia {
            c: Coordinate::new(re, im),
        },
        (FamilyName::Julia, None) => return Err(ConfigError::MissingField(field("c"))),
    };

    let (x, y) = match (def.x, def.y, def.center, def.zoom) {
        (Some(x), Some(y), None, None) => (range(x), range(y)),
        (None, None, Some([cx, cy]), Some(zoom)) => {
            if !(zoom > 0.0 && zoom.is_finite()) {
                return Err(invalid(format!("zoom must be positive, got {zoom}")));
            }
            Viewport {
                center: Coordinate::new(cx, cy),
                zoom,
            }
            .ranges()
        }
        (None, None, None, None) => return Err(ConfigError::MissingField(field("x"))),
        (Some(_), None, None, None) => return Err(ConfigError::MissingField(field("y"))),
        (None, Some(_), None, None) => return Err(ConfigError::MissingField(field("x"))),
        (None, None, Some(_), None) => return Err(ConfigError::MissingField(field("zoom"))),
        (None, None, None, Some(_)) => return Err(ConfigError::MissingField(field("center"))),
        _ => {
            return Err(invalid(
                "give the region as either `x`/`y` or `center`/`zoom`, not both".into(),
            ))
        }
    };
    for (axis, r) in [("x", x), ("y", y)] {
        if !(r.min < r.max) {
            return Err(invalid(format!(
                "{axis} range [{}, {}] must have min < max",
                r.min, r.max
            )));
        }
    }

    let resolution = match (def.steps, def.width, def.height) {
        (Some(n), None, None) => Resolution::Steps(n),
        (None, Some(width), Some(height)) => Resolution::Pixels { width, height },
        (None, None, None) => return Err(ConfigError::MissingField(field("steps"))),
        (None, Some(_), None) => return Err(ConfigError::MissingField(field("height"))),
        (None, None, Some(_)) => return Err(ConfigError::MissingField(field("width"))),
        _ => {
            return Err(invalid(
                "give the resolution as either `steps` or `width`/`height`, not both".into(),
            ))
        }
    };
    if resolution.columns() == 0 || resolution.rows() == 0 {
        return Err(invalid("resolution must be positive".into()));
    }
    if def.max_iter == 0 {
        return Err(invalid("max_iter must be positive".into()));
    }

    Ok(SweepSpec {
        family,
        x,
        y,
        resolution,
        endpoints: def.endpoints,
        max_iter: def.max_iter,
        tolerance: def.tolerance,
    })
}

/// Builds the pin map for `family`, applying its overrides.
pub fn pin_map(family: &Family, overrides: &PinOverrides) -> Result<PinMap, ConfigError> {
    let mut pins = PinMap::for_family(family);
    let (section, names): (&str, &PinNames) = match pins.kind {
        CoreKind::Mandelbrot => ("pins.mandelbrot", &overrides.mandelbrot),
        CoreKind::Julia => ("pins.julia", &overrides.julia),
    };
    let roles: Vec<_> = pins.pins().collect();
    for pin in roles {
        if let Some(name) = names.get(pin) {
            if name.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{section}: empty signal name for {pin:?}"
                )));
            }
            *pins.name_mut(pin) = name.to_string();
        }
    }
    let mut seen = BTreeSet::new();
    for pin in pins.pins() {
        if !seen.insert(pins.name(pin)) {
            return Err(ConfigError::ValidationError(format!(
                "{section}: signal '{}' is bound to more than one role",
                pins.name(pin)
            )));
        }
    }
    Ok(pins)
}

fn range([min, max]: [f64; 2]) -> AxisRange {
    AxisRange::new(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;
    use fractb_common::Endpoints;
    use fractb_dut::Pin;

    fn def(extra: &str) -> SweepDef {
        let text = format!("family = \"mandelbrot\"\nmax_iter = 100\n{extra}");
        toml::from_str(&text).unwrap()
    }

    #[test]
    fn explicit_region_and_steps() {
        let spec = sweep_spec("a", &def("x = [-2.0, 1.0]\ny = [-1.5, 1.5]\nsteps = 3")).unwrap();
        assert_eq!(spec.family, Family::Mandelbrot);
        assert_eq!(spec.x, AxisRange::new(-2.0, 1.0));
        assert_eq!(spec.resolution, Resolution::Steps(3));
        assert_eq!(spec.endpoints, Endpoints::HalfOpen);
        assert_eq!(spec.tolerance, 0);
    }

    #[test]
    fn viewport_region_and_pixels() {
        let spec = sweep_spec(
            "v",
            &def("center = [-0.5, 0.0]\nzoom = 1.0\nwidth = 1920\nheight = 1080"),
        )
        .unwrap();
        assert_eq!(spec.x, AxisRange::new(-2.25, 1.25));
        assert_eq!(spec.y, AxisRange::new(-1.0, 1.0));
        assert_eq!(
            spec.resolution,
            Resolution::Pixels {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn julia_requires_constant() {
        let mut d = def("x = [-1.5, 1.5]\ny = [-1.0, 1.0]\nsteps = 4");
        d.family = FamilyName::Julia;
        let err = sweep_spec("j", &d).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "sweeps.j.c"));

        d.c = Some([-0.8, 0.156]);
        let spec = sweep_spec("j", &d).unwrap();
        assert_eq!(spec.family.constant(), Some(Coordinate::new(-0.8, 0.156)));
    }

    #[test]
    fn mandelbrot_rejects_constant() {
        let d = def("c = [0.0, 0.0]\nx = [-2.0, 1.0]\ny = [-1.0, 1.0]\nsteps = 4");
        assert!(matches!(
            sweep_spec("m", &d),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn region_given_twice() {
        let d = def("x = [-2.0, 1.0]\ny = [-1.0, 1.0]\ncenter = [0.0, 0.0]\nzoom = 2.0\nsteps = 4");
        assert!(matches!(
            sweep_spec("m", &d),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn region_missing() {
        assert!(matches!(
            sweep_spec("m", &def("steps = 4")),
            Err(ConfigError::MissingField(ref f)) if f == "sweeps.m.x"
        ));
        assert!(matches!(
            sweep_spec("m", &def("center = [0.0, 0.0]\nsteps = 4")),
            Err(ConfigError::MissingField(ref f)) if f == "sweeps.m.zoom"
        ));
    }

    #[test]
    fn non_positive_zoom() {
        let d = def("center = [0.0, 0.0]\nzoom = 0.0\nsteps = 4");
        assert!(matches!(
            sweep_spec("m", &d),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn inverted_range() {
        let d = def("x = [1.0, -2.0]\ny = [-1.0, 1.0]\nsteps = 4");
        let err = sweep_spec("m", &d).unwrap_err();
        assert!(err.to_string().contains("min < max"));
    }

    #[test]
    fn resolution_rules() {
        let region = "x = [-2.0, 1.0]\ny = [-1.0, 1.0]\n";
        assert!(matches!(
            sweep_spec("m", &def(region)),
            Err(ConfigError::MissingField(ref f)) if f == "sweeps.m.steps"
        ));
        assert!(matches!(
            sweep_spec("m", &def(&format!("{region}width = 4"))),
            Err(ConfigError::MissingField(ref f)) if f == "sweeps.m.height"
        ));
        assert!(matches!(
            sweep_spec("m", &def(&format!("{region}steps = 0"))),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            sweep_spec("m", &def(&format!("{region}steps = 2\nwidth = 4\nheight = 4"))),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn zero_max_iter() {
        let mut d = def("x = [-2.0, 1.0]\ny = [-1.0, 1.0]\nsteps = 4");
        d.max_iter = 0;
        assert!(sweep_spec("m", &d)
            .unwrap_err()
            .to_string()
            .contains("max_iter"));
    }

    #[test]
    fn pin_overrides_apply_per_family() {
        let overrides = PinOverrides {
            mandelbrot: PinNames {
                clk: Some("clock".into()),
                ..PinNames::default()
            },
            julia: PinNames {
                x0: Some("seed_re".into()),
                ..PinNames::default()
            },
        };
        let m = pin_map(&Family::Mandelbrot, &overrides).unwrap();
        assert_eq!(m.name(Pin::Clk), "clock");
        assert_eq!(m.name(Pin::X0), "x0_i");

        let j = pin_map(
            &Family::Julia {
                c: Coordinate::new(0.0, 0.0),
            },
            &overrides,
        )
        .unwrap();
        assert_eq!(j.name(Pin::Clk), "clk_i");
        assert_eq!(j.name(Pin::X0), "seed_re");
    }

    #[test]
    fn duplicate_pin_names_rejected() {
        let overrides = PinOverrides {
            mandelbrot: PinNames {
                start: Some("clk_i".into()),
                ..PinNames::default()
            },
            ..PinOverrides::default()
        };
        let err = pin_map(&Family::Mandelbrot, &overrides).unwrap_err();
        assert!(err.to_string().contains("more than one role"));
    }

    #[test]
    fn resolve_named_and_filtered() {
        let toml = r#"
[harness]
max_cycles = 500
jobs = 2

[sweeps.overview]
family = "mandelbrot"
x = [-2.0, 1.0]
y = [-1.5, 1.5]
steps = 3
endpoints = "closed"
max_iter = 100
csv = "out/overview.csv"

[sweeps.julia_overview]
family = "julia"
c = [-0.8, 0.156]
center = [0.0, 0.0]
zoom = 1.0
steps = 8
max_iter = 200
"#;
        let config = load_config_from_str(toml).unwrap();
        let r = resolve_sweep(&config, "overview").unwrap();
        assert_eq!(r.max_cycles, 500);
        assert_eq!(r.jobs, 2);
        assert_eq!(r.spec.endpoints, Endpoints::Closed);
        assert_eq!(r.csv, Some(PathBuf::from("out/overview.csv")));
        assert_eq!(r.pins.kind, CoreKind::Mandelbrot);

        let all = resolve_matching(&config, None).unwrap();
        let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["julia_overview", "overview"]);

        let julia = resolve_matching(&config, Some("julia")).unwrap();
        assert_eq!(julia.len(), 1);
        assert_eq!(julia[0].pins.kind, CoreKind::Julia);
    }

    #[test]
    fn unknown_sweep_errors() {
        let config = HarnessConfig::default();
        let err = resolve_sweep(&config, "nope").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSweep(_)));
    }
}
