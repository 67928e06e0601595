//! Configuration types deserialized from `fractb.toml`.

use fractb_common::Endpoints;
use fractb_dut::Pin;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The top-level testbench configuration parsed from `fractb.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct HarnessConfig {
    /// Driver and scheduling settings shared by every sweep.
    #[serde(default)]
    pub harness: HarnessSettings,
    /// Signal-name overrides per core family.
    #[serde(default)]
    pub pins: PinOverrides,
    /// Named sweeps, run in name order.
    #[serde(default)]
    pub sweeps: BTreeMap<String, SweepDef>,
}

/// Settings under `[harness]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HarnessSettings {
    /// Run-phase clock toggles allowed per point before a timeout.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u64,
    /// Worker threads for sweeps. `1` runs serially.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_max_cycles() -> u64 {
    10_000
}

fn default_jobs() -> usize {
    1
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            max_cycles: default_max_cycles(),
            jobs: default_jobs(),
        }
    }
}

/// Pin-name overrides under `[pins.mandelbrot]` and `[pins.julia]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PinOverrides {
    /// Overrides applied to Mandelbrot cores.
    #[serde(default)]
    pub mandelbrot: PinNames,
    /// Overrides applied to Julia cores.
    #[serde(default)]
    pub julia: PinNames,
}

/// Optional replacement names, one per pin role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PinNames {
    /// Clock input.
    pub clk: Option<String>,
    /// Synchronous reset input.
    pub rst: Option<String>,
    /// Start request input.
    pub start: Option<String>,
    /// Point (Mandelbrot) or seed (Julia) real part.
    #[serde(alias = "zx")]
    pub x0: Option<String>,
    /// Point (Mandelbrot) or seed (Julia) imaginary part.
    #[serde(alias = "zy")]
    pub y0: Option<String>,
    /// Julia constant real part.
    pub cx: Option<String>,
    /// Julia constant imaginary part.
    pub cy: Option<String>,
    /// Iteration cap input.
    pub max_iter: Option<String>,
    /// Completion output.
    pub done: Option<String>,
    /// Iteration count output.
    pub iter: Option<String>,
}

impl PinNames {
    /// The override for `pin`, if one is configured.
    pub fn get(&self, pin: Pin) -> Option<&str> {
        let name = match pin {
            Pin::Clk => &self.clk,
            Pin::Rst => &self.rst,
            Pin::Start => &self.start,
            Pin::X0 => &self.x0,
            Pin::Y0 => &self.y0,
            Pin::Cx => &self.cx,
            Pin::Cy => &self.cy,
            Pin::MaxIter => &self.max_iter,
            Pin::Done => &self.done,
            Pin::Iter => &self.iter,
        };
        name.as_deref()
    }
}

/// The recurrence a sweep verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyName {
    /// Mandelbrot set.
    Mandelbrot,
    /// Julia set; requires `c`.
    Julia,
}

/// One `[sweeps.<name>]` table.
///
/// The region is given either as `x`/`y` ranges or as `center` + `zoom`,
/// and the resolution either as `steps` or as `width` + `height`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SweepDef {
    /// Which core family to verify.
    pub family: FamilyName,
    /// Julia constant `[re, im]`.
    pub c: Option<[f64; 2]>,
    /// Real-axis range `[min, max]`.
    pub x: Option<[f64; 2]>,
    /// Imaginary-axis range `[min, max]`.
    pub y: Option<[f64; 2]>,
    /// Viewport center `[x, y]`.
    pub center: Option<[f64; 2]>,
    /// Viewport zoom factor.
    pub zoom: Option<f64>,
    /// Samples per axis.
    pub steps: Option<u32>,
    /// Columns.
    pub width: Option<u32>,
    /// Rows.
    pub height: Option<u32>,
    /// Sample placement policy.
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Iteration cap driven onto the core.
    pub max_iter: u32,
    /// Accepted `|hardware - reference|` difference.
    #[serde(default)]
    pub tolerance: u32,
    /// CSV frame output path.
    pub csv: Option<PathBuf>,
    /// VCD waveform output path.
    pub vcd: Option<PathBuf>,
}
