//! The escape-time core's signal contract.
//!
//! Every core exposes the same set of [`Pin`] roles; only the concrete
//! signal names differ between the Mandelbrot and Julia variants (and between
//! RTL revisions). A [`PinMap`] binds roles to names for one core.

use serde::{Deserialize, Serialize};
use std::fmt;

use fractb_common::fixed::WORD_BITS;
use fractb_common::Family;

/// Which variant of the escape-time core is being driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreKind {
    /// Seed fixed at zero, coordinate drives `c`.
    Mandelbrot,
    /// Coordinate drives the seed, separate `c` inputs.
    Julia,
}

impl From<&Family> for CoreKind {
    fn from(family: &Family) -> Self {
        match family {
            Family::Mandelbrot => CoreKind::Mandelbrot,
            Family::Julia { .. } => CoreKind::Julia,
        }
    }
}

impl fmt::Display for CoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreKind::Mandelbrot => write!(f, "mandelbrot"),
            CoreKind::Julia => write!(f, "julia"),
        }
    }
}

/// Direction of a pin as seen from the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Driven by the harness.
    Input,
    /// Driven by the device.
    Output,
}

/// A functional role in the core's port list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pin {
    /// Clock, toggled by the driver.
    Clk,
    /// Synchronous reset.
    Rst,
    /// One-cycle start pulse.
    Start,
    /// Seed / point real part.
    X0,
    /// Seed / point imaginary part.
    Y0,
    /// Julia constant real part.
    Cx,
    /// Julia constant imaginary part.
    Cy,
    /// Iteration cap.
    MaxIter,
    /// Computation finished.
    Done,
    /// Resulting iteration count, valid while `done` is high.
    Iter,
}

impl Pin {
    /// All roles in port-list order.
    pub const ALL: [Pin; 10] = [
        Pin::Clk,
        Pin::Rst,
        Pin::Start,
        Pin::X0,
        Pin::Y0,
        Pin::Cx,
        Pin::Cy,
        Pin::MaxIter,
        Pin::Done,
        Pin::Iter,
    ];

    /// Port width in bits.
    pub fn width(self) -> u32 {
        match self {
            Pin::Clk | Pin::Rst | Pin::Start | Pin::Done => 1,
            Pin::X0 | Pin::Y0 | Pin::Cx | Pin::Cy | Pin::MaxIter | Pin::Iter => WORD_BITS,
        }
    }

    /// Port direction.
    pub fn direction(self) -> Direction {
        match self {
            Pin::Done | Pin::Iter => Direction::Output,
            _ => Direction::Input,
        }
    }

    /// Whether a core of `kind` has this port.
    pub fn used_by(self, kind: CoreKind) -> bool {
        match self {
            Pin::Cx | Pin::Cy => kind == CoreKind::Julia,
            _ => true,
        }
    }

    /// Mask selecting the bits a port of this width can carry.
    pub fn mask(self) -> u64 {
        let w = self.width();
        if w >= 64 {
            u64::MAX
        } else {
            (1u64 << w) - 1
        }
    }
}

/// Binds each [`Pin`] role to a concrete signal name on one core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinMap {
    /// Core variant these names belong to.
    pub kind: CoreKind,
    /// Clock input.
    pub clk: String,
    /// Reset input.
    pub rst: String,
    /// Start input.
    pub start: String,
    /// Seed / point real part.
    pub x0: String,
    /// Seed / point imaginary part.
    pub y0: String,
    /// Julia constant real part.
    pub cx: String,
    /// Julia constant imaginary part.
    pub cy: String,
    /// Iteration cap.
    pub max_iter: String,
    /// Done output.
    pub done: String,
    /// Iteration count output.
    pub iter: String,
}

impl PinMap {
    /// Port names of the Mandelbrot core.
    pub fn mandelbrot() -> Self {
        Self {
            kind: CoreKind::Mandelbrot,
            clk: "clk_i".into(),
            rst: "rst_i".into(),
            start: "start_i".into(),
            x0: "x0_i".into(),
            y0: "y0_i".into(),
            cx: "cx_i".into(),
            cy: "cy_i".into(),
            max_iter: "max_iter_i".into(),
            done: "done_o".into(),
            iter: "iter_o".into(),
        }
    }

    /// Port names of the Julia core.
    pub fn julia() -> Self {
        Self {
            kind: CoreKind::Julia,
            x0: "zx_i".into(),
            y0: "zy_i".into(),
            ..Self::mandelbrot()
        }
    }

    /// Default port names for the core that computes `family`.
    pub fn for_family(family: &Family) -> Self {
        match CoreKind::from(family) {
            CoreKind::Mandelbrot => Self::mandelbrot(),
            CoreKind::Julia => Self::julia(),
        }
    }

    /// Returns the signal name bound to `pin`.
    pub fn name(&self, pin: Pin) -> &str {
        match pin {
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
        }
    }

    /// Mutable access to the name bound to `pin`.
    pub fn name_mut(&mut self, pin: Pin) -> &mut String {
        match pin {
            Pin::Clk => &mut self.clk,
            Pin::Rst => &mut self.rst,
            Pin::Start => &mut self.start,
            Pin::X0 => &mut self.x0,
            Pin::Y0 => &mut self.y0,
            Pin::Cx => &mut self.cx,
            Pin::Cy => &mut self.cy,
            Pin::MaxIter => &mut self.max_iter,
            Pin::Done => &mut self.done,
            Pin::Iter => &mut self.iter,
        }
    }

    /// Iterates the roles present on this core, in port-list order.
    pub fn pins(&self) -> impl Iterator<Item = Pin> + '_ {
        Pin::ALL.into_iter().filter(move |p| p.used_by(self.kind))
    }

    /// Resolves a signal name back to its role.
    pub fn lookup(&self, name: &str) -> Option<Pin> {
        self.pins().find(|&p| self.name(p) == name)
    }
}
