//! Points in the complex plane and the escape-time families sampled over them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point `(x, y)` in the complex plane, `x` real and `y` imaginary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Real part.
    pub x: f64,
    /// Imaginary part.
    pub y: f64,
}

impl Coordinate {
    /// Creates a coordinate from its real and imaginary parts.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared magnitude `x² + y²`.
    pub fn norm_sqr(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The escape-time recurrence a core computes.
///
/// Both families iterate `z ← z² + c`. They differ in how the sampled
/// coordinate is used: Mandelbrot seeds `z = 0` and uses the coordinate as
/// `c`; Julia seeds `z` with the coordinate and holds `c` fixed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Family {
    /// `z₀ = 0`, `c = point`.
    Mandelbrot,
    /// `z₀ = point`, `c` fixed for the whole sweep.
    Julia {
        /// The Julia constant.
        c: Coordinate,
    },
}

impl Family {
    /// Returns the short lowercase family name.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Mandelbrot => "mandelbrot",
            Family::Julia { .. } => "julia",
        }
    }

    /// Returns the Julia constant, if any.
    pub fn constant(&self) -> Option<Coordinate> {
        match self {
            Family::Mandelbrot => None,
            Family::Julia { c } => Some(*c),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Mandelbrot => write!(f, "mandelbrot"),
            Family::Julia { c } => write!(f, "julia(c = {} + {}i)", c.x, c.y),
        }
    }
}
