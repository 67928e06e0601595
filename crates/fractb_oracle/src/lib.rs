//! Floating-point reference model for escape-time iteration counts.
//!
//! These functions are the ground truth a hardware core is judged against.
//! They are pure: identical arguments always produce identical counts.
//!
//! The escape test is `x² + y² > 4.0` in `f64`, the same radius-2,
//! squared-magnitude comparison the core performs, so the two never disagree
//! merely because of a different threshold. A returned count equal to
//! `max_iter` means the orbit did not escape.

#![warn(missing_docs)]

use fractb_common::{Coordinate, Family};

/// Squared escape radius shared with the hardware core.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Iterates `z ← z² + c` from `z`, counting steps until `|z|² > 4` or
/// `max_iter` is reached.
fn escape_count(mut x: f64, mut y: f64, c_re: f64, c_im: f64, max_iter: u32) -> u32 {
    let mut iter = 0;
    while x * x + y * y <= ESCAPE_RADIUS_SQ && iter < max_iter {
        let xtemp = x * x - y * y + c_re;
        y = 2.0 * x * y + c_im;
        x = xtemp;
        iter += 1;
    }
    iter
}

/// Mandelbrot iteration count for the point `(x0, y0)`: `z₀ = 0`, `c = (x0, y0)`.
pub fn mandelbrot_iterations(x0: f64, y0: f64, max_iter: u32) -> u32 {
    escape_count(0.0, 0.0, x0, y0, max_iter)
}

/// Julia iteration count for the seed `(x0, y0)` with constant `(c_re, c_im)`.
pub fn julia_iterations(x0: f64, y0: f64, c_re: f64, c_im: f64, max_iter: u32) -> u32 {
    escape_count(x0, y0, c_re, c_im, max_iter)
}

/// Reference count for `point` under `family`.
pub fn iterations(family: Family, point: Coordinate, max_iter: u32) -> u32 {
    match family {
        Family::Mandelbrot => mandelbrot_iterations(point.x, point.y, max_iter),
        Family::Julia { c } => julia_iterations(point.x, point.y, c.x, c.y, max_iter),
    }
}
