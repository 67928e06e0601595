//! Shared foundational types for the fractb escape-time core testbench.
//!
//! This crate provides the Q8.24 fixed-point codec, complex-plane
//! coordinates, the fractal family selector, and sweep/grid descriptions.

#![warn(missing_docs)]

pub mod coord;
pub mod fixed;
pub mod grid;

pub use coord::{Coordinate, Family};
pub use fixed::{decode, encode, Fixed, RangeError};
pub use grid::{AxisRange, Endpoints, Grid, GridPoint, Resolution, SweepSpec, Viewport};
