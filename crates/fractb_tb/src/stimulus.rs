//! Fixed-point input frames for one core evaluation.

use fractb_common::{Coordinate, Family, Fixed, RangeError};

/// A complex value encoded as a pair of Q8.24 words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedCoordinate {
    /// Real part.
    pub x: Fixed,
    /// Imaginary part.
    pub y: Fixed,
}

impl FixedCoordinate {
    /// Encodes both parts of `point`.
    pub fn encode(point: Coordinate) -> Result<Self, RangeError> {
        Ok(Self {
            x: Fixed::encode(point.x)?,
            y: Fixed::encode(point.y)?,
        })
    }

    /// Decodes back to a real coordinate.
    pub fn decode(&self) -> Coordinate {
        Coordinate::new(self.x.decode(), self.y.decode())
    }
}

/// Everything driven onto the core's data inputs for one computation.
///
/// For Mandelbrot cores `point` is `c` and the seed is implicitly zero; for
/// Julia cores `point` is the seed and `constant` is `c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StimulusFrame {
    /// The sampled coordinate.
    pub point: FixedCoordinate,
    /// The Julia constant; `None` for Mandelbrot.
    pub constant: Option<FixedCoordinate>,
    /// Iteration cap.
    pub max_iter: u32,
}

impl StimulusFrame {
    /// Encodes the frame that verifies `point` under `family`.
    pub fn encode(family: &Family, point: Coordinate, max_iter: u32) -> Result<Self, RangeError> {
        Ok(Self {
            point: FixedCoordinate::encode(point)?,
            constant: family.constant().map(FixedCoordinate::encode).transpose()?,
            max_iter,
        })
    }
}
