//! Sweep descriptions and deterministic coordinate grids.
//!
//! A [`SweepSpec`] names a rectangular region, a resolution, and the
//! comparison parameters for one verification sweep. [`Grid`] enumerates its
//! sample points in row-major order: row 0 is `y.min`, column 0 is `x.min`,
//! and every row is emitted completely before the next one starts.

use serde::{Deserialize, Serialize};

use crate::coord::{Coordinate, Family};

/// Horizontal extent of a viewport at zoom 1.
pub const VIEW_WIDTH: f64 = 3.5;

/// Vertical extent of a viewport at zoom 1.
pub const VIEW_HEIGHT: f64 = 2.0;

/// A closed interval `[min, max]` along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl AxisRange {
    /// Creates a range from its bounds.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `max - min`.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Number of samples taken along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The same number of samples on both axes.
    Steps(u32),
    /// Explicit image dimensions: `width` columns by `height` rows.
    Pixels {
        /// Columns.
        width: u32,
        /// Rows.
        height: u32,
    },
}

impl Resolution {
    /// Number of columns.
    pub fn columns(&self) -> u32 {
        match *self {
            Resolution::Steps(n) => n,
            Resolution::Pixels { width, .. } => width,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        match *self {
            Resolution::Steps(n) => n,
            Resolution::Pixels { height, .. } => height,
        }
    }
}

/// How sample positions are distributed along an axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoints {
    /// `min + i·(max − min)/n`; `max` itself is never sampled.
    #[default]
    HalfOpen,
    /// Evenly spaced with both `min` and `max` sampled. One sample yields `min`.
    Closed,
}

/// A region given by its center and a zoom factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Center of the view.
    pub center: Coordinate,
    /// Magnification; 1.0 shows a 3.5 × 2.0 window.
    pub zoom: f64,
}

impl Viewport {
    /// Returns the `(x, y)` ranges covered by this view.
    pub fn ranges(&self) -> (AxisRange, AxisRange) {
        let half_w = VIEW_WIDTH / self.zoom / 2.0;
        let half_h = VIEW_HEIGHT / self.zoom / 2.0;
        (
            AxisRange::new(self.center.x - half_w, self.center.x + half_w),
            AxisRange::new(self.center.y - half_h, self.center.y + half_h),
        )
    }
}

/// Everything needed to run one verification sweep.
///
/// Owned by the caller and read-only to the harness.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    /// Which recurrence to verify.
    pub family: Family,
    /// Real-axis extent.
    pub x: AxisRange,
    /// Imaginary-axis extent.
    pub y: AxisRange,
    /// Samples per axis.
    pub resolution: Resolution,
    /// Sample placement policy.
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Iteration cap driven onto the core.
    pub max_iter: u32,
    /// Largest accepted `|hardware - reference|` iteration difference.
    #[serde(default)]
    pub tolerance: u32,
}

impl SweepSpec {
    /// Returns the sample grid for this sweep.
    pub fn grid(&self) -> Grid {
        Grid {
            x: self.x,
            y: self.y,
            columns: self.resolution.columns(),
            rows: self.resolution.rows(),
            endpoints: self.endpoints,
        }
    }

    /// Total number of sample points.
    pub fn total_samples(&self) -> u64 {
        self.resolution.columns() as u64 * self.resolution.rows() as u64
    }

    /// The four corners of the region, for range pre-checks.
    pub fn corners(&self) -> [Coordinate; 4] {
        [
            Coordinate::new(self.x.min, self.y.min),
            Coordinate::new(self.x.max, self.y.min),
            Coordinate::new(self.x.min, self.y.max),
            Coordinate::new(self.x.max, self.y.max),
        ]
    }
}

/// One sample position within a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPoint {
    /// Column index, 0 at `x.min`.
    pub column: u32,
    /// Row index, 0 at `y.min`.
    pub row: u32,
    /// The sampled coordinate.
    pub coordinate: Coordinate,
}

/// A rectangular, deterministic grid of sample coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid {
    x: AxisRange,
    y: AxisRange,
    columns: u32,
    rows: u32,
    endpoints: Endpoints,
}

impl Grid {
    /// Number of columns.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Coordinate of the sample at `(column, row)`.
    pub fn coordinate(&self, column: u32, row: u32) -> Coordinate {
        Coordinate::new(
            axis_value(self.x, column, self.columns, self.endpoints),
            axis_value(self.y, row, self.rows, self.endpoints),
        )
    }

    /// Iterates the points of one row, left to right.
    pub fn row(&self, row: u32) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.columns).map(move |column| GridPoint {
            column,
            row,
            coordinate: self.coordinate(column, row),
        })
    }

    /// Iterates every point in row-major order.
    pub fn points(&self) -> impl Iterator<Item = GridPoint> + '_ {
        (0..self.rows).flat_map(move |row| self.row(row))
    }
}

fn axis_value(range: AxisRange, index: u32, count: u32, endpoints: Endpoints) -> f64 {
    let i = index as f64;
    match endpoints {
        Endpoints::HalfOpen => range.min + i * range.span() / count as f64,
        Endpoints::Closed if count <= 1 => range.min,
        Endpoints::Closed => range.min + i * range.span() / (count - 1) as f64,
    }
}
