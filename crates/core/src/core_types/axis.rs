//! Per-axis grid metadata.

use serde::{Deserialize, Serialize};

/// Names used in diagnostics, indexed by axis.
pub const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// Sample count and extent of one grid axis.
///
/// For axes with `count > 1` the invariant `delta = (max - min) / (count - 1)`
/// holds and `max > min`. Degenerate axes (`count == 1`) have `delta == 0`
/// unless they describe the bounding box of an axisymmetric slice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    /// Number of samples along the axis
    pub count: usize,
    /// Coordinate of the first sample
    pub min: f64,
    /// Coordinate of the last sample
    pub max: f64,
    /// Spacing between samples
    pub delta: f64,
}

impl GridAxis {
    /// Build an axis from its extent, deriving `delta` from the count.
    #[must_use]
    pub fn new(count: usize, min: f64, max: f64) -> Self {
        let delta = if count > 1 {
            (max - min) / (count - 1) as f64
        } else {
            0.0
        };
        Self {
            count,
            min,
            max,
            delta,
        }
    }

    /// An axis with no samples, used by container records.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            count: 0,
            min: 0.0,
            max: 0.0,
            delta: 0.0,
        }
    }

    /// Whether the axis carries more than one sample
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.count > 1
    }

    /// Closed-interval containment test
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: f64) -> bool {
        coord >= self.min && coord <= self.max
    }

    /// Coordinate of sample `index`
    #[inline]
    #[must_use]
    pub fn coord_at(&self, index: usize) -> f64 {
        self.min + index as f64 * self.delta
    }
}

/// Soft containment tolerance: relative to the magnitude of the coordinate,
/// with an absolute floor near zero.
#[inline]
#[must_use]
pub fn soft_tolerance(coord: f64, relative: f64) -> f64 {
    if coord.abs() < relative {
        relative
    } else {
        relative * coord.abs()
    }
}

/// Relative equality used when comparing bounds and spacings of two grids.
#[must_use]
pub fn nearly_equal(a: f64, b: f64, relative: f64) -> bool {
    let scale = a.abs().min(b.abs());
    (a - b).abs() <= soft_tolerance(scale, relative)
}
