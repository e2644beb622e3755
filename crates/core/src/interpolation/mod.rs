//! Point sampling of field records.
//!
//! Full 3D records are sampled trilinearly. Axisymmetric records are sampled
//! bilinearly in the `(r, z)` half-plane and rotated back into 3D.

pub mod axisymmetric;
pub mod trilinear;

pub use axisymmetric::{sample_axisymmetric, sample_slice};
pub use trilinear::sample_trilinear;

use crate::core_types::{GridAxis, Vec3};
use crate::error::Result;
use crate::field::{FieldKind, FieldRecord};

/// Fractional offsets within a cell may stray this far outside `[0, 1]`
/// before the lookup is treated as out of range.
const FRACTION_SLACK: f64 = 1e-3;

/// Closed-interval test of `point` against the record's 3D bounding box.
#[must_use]
pub fn point_in_bounds(record: &FieldRecord, point: &Vec3) -> bool {
    record.bounds().is_some_and(|b| b.contains(point))
}

/// Clamp each coordinate of `point` into the record's bounding box.
/// Records without bounds return the point unchanged.
#[must_use]
pub fn clip_to_bounds(record: &FieldRecord, point: &Vec3) -> Vec3 {
    record.bounds().map_or(*point, |b| b.clip(point))
}

/// Index of the grid sample nearest to `coord`, clamped onto the axis.
#[must_use]
pub fn nearest_index(axis: &GridAxis, coord: f64) -> usize {
    if axis.count < 2 || axis.delta <= 0.0 {
        return 0;
    }
    let scaled = ((coord - axis.min) / axis.delta).round();
    if scaled <= 0.0 {
        0
    } else {
        let index = scaled as usize;
        index.min(axis.count - 1)
    }
}

/// Sample the record's own grid, ignoring children.
pub fn sample_grid(record: &FieldRecord, point: &Vec3) -> Result<Vec3> {
    match record.kind() {
        FieldKind::Cartesian => sample_trilinear(record, point),
        FieldKind::Axisymmetric => sample_axisymmetric(record, point),
    }
}

/// Base cell index and fractional offset of `coord` along `axis`.
///
/// The index is `floor((coord - min) / delta)`, stepped down by one on the
/// top edge so that the last sample is reached with a fraction of 1.
pub(crate) fn locate(axis: &GridAxis, coord: f64) -> Option<(usize, f64)> {
    if axis.count < 2 || !axis.contains(coord) {
        return None;
    }
    let scaled = (coord - axis.min) / axis.delta;
    let mut index = scaled.floor().max(0.0) as usize;
    if index == axis.count - 1 {
        index -= 1;
    }
    if index >= axis.count - 1 {
        return None;
    }
    let fraction = scaled - index as f64;
    if !(-FRACTION_SLACK..=1.0 + FRACTION_SLACK).contains(&fraction) {
        return None;
    }
    Some((index, fraction))
}

#[inline]
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_interior_and_edges() {
        let axis = GridAxis::new(5, 0.0, 4.0);
        assert_eq!(locate(&axis, 0.0), Some((0, 0.0)));
        let (i, t) = locate(&axis, 2.5).unwrap();
        assert_eq!(i, 2);
        assert!((t - 0.5).abs() < 1e-12);
        assert_eq!(locate(&axis, 4.0), Some((3, 1.0)));
        assert_eq!(locate(&axis, 4.01), None);
        assert_eq!(locate(&axis, -0.01), None);
    }

    #[test]
    fn test_nearest_index_rounds() {
        let axis = GridAxis::new(11, 0.0, 1.0);
        assert_eq!(nearest_index(&axis, 0.34), 3);
        assert_eq!(nearest_index(&axis, 0.36), 4);
        assert_eq!(nearest_index(&axis, -3.0), 0);
        assert_eq!(nearest_index(&axis, 7.0), 10);
    }

    #[test]
    fn test_lerp_endpoints_exact() {
        assert_eq!(lerp(0.1, 0.7, 0.0), 0.1);
        assert_eq!(lerp(0.1, 0.7, 1.0), 0.7);
    }
}
