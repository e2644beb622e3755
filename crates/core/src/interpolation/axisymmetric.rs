//! Bilinear sampling of axisymmetric slices and projection into 3D.

use super::{lerp, locate};
use crate::core_types::Vec3;
use crate::error::{FieldError, Result};
use crate::field::{FieldKind, FieldRecord};

/// Sample the `(r, z)` slice of an axisymmetric record.
///
/// Returns the `(radial, axial)` component pair. `point` is only used to
/// report the original query in a range error.
pub fn sample_slice(record: &FieldRecord, r: f64, z: f64, point: &Vec3) -> Result<[f64; 2]> {
    if record.kind() != FieldKind::Axisymmetric {
        return Err(FieldError::structural(format!(
            "{}: slice sampling needs an axisymmetric field",
            record.source_name()
        )));
    }
    if !record.has_data() {
        return Err(FieldError::range(record.source_name(), point));
    }
    let out_of_range = || FieldError::range(record.source_name(), point);
    let (ir, tr) = locate(record.axis(1), r).ok_or_else(out_of_range)?;
    let (iz, tz) = locate(record.axis(2), z).ok_or_else(out_of_range)?;

    let data = record.payload();
    let i00 = record.slice_index(ir, iz);
    let i10 = record.slice_index(ir + 1, iz);
    let i01 = record.slice_index(ir, iz + 1);
    let i11 = record.slice_index(ir + 1, iz + 1);

    let mut out = [0.0; 2];
    for (c, value) in out.iter_mut().enumerate() {
        let c0 = lerp(data[i00 + c], data[i10 + c], tr);
        let c1 = lerp(data[i01 + c], data[i11 + c], tr);
        *value = lerp(c0, c1, tz);
    }
    Ok(out)
}

/// Answer a 3D query from an axisymmetric record.
///
/// The point is reduced to `r = sqrt(x² + y²)`, the slice is sampled at
/// `(r, z)` and the radial component is rotated back onto x and y. On the
/// axis itself the radial direction is undefined and the x/y components are 0.
pub fn sample_axisymmetric(record: &FieldRecord, point: &Vec3) -> Result<Vec3> {
    if !super::point_in_bounds(record, point) {
        return Err(FieldError::range(record.source_name(), point));
    }
    let r = point.x.hypot(point.y);
    let (cos, sin) = if r > 0.0 {
        (point.x / r, point.y / r)
    } else {
        (0.0, 0.0)
    };
    let [radial, axial] = sample_slice(record, r, point.z, point)?;
    Ok(Vec3::new(radial * cos, radial * sin, axial))
}
