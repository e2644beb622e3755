//! Trilinear sampling of full 3D records.

use super::{lerp, locate};
use crate::core_types::Vec3;
use crate::error::{FieldError, Result};
use crate::field::{FieldKind, FieldRecord};

/// Sample a Cartesian record at `point`.
///
/// Fails with a range error when the point lies outside the grid or the
/// record has no data. The eight corner samples are blended along x, then y,
/// then z, independently per component.
pub fn sample_trilinear(record: &FieldRecord, point: &Vec3) -> Result<Vec3> {
    if record.kind() != FieldKind::Cartesian {
        return Err(FieldError::structural(format!(
            "{}: trilinear sampling needs a 3D field",
            record.source_name()
        )));
    }
    if !record.has_data() {
        return Err(FieldError::range(record.source_name(), point));
    }
    let out_of_range = || FieldError::range(record.source_name(), point);
    let [ax, ay, az] = record.axes();
    let (ix, tx) = locate(ax, point.x).ok_or_else(out_of_range)?;
    let (iy, ty) = locate(ay, point.y).ok_or_else(out_of_range)?;
    let (iz, tz) = locate(az, point.z).ok_or_else(out_of_range)?;

    let data = record.payload();
    let corner = |dx: usize, dy: usize, dz: usize| record.index(ix + dx, iy + dy, iz + dz);
    let i000 = corner(0, 0, 0);
    let i100 = corner(1, 0, 0);
    let i010 = corner(0, 1, 0);
    let i110 = corner(1, 1, 0);
    let i001 = corner(0, 0, 1);
    let i101 = corner(1, 0, 1);
    let i011 = corner(0, 1, 1);
    let i111 = corner(1, 1, 1);

    let mut out = Vec3::zeros();
    for c in 0..3 {
        let c00 = lerp(data[i000 + c], data[i100 + c], tx);
        let c10 = lerp(data[i010 + c], data[i110 + c], tx);
        let c01 = lerp(data[i001 + c], data[i101 + c], tx);
        let c11 = lerp(data[i011 + c], data[i111 + c], tx);
        let c0 = lerp(c00, c10, ty);
        let c1 = lerp(c01, c11, ty);
        out[c] = lerp(c0, c1, tz);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::GridAxis;
    use approx::assert_relative_eq;

    fn linear_field() -> FieldRecord {
        let ax = GridAxis::new(4, -1.0, 2.0);
        let ay = GridAxis::new(3, 0.0, 1.0);
        let az = GridAxis::new(5, 10.0, 12.0);
        let mut payload = Vec::new();
        for iz in 0..az.count {
            for iy in 0..ay.count {
                for ix in 0..ax.count {
                    let (x, y, z) = (ax.coord_at(ix), ay.coord_at(iy), az.coord_at(iz));
                    payload.extend([2.0 * x - y, y + 0.5 * z, x + y + z]);
                }
            }
        }
        FieldRecord::cartesian([ax, ay, az], payload, "linear").unwrap()
    }

    #[test]
    fn test_linear_field_reproduced() {
        let record = linear_field();
        let p = Vec3::new(0.3, 0.77, 11.1);
        let v = sample_trilinear(&record, &p).unwrap();
        assert_relative_eq!(v.x, 2.0 * p.x - p.y, epsilon = 1e-9);
        assert_relative_eq!(v.y, p.y + 0.5 * p.z, epsilon = 1e-9);
        assert_relative_eq!(v.z, p.x + p.y + p.z, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_range() {
        let record = linear_field();
        let err = sample_trilinear(&record, &Vec3::new(0.0, 0.5, 9.0)).unwrap_err();
        assert!(matches!(err, FieldError::Range { .. }));
    }

    #[test]
    fn test_container_reports_range() {
        let record = FieldRecord::container("empty");
        assert!(matches!(
            sample_trilinear(&record, &Vec3::zeros()),
            Err(FieldError::Range { .. })
        ));
    }
}
