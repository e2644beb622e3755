//! Joining two 3D volumes that meet or overlap along z.

use crate::core_types::{nearly_equal, GridAxis, AXIS_NAMES};
use crate::error::{zeroed_payload, FieldError, Result};
use crate::field::{FieldKind, FieldRecord};
use std::path::Path;
use tracing::{info, warn};

/// Relative tolerance for comparing bounds and spacings of the two inputs
pub const MERGE_TOLERANCE: f64 = 1e-6;

fn require_volume(record: &FieldRecord) -> Result<()> {
    if record.kind() != FieldKind::Cartesian || !record.has_data() || !record.is_leaf() {
        return Err(FieldError::structural(format!(
            "{}: only 3D leaf fields can be merged",
            record.source_name()
        )));
    }
    Ok(())
}

fn check_match(quantity: &str, a: f64, b: f64) -> Result<()> {
    if nearly_equal(a, b, MERGE_TOLERANCE) {
        Ok(())
    } else {
        Err(FieldError::compatibility(
            quantity,
            format!("{a} does not match {b}"),
        ))
    }
}

/// Check that `a` and `b` can be stacked along z and return them ordered
/// as `(lower, upper)`.
pub fn z_compatible<'a>(
    a: &'a FieldRecord,
    b: &'a FieldRecord,
) -> Result<(&'a FieldRecord, &'a FieldRecord)> {
    require_volume(a)?;
    require_volume(b)?;
    for i in 0..2 {
        let (pa, pb) = (a.axis(i), b.axis(i));
        let name = AXIS_NAMES[i];
        check_match(&format!("{name} min"), pa.min, pb.min)?;
        check_match(&format!("{name} max"), pa.max, pb.max)?;
        check_match(&format!("{name} delta"), pa.delta, pb.delta)?;
    }
    check_match("z delta", a.axis(2).delta, b.axis(2).delta)?;

    let (lower, upper) = if b.axis(2).min <= a.axis(2).min {
        (b, a)
    } else {
        (a, b)
    };
    let (lz, uz) = (lower.axis(2), upper.axis(2));
    if lz.max < uz.min && !nearly_equal(lz.max, uz.min, MERGE_TOLERANCE) {
        return Err(FieldError::compatibility(
            "z range",
            format!(
                "gap between [{}, {}] and [{}, {}]",
                lz.min, lz.max, uz.min, uz.max
            ),
        ));
    }
    if uz.max <= lz.max {
        return Err(FieldError::compatibility(
            "z range",
            format!(
                "[{}, {}] adds nothing above [{}, {}]",
                uz.min, uz.max, lz.min, lz.max
            ),
        ));
    }
    Ok((lower, upper))
}

/// Stack two compatible volumes along z.
///
/// The result holds every plane of the lower volume followed by the planes
/// of the upper volume that lie above the lower volume's top plane. No
/// blending takes place in the overlap.
pub fn merge_z(a: &FieldRecord, b: &FieldRecord) -> Result<FieldRecord> {
    let (lower, upper) = z_compatible(a, b)?;
    let (lz, uz) = (*lower.axis(2), *upper.axis(2));

    // Plane of the upper volume that coincides with the lower volume's top.
    let offset = (lz.max - uz.min) / lz.delta;
    let overlap_plane = offset.round();
    if (offset - overlap_plane).abs() > 1e-3 {
        warn!(
            lower = %lower.source_name(),
            upper = %upper.source_name(),
            offset,
            "z planes of merged volumes are not aligned"
        );
    }
    let skip = overlap_plane as usize + 1;
    let upper_planes = uz.count - skip;
    let z = GridAxis {
        count: lz.count + upper_planes,
        min: lz.min,
        max: uz.max,
        delta: lz.delta,
    };

    let plane_len = upper.index(0, 0, 1);
    let mut payload = zeroed_payload(plane_len * z.count, "merged volume")?;
    let lower_len = lower.payload().len();
    payload[..lower_len].copy_from_slice(lower.payload());
    payload[lower_len..].copy_from_slice(&upper.payload()[skip * plane_len..]);

    let name = merged_file_name(lower.source_name(), z.min, z.max);
    let merged = FieldRecord::cartesian([*lower.axis(0), *lower.axis(1), z], payload, name)?;
    info!(
        lower = %lower.source_name(),
        upper = %upper.source_name(),
        planes = z.count,
        "Volumes merged"
    );
    Ok(merged)
}

/// Name for a merged volume: the lower input's stem with the z range
/// appended, e.g. `lens_-1.00-4.50.bin`.
#[must_use]
pub fn merged_file_name(lower_source: &str, z_min: f64, z_max: f64) -> String {
    let path = Path::new(lower_source);
    let stem = path
        .file_stem()
        .map_or_else(|| lower_source.to_string(), |s| s.to_string_lossy().into_owned());
    let file = format!("{stem}_{z_min:.2}-{z_max:.2}.bin");
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file).to_string_lossy().into_owned(),
        _ => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab(z_min: f64, nz: usize, name: &str, value: f64) -> FieldRecord {
        let x = GridAxis::new(2, 0.0, 1.0);
        let z = GridAxis::new(nz, z_min, z_min + (nz - 1) as f64 * 0.5);
        FieldRecord::cartesian([x, x, z], vec![value; 4 * nz * 3], name).unwrap()
    }

    #[test]
    fn test_overlapping_volumes() {
        let lower = slab(0.0, 5, "low.bin", 1.0);
        let upper = slab(1.0, 5, "high.bin", 2.0);
        let merged = merge_z(&upper, &lower).unwrap();
        assert_eq!(merged.axis(2).count, 7);
        assert_eq!(merged.axis(2).min, 0.0);
        assert_eq!(merged.axis(2).max, 3.0);
        let top_of_lower = merged.index(0, 0, 4);
        assert_eq!(merged.payload()[top_of_lower], 1.0);
        assert_eq!(merged.payload()[merged.index(0, 0, 5)], 2.0);
        assert_eq!(merged.source_name(), "low_0.00-3.00.bin");
    }

    #[test]
    fn test_gap_rejected() {
        let lower = slab(0.0, 3, "low.bin", 1.0);
        let upper = slab(1.5, 3, "high.bin", 2.0);
        match merge_z(&lower, &upper).unwrap_err() {
            FieldError::Compatibility { quantity, .. } => assert_eq!(quantity, "z range"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_z_spacing_mismatch() {
        let lower = slab(0.0, 3, "low.bin", 1.0);
        let x = GridAxis::new(2, 0.0, 1.0);
        let z = GridAxis::new(3, 1.0, 3.0);
        let upper = FieldRecord::cartesian([x, x, z], vec![0.0; 36], "high.bin").unwrap();
        match merge_z(&lower, &upper).unwrap_err() {
            FieldError::Compatibility { quantity, .. } => assert_eq!(quantity, "z delta"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_merged_file_name_keeps_directory() {
        assert_eq!(
            merged_file_name("runs/lens.bin", -1.0, 4.5),
            Path::new("runs").join("lens_-1.00-4.50.bin").to_string_lossy()
        );
        assert_eq!(merged_file_name("lens", 0.0, 2.0), "lens_0.00-2.00.bin");
    }
}
