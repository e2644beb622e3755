//! Four-fold symmetrisation of 3D fields about the z axis.
//!
//! Fields of electrodes with mirror symmetry in x and y pick up numerical
//! noise that breaks the symmetry. Averaging each quartet of mirror points
//! `(±x, ±y, z)` restores it: Ex is odd in x and even in y, Ey is even in x
//! and odd in y, Ez is even in both.

use crate::error::{FieldError, Result};
use crate::field::{FieldKind, FieldRecord};
use tracing::info;

/// Absolute tolerance on the symmetry of the x/y bounds
pub const SYMMETRY_TOLERANCE: f64 = 1e-6;

fn check_symmetric(record: &FieldRecord) -> Result<()> {
    let name = record.source_name();
    if !record.is_leaf() {
        return Err(FieldError::structural(format!("{name}: averaging needs a leaf field")));
    }
    if record.kind() != FieldKind::Cartesian || !record.has_data() {
        return Err(FieldError::structural(format!("{name}: averaging needs a 3D field")));
    }
    let (x, y) = (record.axis(0), record.axis(1));
    let checks = [
        ("x and y minima", x.min - y.min),
        ("x and y maxima", x.max - y.max),
        ("x range centre", x.min + x.max),
        ("y range centre", y.min + y.max),
    ];
    for (what, gap) in checks {
        if gap.abs() > SYMMETRY_TOLERANCE {
            return Err(FieldError::structural(format!(
                "{name}: {what} differ by {gap}, field is not four-fold symmetric"
            )));
        }
    }
    Ok(())
}

/// Replace every mirror quartet of samples by its symmetric average.
///
/// Works for odd and even sample counts: the midpoint index is `count / 2`
/// on both axes and on odd grids the central row and column are their own
/// mirrors, which forces the odd component there to zero.
pub fn quad_average(record: &mut FieldRecord) -> Result<()> {
    check_symmetric(record)?;
    let [ax, ay, az] = *record.axes();
    let (nx, ny) = (ax.count, ay.count);
    let (imid, jmid) = (nx / 2, ny / 2);
    let index = |i: usize, j: usize, k: usize| ((k * ny + j) * nx + i) * 3;
    let data = record.payload_mut();

    for k in 0..az.count {
        for j in jmid..ny {
            let jn = ny - 1 - j;
            for i in imid..nx {
                let in_ = nx - 1 - i;
                let pp = index(i, j, k);
                let pn = index(in_, j, k);
                let np = index(i, jn, k);
                let nn = index(in_, jn, k);

                let ex = 0.25 * (data[pp] + data[np] - data[pn] - data[nn]);
                data[pp] = ex;
                data[np] = ex;
                data[pn] = -ex;
                data[nn] = -ex;

                let ey = 0.25 * (data[pp + 1] + data[pn + 1] - data[np + 1] - data[nn + 1]);
                data[pp + 1] = ey;
                data[pn + 1] = ey;
                data[np + 1] = -ey;
                data[nn + 1] = -ey;

                let ez = 0.25 * (data[pp + 2] + data[pn + 2] + data[np + 2] + data[nn + 2]);
                for idx in [pp, pn, np, nn] {
                    data[idx + 2] = ez;
                }
            }
        }
    }
    info!(field = %record.source_name(), "Four-fold average applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::GridAxis;
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng};

    fn noisy(n: usize, seed: u64) -> FieldRecord {
        let axis = GridAxis::new(n, -1.0, 1.0);
        let z = GridAxis::new(2, 0.0, 1.0);
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let payload = (0..n * n * 2 * 3).map(|_| rng.random_range(-1.0..1.0)).collect();
        FieldRecord::cartesian([axis, axis, z], payload, "noisy").unwrap()
    }

    fn assert_symmetric(record: &FieldRecord) {
        let n = record.axis(0).count;
        for k in 0..2 {
            for j in 0..n {
                for i in 0..n {
                    let p = record.index(i, j, k);
                    let mx = record.index(n - 1 - i, j, k);
                    let my = record.index(i, n - 1 - j, k);
                    let v = record.payload();
                    assert_relative_eq!(v[p], -v[mx], epsilon = 1e-12);
                    assert_relative_eq!(v[p], v[my], epsilon = 1e-12);
                    assert_relative_eq!(v[p + 1], v[mx + 1], epsilon = 1e-12);
                    assert_relative_eq!(v[p + 1], -v[my + 1], epsilon = 1e-12);
                    assert_relative_eq!(v[p + 2], v[mx + 2], epsilon = 1e-12);
                    assert_relative_eq!(v[p + 2], v[my + 2], epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_even_grid() {
        let mut record = noisy(4, 7);
        quad_average(&mut record).unwrap();
        assert_symmetric(&record);
    }

    #[test]
    fn test_odd_grid() {
        let mut record = noisy(5, 11);
        quad_average(&mut record).unwrap();
        assert_symmetric(&record);
        let centre = record.index(2, 2, 0);
        assert_eq!(record.payload()[centre], 0.0);
        assert_eq!(record.payload()[centre + 1], 0.0);
    }

    #[test]
    fn test_symmetric_field_unchanged() {
        let mut record = noisy(4, 3);
        quad_average(&mut record).unwrap();
        let once = record.clone();
        quad_average(&mut record).unwrap();
        for (a, b) in record.payload().iter().zip(once.payload()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_off_centre_rejected() {
        let x = GridAxis::new(3, 0.0, 2.0);
        let z = GridAxis::new(2, 0.0, 1.0);
        let mut record = FieldRecord::cartesian([x, x, z], vec![0.0; 54], "shifted").unwrap();
        assert!(matches!(
            quad_average(&mut record),
            Err(FieldError::Structural(_))
        ));
    }
}
