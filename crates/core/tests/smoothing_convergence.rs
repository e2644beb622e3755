//! Relaxation towards the Laplace solution, with and without pinned geometry.

mod common;

use approx::assert_relative_eq;
use common::cartesian_from_fn;
use field_data_core::{
    smooth, FieldRecord, GeometryList, GeometryPredicate, GridAxis, SmoothConfig, Vec3,
};
use std::f64::consts::PI;
use std::io::Cursor;

const N: usize = 9;

fn harmonic(x: f64, y: f64, z: f64) -> [f64; 3] {
    [x * x - y * y, x * y, z]
}

/// Harmonic data with a smooth bump added to the interior. The bump is zero
/// on the boundary faces so they carry the exact harmonic values.
fn perturbed() -> FieldRecord {
    let axis = GridAxis::new(N, 0.0, 1.0);
    cartesian_from_fn([axis; 3], "perturbed", |x, y, z| {
        let bump = 0.1 * (PI * x).sin() * (PI * y).sin() * (PI * z).sin();
        let [a, b, c] = harmonic(x, y, z);
        [a + bump, b + bump, c + bump]
    })
}

fn max_deviation(record: &FieldRecord) -> f64 {
    let axes = *record.axes();
    let mut worst: f64 = 0.0;
    for iz in 0..N {
        for iy in 0..N {
            for ix in 0..N {
                let exact = harmonic(axes[0].coord_at(ix), axes[1].coord_at(iy), axes[2].coord_at(iz));
                let i = record.index(ix, iy, iz);
                for (c, want) in exact.iter().enumerate() {
                    worst = worst.max((record.payload()[i + c] - want).abs());
                }
            }
        }
    }
    worst
}

#[test]
fn test_residuals_fall_towards_harmonic_solution() {
    let mut record = perturbed();
    let before = max_deviation(&record);
    let config = SmoothConfig {
        passes: 20,
        ..SmoothConfig::default()
    };
    let report = smooth(&mut record, None, &config).unwrap();

    assert_eq!(report.free_points, (N - 2).pow(3));
    assert_eq!(report.pass_residuals.len(), 20);
    for pair in report.pass_residuals.windows(2) {
        assert!(pair[1] < pair[0], "residuals not decreasing: {pair:?}");
    }
    let first = report.pass_residuals[0];
    assert!(report.final_residual().unwrap() < 1e-2 * first);

    let after = max_deviation(&record);
    assert!(after < 0.2 * before, "deviation {before} -> {after}");
}

#[test]
fn test_harmonic_data_is_a_fixed_point() {
    let axis = GridAxis::new(N, 0.0, 1.0);
    let mut record = cartesian_from_fn([axis; 3], "harmonic", harmonic);
    let report = smooth(&mut record, None, &SmoothConfig::default()).unwrap();
    assert!(report.pass_residuals[0] < 1e-20);
    assert!(max_deviation(&record) < 1e-12);
}

#[test]
fn test_geometry_points_stay_pinned() {
    let mut record = perturbed();
    let before = record.clone();
    let mut geometry = GeometryList::new();
    geometry.push(
        GeometryPredicate::cylinder(
            Vec3::new(0.5, 0.5, 0.25),
            Vec3::new(0.5, 0.5, 0.75),
            0.1,
            0.0,
        )
        .unwrap(),
    );
    let config = SmoothConfig {
        passes: 5,
        geometry_tolerance: Some(0.0),
    };
    let report = smooth(&mut record, Some(&geometry), &config).unwrap();

    // z = 0.25 .. 0.75 on the axis covers five grid planes
    assert_eq!(report.free_points, (N - 2).pow(3) - 5);
    for iz in 2..=6 {
        let i = record.index(4, 4, iz);
        assert_eq!(record.payload()[i..i + 3], before.payload()[i..i + 3]);
    }
    let moved = record.index(4, 4, 1);
    assert_ne!(record.payload()[moved], before.payload()[moved]);
}

#[test]
fn test_default_tolerance_is_grid_spacing() {
    let mut geometry = GeometryList::new();
    geometry.push(
        GeometryPredicate::cylinder(
            Vec3::new(0.5, 0.5, 0.25),
            Vec3::new(0.5, 0.5, 0.75),
            0.1,
            0.0,
        )
        .unwrap(),
    );
    let mut record = perturbed();
    let report = smooth(&mut record, Some(&geometry), &SmoothConfig::default()).unwrap();
    // dist² < 0.01 + 0.125² also takes in the four nearest neighbours
    // around the axis on each of the five planes
    assert_eq!(report.free_points, (N - 2).pow(3) - 25);
}

#[test]
fn test_cylinder_membership() {
    let min = Vec3::new(1.0, 2.0, 0.0);
    let max = Vec3::new(1.0, 2.0, 10.0);
    let cylinder = GeometryPredicate::cylinder(min, max, 0.25, 5.0).unwrap();
    assert_eq!(cylinder.axial, 2);

    assert!(cylinder.contains(&Vec3::new(1.0, 2.0, 5.0), 0.0));
    assert!(!cylinder.contains(&Vec3::new(1.0, 2.0, 10.5), 0.0));
    assert!(!cylinder.contains(&Vec3::new(1.0, 2.0, -0.5), 1.0));

    // Radii are widened in quadrature, so radius + tol/2 only falls inside
    // while the radius is small against the tolerance.
    let tol = 1.0;
    assert!(cylinder.contains(&Vec3::new(1.0 + 0.25 + tol / 2.0, 2.0, 5.0), tol));
    assert!(!cylinder.contains(&Vec3::new(1.0 + 0.25 + tol, 2.0, 5.0), tol));
    assert_relative_eq!(
        cylinder.radial_distance_sq(&Vec3::new(4.0, 6.0, 3.0)),
        25.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_wide_cylinder_half_tolerance_outside() {
    let min = Vec3::new(1.0, 2.0, 0.0);
    let max = Vec3::new(1.0, 2.0, 10.0);
    let cylinder = GeometryPredicate::cylinder(min, max, 1.0, 5.0).unwrap();

    // 1.5² = 2.25 lies beyond 1² + 1² = 2
    let tol = 1.0;
    assert!(!cylinder.contains(&Vec3::new(1.0 + 1.0 + tol / 2.0, 2.0, 5.0), tol));
    assert!(!cylinder.contains(&Vec3::new(1.0, 2.0 - 1.0 - tol / 2.0, 5.0), tol));
    assert!(cylinder.contains(&Vec3::new(1.0 + 1.4, 2.0, 5.0), tol));
    assert!(cylinder.contains(&Vec3::new(1.0 + 1.0 + tol / 2.0, 2.0, 5.0), 1.2));
}

#[test]
fn test_torus_membership() {
    let torus =
        GeometryPredicate::torus(Vec3::zeros(), Vec3::new(4.0, 0.0, 0.0), 1.0, 2.0).unwrap();
    assert_eq!(torus.axial, 0);
    assert_eq!(torus.radial, (1, 2));
    assert!(!torus.contains(&Vec3::new(2.0, 0.0, 0.0), 0.1));
    assert!(torus.contains(&Vec3::new(2.0, 1.5, 0.0), 0.1));
    assert!(torus.contains(&Vec3::new(2.0, 0.0, -1.5), 0.1));
    assert!(!torus.contains(&Vec3::new(2.0, 2.5, 0.0), 0.1));
}

#[test]
fn test_geometry_file_drives_mask() {
    let text = "BCGeom test\n# comment\nicyl 0.5 0.5 0.25 0.5 0.5 0.75 0.1 12\nbox 0 0 0 1 1 1\n";
    let geometry = GeometryList::parse(Cursor::new(text), "inline.geom").unwrap();
    assert_eq!(geometry.len(), 1);

    let mut record = perturbed();
    let config = SmoothConfig {
        passes: 1,
        geometry_tolerance: Some(0.0),
    };
    let report = smooth(&mut record, Some(&geometry), &config).unwrap();
    assert_eq!(report.free_points, (N - 2).pow(3) - 5);
}
