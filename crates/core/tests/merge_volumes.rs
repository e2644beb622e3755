//! Stacking volumes along z and persisting the result.

mod common;

use common::{cartesian_from_fn, Scratch};
use field_data_core::codec;
use field_data_core::merge::z_compatible;
use field_data_core::{merge_z, FieldError, FieldRecord, GridAxis, Vec3};

fn volume(x: GridAxis, z: GridAxis, name: &str, tag: f64) -> FieldRecord {
    let y = GridAxis::new(3, -1.0, 1.0);
    cartesian_from_fn([x, y, z], name, |x, y, z| [x + y, z, tag])
}

fn xy_axis() -> GridAxis {
    GridAxis::new(5, -2.0, 2.0)
}

#[test]
fn test_touching_volumes_share_one_plane() {
    let low = volume(xy_axis(), GridAxis::new(3, 0.0, 2.0), "data/low.bin", 1.0);
    let high = volume(xy_axis(), GridAxis::new(4, 2.0, 5.0), "data/high.bin", 2.0);

    for merged in [merge_z(&low, &high).unwrap(), merge_z(&high, &low).unwrap()] {
        let z = merged.axis(2);
        assert_eq!(z.count, 3 + 4 - 1);
        assert_eq!(z.min, 0.0);
        assert_eq!(z.max, 5.0);
        assert_eq!(merged.source_name(), "data/low_0.00-5.00.bin");

        let v = merged.sample(&Vec3::new(1.0, 0.0, 4.0)).unwrap();
        assert_eq!(v, Vec3::new(1.0, 4.0, 2.0));
        // The shared plane comes from the lower volume
        let v = merged.sample(&Vec3::new(1.0, 0.0, 2.0)).unwrap();
        assert_eq!(v.z, 1.0);
    }
}

#[test]
fn test_overlapping_volumes_drop_repeated_planes() {
    let low = volume(xy_axis(), GridAxis::new(3, 0.0, 2.0), "low.bin", 1.0);
    let high = volume(xy_axis(), GridAxis::new(4, 1.0, 4.0), "high.bin", 2.0);
    let merged = merge_z(&low, &high).unwrap();
    assert_eq!(merged.axis(2).count, 5);
    assert_eq!(merged.axis(2).max, 4.0);
    let tags: Vec<f64> = (0..5).map(|iz| merged.payload()[merged.index(0, 0, iz) + 2]).collect();
    assert_eq!(tags, vec![1.0, 1.0, 1.0, 2.0, 2.0]);
    assert_eq!(merged.source_name(), "low_0.00-4.00.bin");
}

#[test]
fn test_mismatched_lateral_grid_rejected() {
    let low = volume(xy_axis(), GridAxis::new(3, 0.0, 2.0), "low.bin", 1.0);
    let wide = volume(GridAxis::new(5, -2.0, 3.0), GridAxis::new(3, 2.0, 4.0), "wide.bin", 2.0);
    match merge_z(&low, &wide).unwrap_err() {
        FieldError::Compatibility { quantity, .. } => assert!(quantity.starts_with('x')),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_z_range_problems_rejected() {
    let low = volume(xy_axis(), GridAxis::new(3, 0.0, 2.0), "low.bin", 1.0);
    let gap = volume(xy_axis(), GridAxis::new(3, 3.0, 5.0), "gap.bin", 2.0);
    let inside = volume(xy_axis(), GridAxis::new(2, 1.0, 2.0), "inside.bin", 2.0);
    let coarse = volume(xy_axis(), GridAxis::new(2, 2.0, 4.0), "coarse.bin", 2.0);

    for (other, expected) in [(&gap, "z range"), (&inside, "z range"), (&coarse, "z delta")] {
        match z_compatible(&low, other).unwrap_err() {
            FieldError::Compatibility { quantity, .. } => assert_eq!(quantity, expected),
            e => panic!("unexpected error {e:?}"),
        }
    }
}

#[test]
fn test_merged_volume_survives_save_and_load() {
    let scratch = Scratch::new("merge");
    let low_path = scratch.path("low.bin");
    let high_path = scratch.path("high.bin");
    codec::save(
        &low_path,
        &volume(xy_axis(), GridAxis::new(3, 0.0, 2.0), "low", 1.0),
        "merge-model",
    )
    .unwrap();
    codec::save(
        &high_path,
        &volume(xy_axis(), GridAxis::new(4, 2.0, 5.0), "high", 2.0),
        "merge-model",
    )
    .unwrap();

    let low = codec::load_record(&low_path).unwrap();
    let high = codec::load_record(&high_path).unwrap();
    let merged = merge_z(&low, &high).unwrap();
    assert_eq!(merged.source_name(), "low_0.00-5.00.bin");
    let out = scratch.path(merged.source_name());

    codec::save(&out, &merged, "merge-model").unwrap();
    let stored = codec::load(&out).unwrap();
    assert_eq!(stored.model_name, "merge-model");
    assert_eq!(stored.record.axes(), merged.axes());
    assert_eq!(stored.record.payload(), merged.payload());
}
