//! Shared helpers for the integration tests.

#![allow(dead_code)]

use field_data_core::{FieldRecord, GridAxis};
use std::path::PathBuf;

/// Route library logs to the test harness once per test binary.
#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Scratch directory unique to this process and test; removed on drop.
pub struct Scratch {
    pub dir: PathBuf,
}

impl Scratch {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("field-data-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Cartesian record whose three components are `f(x, y, z)`.
pub fn cartesian_from_fn(
    axes: [GridAxis; 3],
    name: &str,
    f: impl Fn(f64, f64, f64) -> [f64; 3],
) -> FieldRecord {
    let [ax, ay, az] = axes;
    let mut payload = Vec::with_capacity(ax.count * ay.count * az.count * 3);
    for iz in 0..az.count {
        for iy in 0..ay.count {
            for ix in 0..ax.count {
                payload.extend(f(ax.coord_at(ix), ay.coord_at(iy), az.coord_at(iz)));
            }
        }
    }
    FieldRecord::cartesian(axes, payload, name).unwrap()
}

/// Axisymmetric record whose components are `f(r, z)`.
pub fn slice_from_fn(
    radial: GridAxis,
    axial: GridAxis,
    name: &str,
    f: impl Fn(f64, f64) -> [f64; 2],
) -> FieldRecord {
    let mut payload = Vec::with_capacity(radial.count * axial.count * 2);
    for iz in 0..axial.count {
        for ir in 0..radial.count {
            payload.extend(f(radial.coord_at(ir), axial.coord_at(iz)));
        }
    }
    FieldRecord::axisymmetric(radial, axial, payload, name).unwrap()
}
