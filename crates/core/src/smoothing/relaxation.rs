//! Red-black Gauss-Seidel relaxation of a 3D vector field.
//!
//! Every free grid point is replaced, per component, by the weighted mean of
//! its six axis neighbours:
//!
//! ```text
//! wa = 1 / (1/dx² + 1/dy² + 1/dz²)
//! wx = wa / (2 dx²), wy = wa / (2 dy²), wz = wa / (2 dz²)
//! v  = wx (v[x-1] + v[x+1]) + wy (v[y-1] + v[y+1]) + wz (v[z-1] + v[z+1])
//! ```
//!
//! which is the discrete Laplace equation on a grid with unequal spacing.
//! Points with even `ix + iy + iz` are updated first, then the odd ones.

use super::mask::PointMask;
use crate::error::{FieldError, Result};
use crate::field::{FieldKind, FieldRecord};
use crate::geometry::GeometryList;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for the smoother
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothConfig {
    /// Number of full red/black passes. The smoother always runs exactly
    /// this many; there is no convergence cutoff.
    pub passes: usize,

    /// Tolerance used when testing grid points against the geometry.
    /// `None` uses the grid spacing along x.
    pub geometry_tolerance: Option<f64>,
}

impl Default for SmoothConfig {
    fn default() -> Self {
        Self {
            passes: 1,
            geometry_tolerance: None,
        }
    }
}

/// Outcome of a smoothing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmoothReport {
    /// Sum of squared updates over all free points and components, per pass
    pub pass_residuals: Vec<f64>,

    /// Number of grid points that were free to move
    pub free_points: usize,
}

impl SmoothReport {
    /// Residual of the last pass, if any pass ran
    #[must_use]
    pub fn final_residual(&self) -> Option<f64> {
        self.pass_residuals.last().copied()
    }
}

/// Relax `record` in place.
///
/// The record must be a 3D leaf with data. All preconditions are checked
/// before the payload is touched.
pub fn smooth(
    record: &mut FieldRecord,
    geometry: Option<&GeometryList>,
    config: &SmoothConfig,
) -> Result<SmoothReport> {
    if !record.is_leaf() {
        return Err(FieldError::structural(format!(
            "{}: smoothing needs a leaf field, found {} children",
            record.source_name(),
            record.children().len()
        )));
    }
    if record.kind() != FieldKind::Cartesian {
        return Err(FieldError::structural(format!(
            "{}: smoothing needs a 3D field",
            record.source_name()
        )));
    }
    if !record.has_data() {
        return Err(FieldError::structural(format!(
            "{}: field has no data to smooth",
            record.source_name()
        )));
    }

    let [ax, ay, az] = *record.axes();
    let tolerance = config.geometry_tolerance.unwrap_or(ax.delta);
    let mask = PointMask::build(record, geometry, tolerance);
    let free_points = mask.free_count();
    info!(
        field = %record.source_name(),
        passes = config.passes,
        free_points,
        "Smoothing field"
    );

    let inv_dx2 = 1.0 / (ax.delta * ax.delta);
    let inv_dy2 = 1.0 / (ay.delta * ay.delta);
    let inv_dz2 = 1.0 / (az.delta * az.delta);
    let wa = 1.0 / (inv_dx2 + inv_dy2 + inv_dz2);
    let wx = 0.5 * wa * inv_dx2;
    let wy = 0.5 * wa * inv_dy2;
    let wz = 0.5 * wa * inv_dz2;

    let (nx, ny, nz) = (ax.count, ay.count, az.count);
    let sx = 3;
    let sy = 3 * nx;
    let sz = 3 * nx * ny;
    let data = record.payload_mut();

    let mut pass_residuals = Vec::with_capacity(config.passes);
    for pass in 0..config.passes {
        let mut residual = 0.0;
        // Red pass (ix + iy + iz even), then black pass (odd)
        for parity in 0..2 {
            for iz in 1..nz.saturating_sub(1) {
                for iy in 1..ny.saturating_sub(1) {
                    for ix in 1..nx.saturating_sub(1) {
                        if (ix + iy + iz) % 2 != parity || !mask.is_free(ix, iy, iz) {
                            continue;
                        }
                        let idx = iz * sz + iy * sy + ix * sx;
                        for c in idx..idx + 3 {
                            let new_val = wx * (data[c + sx] + data[c - sx])
                                + wy * (data[c + sy] + data[c - sy])
                                + wz * (data[c + sz] + data[c - sz]);
                            let delta = new_val - data[c];
                            residual += delta * delta;
                            data[c] = new_val;
                        }
                    }
                }
            }
        }
        debug!(pass, residual, "Smoothing pass complete");
        pass_residuals.push(residual);
    }

    Ok(SmoothReport {
        pass_residuals,
        free_points,
    })
}
