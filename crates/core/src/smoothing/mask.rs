//! Fixed/free classification of grid points for relaxation.

use crate::field::FieldRecord;
use crate::geometry::GeometryList;
use crate::core_types::Vec3;
use rayon::prelude::*;

/// One flag per grid point; `true` marks a point the smoother may update.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMask {
    counts: [usize; 3],
    free: Vec<bool>,
}

impl PointMask {
    /// Free every interior point and fix the six boundary faces.
    ///
    /// With a geometry list, interior points inside any member (widened by
    /// `tolerance`) are fixed as well. Layers along z are classified in
    /// parallel.
    pub fn build(record: &FieldRecord, geometry: Option<&GeometryList>, tolerance: f64) -> Self {
        let [ax, ay, az] = *record.axes();
        let (nx, ny, nz) = (ax.count, ay.count, az.count);
        let mut free = vec![false; nx * ny * nz];

        if nx > 2 && ny > 2 && nz > 2 {
            free.par_chunks_mut(nx * ny)
                .enumerate()
                .filter(|(iz, _)| *iz > 0 && *iz < nz - 1)
                .for_each(|(iz, layer)| {
                    let z = az.coord_at(iz);
                    for iy in 1..ny - 1 {
                        let y = ay.coord_at(iy);
                        for ix in 1..nx - 1 {
                            let point = Vec3::new(ax.coord_at(ix), y, z);
                            let excluded =
                                geometry.is_some_and(|g| g.is_excluded(&point, tolerance));
                            layer[iy * nx + ix] = !excluded;
                        }
                    }
                });
        }

        Self {
            counts: [nx, ny, nz],
            free,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_free(&self, ix: usize, iy: usize, iz: usize) -> bool {
        let [nx, ny, _] = self.counts;
        self.free[(iz * ny + iy) * nx + ix]
    }

    /// Number of points the smoother may update
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.iter().filter(|&&f| f).count()
    }

    #[must_use]
    pub fn counts(&self) -> [usize; 3] {
        self.counts
    }
}
