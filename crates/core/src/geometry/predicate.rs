//! Axis-aligned cylinder and torus containment tests.

use crate::core_types::{Vec3, AXIS_NAMES};
use crate::error::{FieldError, Result};
use serde::{Deserialize, Serialize};

/// Radial frame for each possible axial index, keeping
/// `(radial0, radial1, axial)` right-handed.
const RADIAL_FRAME: [(usize, usize); 3] = [(1, 2), (2, 0), (0, 1)];

/// Shape-specific parameters of a geometry predicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Solid cylinder; `potential` is carried for the electrode it models
    Cylinder { radius_sq: f64, potential: f64 },
    /// Annulus between two radii
    Torus { inner_sq: f64, outer_sq: f64 },
}

/// A solid of revolution about an axis-aligned line.
///
/// The box min/max differ on exactly one axis, which becomes the axis of
/// revolution. The other two coordinates of the min corner place the axis
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryPredicate {
    pub shape: Shape,
    pub min: Vec3,
    pub max: Vec3,
    pub axial: usize,
    pub radial: (usize, usize),
}

impl GeometryPredicate {
    /// Cylinder of `radius` along the box.
    pub fn cylinder(min: Vec3, max: Vec3, radius: f64, potential: f64) -> Result<Self> {
        Self::build(
            min,
            max,
            Shape::Cylinder {
                radius_sq: radius * radius,
                potential,
            },
        )
    }

    /// Annulus between `inner` and `outer` along the box.
    pub fn torus(min: Vec3, max: Vec3, inner: f64, outer: f64) -> Result<Self> {
        Self::build(
            min,
            max,
            Shape::Torus {
                inner_sq: inner * inner,
                outer_sq: outer * outer,
            },
        )
    }

    fn build(min: Vec3, max: Vec3, shape: Shape) -> Result<Self> {
        let mut axial = None;
        for (i, name) in AXIS_NAMES.iter().enumerate() {
            let diff = max[i] - min[i];
            if diff < 0.0 {
                return Err(FieldError::structural(format!(
                    "geometry {name} min {} exceeds max {}",
                    min[i], max[i]
                )));
            }
            if diff > 0.0 {
                if axial.is_some() {
                    return Err(FieldError::structural(
                        "geometry box extends along more than one axis",
                    ));
                }
                axial = Some(i);
            }
        }
        let axial = axial.ok_or_else(|| FieldError::structural("geometry box has no extent"))?;
        Ok(Self {
            shape,
            min,
            max,
            axial,
            radial: RADIAL_FRAME[axial],
        })
    }

    /// Squared distance of `point` from the axis line
    #[must_use]
    pub fn radial_distance_sq(&self, point: &Vec3) -> f64 {
        let (a, b) = self.radial;
        let da = point[a] - self.min[a];
        let db = point[b] - self.min[b];
        da * da + db * db
    }

    /// Whether `point` lies inside the solid, with the radii widened by
    /// `tolerance` in quadrature.
    #[must_use]
    pub fn contains(&self, point: &Vec3, tolerance: f64) -> bool {
        let along = point[self.axial];
        if along < self.min[self.axial] || along > self.max[self.axial] {
            return false;
        }
        let tol_sq = tolerance * tolerance;
        let dist_sq = self.radial_distance_sq(point);
        match self.shape {
            Shape::Cylinder { radius_sq, .. } => dist_sq < radius_sq + tol_sq,
            Shape::Torus { inner_sq, outer_sq } => {
                dist_sq > inner_sq - tol_sq && dist_sq < outer_sq + tol_sq
            }
        }
    }
}
