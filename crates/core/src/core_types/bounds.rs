//! Axis-aligned bounding boxes.

use super::axis::soft_tolerance;
use super::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned box given by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Closed-interval test on every axis.
    #[must_use]
    pub fn contains(&self, point: &Vec3) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Containment with per-coordinate slack of `relative * |coord|`,
    /// floored at `relative` for coordinates near zero.
    #[must_use]
    pub fn contains_soft(&self, point: &Vec3, relative: f64) -> bool {
        self.first_axis_outside_soft(point, relative).is_none()
    }

    /// First axis on which `point` fails the soft containment test.
    #[must_use]
    pub fn first_axis_outside_soft(&self, point: &Vec3, relative: f64) -> Option<usize> {
        (0..3).find(|&i| {
            let eps = soft_tolerance(point[i], relative);
            point[i] - self.min[i] < -eps || point[i] - self.max[i] > eps
        })
    }

    /// Clamp each coordinate independently into the box.
    #[must_use]
    pub fn clip(&self, point: &Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// The eight corners, minimum corner first.
    #[must_use]
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Smallest box holding both operands.
    #[must_use]
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_containment() {
        let b = Bounds::new(Vec3::zeros(), Vec3::new(10.0, 10.0, 10.0));
        assert!(b.contains_soft(&Vec3::new(10.0 + 5e-6, 5.0, 0.0), 1e-6));
        assert!(!b.contains_soft(&Vec3::new(10.0 + 5e-5, 5.0, 0.0), 1e-6));
        assert!(b.contains_soft(&Vec3::new(-5e-7, 5.0, 0.0), 1e-6));
        assert!(!b.contains(&Vec3::new(-5e-7, 5.0, 0.0)));
    }

    #[test]
    fn test_clip() {
        let b = Bounds::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 2.0));
        let p = b.clip(&Vec3::new(3.0, -4.0, 1.0));
        assert_eq!(p, Vec3::new(1.0, -1.0, 1.0));
    }

    #[test]
    fn test_union() {
        let a = Bounds::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = Bounds::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(0.5, 2.0, 0.5));
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(u.max, Vec3::new(1.0, 2.0, 1.0));
    }
}
