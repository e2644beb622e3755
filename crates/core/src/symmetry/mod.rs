//! Symmetry operations on 3D fields

pub mod quad_average;

pub use quad_average::{quad_average, SYMMETRY_TOLERANCE};
