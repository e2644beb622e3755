//! Boundary-value smoothing of 3D fields
//!
//! Boundary faces and any interior points inside the supplied geometry stay
//! fixed; every other point is relaxed towards the Laplace solution.

pub mod mask;
pub mod relaxation;

pub use mask::PointMask;
pub use relaxation::{smooth, SmoothConfig, SmoothReport};
