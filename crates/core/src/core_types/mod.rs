//! Core types and utilities

pub mod axis;
pub mod bounds;
pub mod vec3;

pub use axis::{nearly_equal, soft_tolerance, GridAxis, AXIS_NAMES};
pub use bounds::Bounds;
pub use vec3::Vec3;
