//! Vector type alias for 3D points and field vectors.

use nalgebra::Vector3;

/// 3D vector type for query points and sampled field vectors.
///
/// This is a simple alias for `nalgebra::Vector3<f64>`. Field exports carry
/// double precision samples, so the whole engine works in `f64`.
pub type Vec3 = Vector3<f64>;
