//! Field records: rectangular grids of vector samples.
//!
//! Two shapes are supported:
//!
//! - **Cartesian**: a full 3D grid with three components per sample, stored as
//!   `((iz * ny + iy) * nx + ix) * 3 + component`.
//! - **Axisymmetric**: a 2D half-plane slice `(r, z)` with two components
//!   (radial, axial) per sample, stored as `(iz * nr + ir) * 2 + component`.
//!   The slice answers 3D queries by rotation about the z axis.
//!
//! Axisymmetric records are kept in a canonical orientation: axis 0 is the
//! degenerate axis (count 1), axis 1 is radial with minimum 0 and axis 2 is
//! axial. The row stride of the flattened slice is the radial count.
//!
//! A record with an empty payload is a container: it only groups children
//! and never answers a query on its own.

use crate::core_types::{Bounds, GridAxis, Vec3, AXIS_NAMES};
use crate::error::{FieldError, Result};
use serde::{Deserialize, Serialize};

/// Shape discriminant of a field record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// 2D slice `(r, z)` used as a 3D source by rotation
    Axisymmetric,
    /// Full 3D grid
    Cartesian,
}

impl FieldKind {
    /// Vector components stored per sample
    #[must_use]
    pub fn component_count(self) -> usize {
        match self {
            FieldKind::Axisymmetric => 2,
            FieldKind::Cartesian => 3,
        }
    }

    /// Number of axes with more than one sample
    #[must_use]
    pub fn active_axes(self) -> usize {
        match self {
            FieldKind::Axisymmetric => 2,
            FieldKind::Cartesian => 3,
        }
    }
}

/// A grid of vector samples with optional nested higher-resolution regions.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    pub(crate) kind: FieldKind,
    pub(crate) axes: [GridAxis; 3],
    pub(crate) payload: Vec<f64>,
    pub(crate) children: Vec<FieldRecord>,
    pub(crate) source_name: String,
}

impl FieldRecord {
    /// Build a full 3D record. `payload` holds three components per sample
    /// with x varying fastest.
    pub fn cartesian(
        axes: [GridAxis; 3],
        payload: Vec<f64>,
        source_name: impl Into<String>,
    ) -> Result<Self> {
        let record = Self {
            kind: FieldKind::Cartesian,
            axes,
            payload,
            children: Vec::new(),
            source_name: source_name.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Build an axisymmetric record from its radial and axial axes.
    ///
    /// `payload` holds `(radial, axial)` pairs with the radial index varying
    /// fastest. The radial axis must start at 0.
    pub fn axisymmetric(
        radial: GridAxis,
        axial: GridAxis,
        payload: Vec<f64>,
        source_name: impl Into<String>,
    ) -> Result<Self> {
        let source_name = source_name.into();
        if radial.min.abs() > f64::EPSILON {
            return Err(FieldError::structural(format!(
                "{source_name}: radial axis starts at {} instead of 0",
                radial.min
            )));
        }
        let record = Self {
            kind: FieldKind::Axisymmetric,
            axes: [GridAxis::new(1, 0.0, 0.0), radial, axial],
            payload,
            children: Vec::new(),
            source_name,
        };
        record.validate()?;
        Ok(record)
    }

    /// A record with no data of its own, grouping children only.
    #[must_use]
    pub fn container(source_name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Cartesian,
            axes: [GridAxis::empty(); 3],
            payload: Vec::new(),
            children: Vec::new(),
            source_name: source_name.into(),
        }
    }

    /// Check the axis invariants and the payload length against the kind.
    pub(crate) fn validate(&self) -> Result<()> {
        let active = self.axes.iter().filter(|a| a.is_active()).count();
        if active != self.kind.active_axes() {
            return Err(FieldError::structural(format!(
                "{}: {:?} field needs {} active axes, found {active}",
                self.source_name,
                self.kind,
                self.kind.active_axes()
            )));
        }
        if self.kind == FieldKind::Axisymmetric && self.axes[0].is_active() {
            return Err(FieldError::structural(format!(
                "{}: axisymmetric field must be degenerate along x",
                self.source_name
            )));
        }
        for (axis, name) in self.axes.iter().zip(AXIS_NAMES) {
            if axis.is_active() && (axis.delta <= 0.0 || axis.max <= axis.min) {
                return Err(FieldError::structural(format!(
                    "{}: {name} axis has min {} max {} delta {}",
                    self.source_name, axis.min, axis.max, axis.delta
                )));
            }
        }
        let expected = self.sample_count() * self.kind.component_count();
        if self.payload.len() != expected {
            return Err(FieldError::structural(format!(
                "{}: payload holds {} values, grid needs {expected}",
                self.source_name,
                self.payload.len()
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub fn axes(&self) -> &[GridAxis; 3] {
        &self.axes
    }

    /// Axis `index`, counting x, y, z from 0.
    ///
    /// # Panics
    /// Panics if `index > 2`.
    #[must_use]
    pub fn axis(&self, index: usize) -> &GridAxis {
        &self.axes[index]
    }

    #[must_use]
    pub fn payload(&self) -> &[f64] {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut [f64] {
        &mut self.payload
    }

    #[must_use]
    pub fn children(&self) -> &[FieldRecord] {
        &self.children
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether the record has data of its own
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.payload.is_empty()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Row length of the flattened axisymmetric slice
    #[must_use]
    pub fn stride(&self) -> usize {
        match self.kind {
            FieldKind::Axisymmetric => self.axes[1].count,
            FieldKind::Cartesian => 0,
        }
    }

    /// Product of the axis counts
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.axes.iter().map(|a| a.count).product()
    }

    /// Bounding box in 3D space.
    ///
    /// Axisymmetric records cover `[-R, R]` on x and y, where `R` is the
    /// radial maximum. Containers cover the union of their children and
    /// return `None` when they have none.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        if !self.has_data() {
            return self
                .children
                .iter()
                .filter_map(FieldRecord::bounds)
                .reduce(|a, b| a.union(&b));
        }
        let [x, y, z] = &self.axes;
        Some(match self.kind {
            FieldKind::Cartesian => Bounds::new(
                Vec3::new(x.min, y.min, z.min),
                Vec3::new(x.max, y.max, z.max),
            ),
            FieldKind::Axisymmetric => {
                let r = y.max;
                Bounds::new(Vec3::new(-r, -r, z.min), Vec3::new(r, r, z.max))
            }
        })
    }

    /// Flat payload offset of the first component of Cartesian sample `(ix, iy, iz)`
    #[inline]
    #[must_use]
    pub fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        let [x, y, _] = &self.axes;
        ((iz * y.count + iy) * x.count + ix) * self.kind.component_count()
    }

    /// Flat payload offset of the first component of slice sample `(ir, iz)`
    #[inline]
    #[must_use]
    pub fn slice_index(&self, ir: usize, iz: usize) -> usize {
        (iz * self.stride() + ir) * 2
    }
}
