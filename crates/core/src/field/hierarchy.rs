//! Nesting of field records and hierarchical point queries.
//!
//! A record may own higher-resolution children covering parts of its box.
//! Queries try the children in insertion order and the first child whose box
//! contains the point answers, recursively. Only when no child contains the
//! point does the record fall back to its own grid.

use super::record::FieldRecord;
use crate::core_types::{Vec3, AXIS_NAMES};
use crate::error::{FieldError, Result};
use crate::interpolation;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Limits applied when assembling a hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Maximum number of children per record
    pub max_children: usize,

    /// Relative slack when checking that a child lies inside its parent.
    /// Coordinates smaller than this in magnitude use it as an absolute slack.
    pub containment_tolerance: f64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_children: 20,
            containment_tolerance: 1e-6,
        }
    }
}

impl FieldRecord {
    /// Install `child` as the next nested region of this record.
    ///
    /// Every corner of the child's box must lie inside this record's box
    /// within the configured soft tolerance. The check is skipped when this
    /// record has no data of its own.
    pub fn add_child(&mut self, child: FieldRecord, config: &HierarchyConfig) -> Result<()> {
        if self.has_data() {
            if let (Some(parent), Some(inner)) = (self.bounds(), child.bounds()) {
                let tolerance = config.containment_tolerance;
                for corner in inner.corners() {
                    if let Some(axis) = parent.first_axis_outside_soft(&corner, tolerance) {
                        return Err(FieldError::compatibility(
                            format!("{} bounds", AXIS_NAMES[axis]),
                            format!(
                                "field '{}' corner ({}, {}, {}) lies outside field '{}'",
                                child.source_name, corner.x, corner.y, corner.z, self.source_name
                            ),
                        ));
                    }
                }
            }
        }
        if self.children.len() >= config.max_children {
            return Err(FieldError::Capacity {
                name: self.source_name.clone(),
                limit: config.max_children,
            });
        }
        debug!(
            parent = %self.source_name,
            child = %child.source_name,
            "Nested field installed"
        );
        self.children.push(child);
        Ok(())
    }

    /// The record that answers a query at `point`: the first containing child,
    /// searched depth-first, or this record when no child contains the point.
    ///
    /// Returns `None` when neither a child nor this record's own grid contains
    /// the point.
    #[must_use]
    pub fn record_at(&self, point: &Vec3) -> Option<&FieldRecord> {
        for child in &self.children {
            if interpolation::point_in_bounds(child, point) {
                return child.record_at(point);
            }
        }
        (self.has_data() && interpolation::point_in_bounds(self, point)).then_some(self)
    }

    /// Source name of the record that answers a query at `point`.
    #[must_use]
    pub fn source_name_at(&self, point: &Vec3) -> Option<&str> {
        self.record_at(point).map(FieldRecord::source_name)
    }

    /// Sample the hierarchy at `point`.
    ///
    /// The first child containing the point answers, and its result is
    /// returned as is. Without a containing child the record's own grid is
    /// sampled. A point outside every grid is a range error.
    pub fn sample(&self, point: &Vec3) -> Result<Vec3> {
        for child in &self.children {
            if interpolation::point_in_bounds(child, point) {
                return child.sample(point);
            }
        }
        if self.has_data() && interpolation::point_in_bounds(self, point) {
            interpolation::sample_grid(self, point)
        } else {
            Err(FieldError::range(&self.source_name, point))
        }
    }
}
