//! Field Data Core Library
//!
//! Storage, sampling and post-processing of electromagnetic field exports.
//! Fields arrive either as full 3D grids or as axisymmetric `(r, z)` slices
//! and are kept in a compact binary container.
//!
//! ## Capabilities
//!
//! - Nested regions of differing resolution with first-match point dispatch
//! - Trilinear sampling of 3D grids and rotated bilinear sampling of slices
//! - Red-black Gauss-Seidel smoothing with geometry-pinned points
//! - Stacking of volumes that meet along z
//! - Ingestion of solver text exports and four-fold symmetrisation

// Core types and utilities
pub mod core_types;
pub mod error;

// Data model and storage
pub mod codec;
pub mod field;

// Queries
pub mod interpolation;

// Processing
pub mod geometry;
pub mod ingest;
pub mod merge;
pub mod smoothing;
pub mod symmetry;

// Re-export core types
pub use core_types::{Bounds, GridAxis, Vec3};
pub use error::{FieldError, Result};

// Re-export the data model
pub use codec::StoredField;
pub use field::{load_field_set, parse_field_set, FieldKind, FieldRecord, HierarchyConfig};

// Re-export processing entry points
pub use geometry::{GeometryList, GeometryPredicate};
pub use ingest::GridDescription;
pub use merge::{merge_z, merged_file_name};
pub use smoothing::{smooth, SmoothConfig, SmoothReport};
pub use symmetry::quad_average;
