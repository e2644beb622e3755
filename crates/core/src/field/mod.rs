//! Field records and their nesting
//!
//! - `record`: the grid container and its two shapes
//! - `hierarchy`: nested regions and first-match point dispatch
//! - `description`: assembling a hierarchy from a text description

pub mod description;
pub mod hierarchy;
pub mod record;

pub use description::{load_field_set, parse_field_set};
pub use hierarchy::HierarchyConfig;
pub use record::{FieldKind, FieldRecord};
