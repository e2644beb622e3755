//! Volume merging

pub mod z_merge;

pub use z_merge::{merge_z, merged_file_name, z_compatible, MERGE_TOLERANCE};
