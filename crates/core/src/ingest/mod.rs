//! Text exports turned into field records
//!
//! - `comsol`: finite-element solver exports with a `%` header
//! - `four_column`: headerless `r z Er Ez` rows from the magnetics tool

pub mod comsol;
pub mod four_column;

pub use comsol::{component_name, GridDescription};
