//! Geometry predicates used to pin grid points during smoothing

pub mod list;
pub mod predicate;

pub use list::{GeometryList, GEOMETRY_TAG};
pub use predicate::{GeometryPredicate, Shape};
