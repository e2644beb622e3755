//! Geometry description files.
//!
//! ```text
//! BCGeom
//! # xmin ymin zmin xmax ymax zmax radius potential
//! icyl 0 0 -5  0 0 5  0.25 100
//! torus 0 0 0  0 0 1  1.0 1.5
//! ```
//!
//! The first line must start with the `BCGeom` tag. Arguments are separated
//! by whitespace or commas.

use super::predicate::GeometryPredicate;
use crate::core_types::Vec3;
use crate::error::{FieldError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Tag expected at the start of a geometry file
pub const GEOMETRY_TAG: &str = "BCGeom";

/// Ordered collection of predicates marking excluded points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryList {
    predicates: Vec<GeometryPredicate>,
}

impl GeometryList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: GeometryPredicate) {
        self.predicates.push(predicate);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeometryPredicate> {
        self.predicates.iter()
    }

    /// Whether any member contains `point`, tested in insertion order.
    #[must_use]
    pub fn is_excluded(&self, point: &Vec3, tolerance: f64) -> bool {
        self.predicates.iter().any(|g| g.contains(point, tolerance))
    }

    /// Parse a geometry description.
    pub fn parse<R: BufRead>(reader: R, origin: &str) -> Result<Self> {
        let mut lines = reader.lines().enumerate();
        let first = match lines.next() {
            Some((_, line)) => line.map_err(|e| FieldError::io(origin, e))?,
            None => String::new(),
        };
        if !first.starts_with(GEOMETRY_TAG) {
            return Err(FieldError::structural(format!(
                "{origin}: not a geometry file, first line must start with {GEOMETRY_TAG}"
            )));
        }

        let mut list = Self::new();
        for (i, line) in lines {
            let line = line.map_err(|e| FieldError::io(origin, e))?;
            let number = i + 1;
            if line.starts_with('#') {
                continue;
            }
            let mut words = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|w| !w.is_empty());
            let Some(command) = words.next() else {
                continue;
            };
            let args = words
                .map(|w| {
                    w.parse::<f64>().map_err(|_| {
                        FieldError::structural(format!("{origin}:{number}: bad number '{w}'"))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            let arity = |expected: &[usize]| {
                if expected.contains(&args.len()) {
                    Ok(())
                } else {
                    Err(FieldError::structural(format!(
                        "{origin}:{number}: {command} takes {expected:?} arguments, found {}",
                        args.len()
                    )))
                }
            };
            let corner = |offset: usize| Vec3::new(args[offset], args[offset + 1], args[offset + 2]);
            let predicate = match command {
                "icyl" => {
                    arity(&[7, 8])?;
                    let potential = args.get(7).copied().unwrap_or(0.0);
                    GeometryPredicate::cylinder(corner(0), corner(3), args[6], potential)
                }
                "torus" => {
                    arity(&[8])?;
                    GeometryPredicate::torus(corner(0), corner(3), args[6], args[7])
                }
                other => {
                    warn!(
                        file = %origin,
                        line = number,
                        command = %other,
                        "Ignoring unknown geometry command"
                    );
                    continue;
                }
            }
            .map_err(|e| match e {
                FieldError::Structural(message) => {
                    FieldError::Structural(format!("{origin}:{number}: {message}"))
                }
                other => other,
            })?;
            list.push(predicate);
        }
        Ok(list)
    }

    /// Read a geometry description file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FieldError::io(path, e))?;
        let origin = path.display().to_string();
        let list = Self::parse(BufReader::new(file), &origin)?;
        info!(path = %origin, shapes = list.len(), "Geometry loaded");
        Ok(list)
    }
}
