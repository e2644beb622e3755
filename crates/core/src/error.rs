//! Error types for field loading, sampling and transformation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the field engine.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Underlying read or write failure on a named file.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed input: bad magic, inconsistent header, bad description
    /// syntax, wrong record shape for an operation.
    #[error("structural error: {0}")]
    Structural(String),

    /// Payload storage could not be reserved.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// Two grids disagree on a quantity that must match.
    #[error("incompatible {quantity}: {message}")]
    Compatibility { quantity: String, message: String },

    /// Query point outside every grid that could answer it.
    #[error("point ({x}, {y}, {z}) outside field '{field}'")]
    Range {
        field: String,
        x: f64,
        y: f64,
        z: f64,
    },

    /// A container already holds the maximum number of children.
    #[error("field '{name}' already has {limit} children")]
    Capacity { name: String, limit: usize },
}

impl FieldError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    pub(crate) fn compatibility(quantity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compatibility {
            quantity: quantity.into(),
            message: message.into(),
        }
    }

    pub(crate) fn range(field: &str, point: &crate::core_types::Vec3) -> Self {
        Self::Range {
            field: field.to_string(),
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FieldError>;

/// Reserve exactly `len` zeroed samples, reporting failure as an allocation error.
pub(crate) fn zeroed_payload(len: usize, what: &str) -> Result<Vec<f64>> {
    let mut payload = Vec::new();
    payload
        .try_reserve_exact(len)
        .map_err(|e| FieldError::Allocation(format!("{what}: {len} samples ({e})")))?;
    payload.resize(len, 0.0);
    Ok(payload)
}
