//! Solver text exports: a `%` comment header followed by one row per node.
//!
//! ```text
//! % Model:       lens.mph
//! % Dimension:   3
//! % Nodes:       1331
//! % Expressions: 3
//! % Description: Electric field
//! % x   y   z   es.Ex (V/m)   es.Ey (V/m)   es.Ez (V/m)
//! 0 0 0 1.5 0.2 -3.1
//! ...
//! ```
//!
//! The last header line names the coordinate columns and the expressions.
//! Rows list the nodes of a rectangular grid with the first column varying
//! fastest.

use crate::core_types::{GridAxis, AXIS_NAMES};
use crate::error::{FieldError, Result};
use crate::field::FieldRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// A rectangular grid read from a solver export, column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescription {
    pub source_name: String,
    pub model_name: Option<String>,
    /// Coordinate column names, one per dimension
    pub axis_names: Vec<String>,
    /// Expression names as written in the header, e.g. `es.Ex`
    pub expression_names: Vec<String>,
    /// Grid shape inferred from the coordinate columns
    pub axes: Vec<GridAxis>,
    /// Coordinate columns, one per dimension
    pub coordinates: Vec<Vec<f64>>,
    /// Expression columns, one per expression
    pub values: Vec<Vec<f64>>,
}

#[derive(Default)]
struct Header {
    model_name: Option<String>,
    dimension: Option<usize>,
    nodes: Option<usize>,
    expressions: Option<usize>,
    names: Vec<String>,
}

fn header_count(origin: &str, option: &str, value: Option<&str>) -> Result<usize> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            FieldError::structural(format!("{origin}: bad value for header option {option}"))
        })
}

/// Component suffix of an expression name: `es.Ex` and `Ex` both give `Ex`.
#[must_use]
pub fn component_name(expression: &str) -> &str {
    expression.rsplit('.').next().unwrap_or(expression)
}

impl GridDescription {
    /// Parse a solver export.
    pub fn parse<R: BufRead>(reader: R, source_name: &str) -> Result<Self> {
        let origin = source_name;
        let mut header = Header::default();
        let mut names_line = None;
        let mut columns: Vec<Vec<f64>> = Vec::new();
        let mut rows = 0usize;

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| FieldError::io(origin, e))?;
            let number = i + 1;
            if let Some(rest) = line.strip_prefix('%') {
                if rows > 0 {
                    return Err(FieldError::structural(format!(
                        "{origin}:{number}: header line after data"
                    )));
                }
                let mut words = rest.split_whitespace();
                let option = words.next().unwrap_or_default();
                match option {
                    "Model:" => header.model_name = words.next().map(str::to_string),
                    "Dimension:" => {
                        header.dimension = Some(header_count(origin, option, words.next())?);
                    }
                    "Nodes:" => header.nodes = Some(header_count(origin, option, words.next())?),
                    "Expressions:" => {
                        header.expressions = Some(header_count(origin, option, words.next())?);
                    }
                    _ => names_line = Some(rest.to_string()),
                }
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            let (Some(dimension), Some(expressions)) = (header.dimension, header.expressions) else {
                return Err(FieldError::structural(format!(
                    "{origin}: header must give Dimension and Expressions before the data"
                )));
            };
            let expected = dimension + expressions;
            if columns.is_empty() {
                let capacity = header.nodes.unwrap_or(0);
                for _ in 0..expected {
                    let mut column = Vec::new();
                    column.try_reserve_exact(capacity).map_err(|e| {
                        FieldError::Allocation(format!("{origin}: {capacity} nodes ({e})"))
                    })?;
                    columns.push(column);
                }
            }
            let found = line.split_whitespace().count();
            if found != expected {
                return Err(FieldError::structural(format!(
                    "{origin}:{number}: expected {expected} values, found {found}"
                )));
            }
            for (column, word) in columns.iter_mut().zip(line.split_whitespace()) {
                let value = word.parse::<f64>().map_err(|e| {
                    FieldError::structural(format!("{origin}:{number}: '{word}': {e}"))
                })?;
                column.push(value);
            }
            rows += 1;
        }

        if rows == 0 {
            return Err(FieldError::structural(format!("{origin}: no data rows")));
        }
        let dimension = header.dimension.unwrap_or_default();
        let expressions = header.expressions.unwrap_or_default();
        if let Some(nodes) = header.nodes {
            if nodes != rows {
                return Err(FieldError::structural(format!(
                    "{origin}: header promises {nodes} nodes, file holds {rows}"
                )));
            }
        }

        let words: Vec<&str> = names_line.as_deref().unwrap_or_default().split_whitespace().collect();
        header.names = column_names(&words, dimension, expressions).ok_or_else(|| {
            FieldError::structural(format!(
                "{origin}: header line holds {} words, expected {dimension} axis names \
                 and {expressions} expression names with units",
                words.len()
            ))
        })?;
        let expression_names = header.names.split_off(dimension);
        let values = columns.split_off(dimension);
        let axes = analyse(&columns);
        for (axis, name) in axes.iter().zip(&header.names) {
            debug!(
                file = %origin,
                axis = %name,
                count = axis.count,
                min = axis.min,
                max = axis.max,
                "Grid axis"
            );
        }

        Ok(Self {
            source_name: source_name.to_string(),
            model_name: header.model_name,
            axis_names: header.names,
            expression_names,
            axes,
            coordinates: columns,
            values,
        })
    }

    /// Read a solver export from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FieldError::io(path, e))?;
        let origin = path.display().to_string();
        let grid = Self::parse(BufReader::new(file), &origin)?;
        info!(
            path = %origin,
            nodes = grid.node_count(),
            expressions = grid.expression_names.len(),
            "Grid description loaded"
        );
        Ok(grid)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.coordinates.first().map_or(0, Vec::len)
    }

    /// Number of axes with more than one distinct coordinate
    #[must_use]
    pub fn active_axes(&self) -> usize {
        self.axes.iter().filter(|a| a.is_active()).count()
    }
}

/// Axis names followed by expression names.
///
/// The first `dimension` words name the axes. Each expression name is then
/// followed by its unit; the units may also be left out altogether.
fn column_names(words: &[&str], dimension: usize, expressions: usize) -> Option<Vec<String>> {
    if words.len() < dimension {
        return None;
    }
    let (axes, rest) = words.split_at(dimension);
    let step = if rest.len() == 2 * expressions {
        2
    } else if rest.len() == expressions {
        1
    } else {
        return None;
    };
    Some(
        axes.iter()
            .chain(rest.iter().step_by(step))
            .map(|w| (*w).to_string())
            .collect(),
    )
}

/// Infer per-axis counts from the coordinate columns.
///
/// An axis is active when its range is non-empty. The repeat count of an
/// active axis is the number of leading rows sharing the first value; counts
/// follow from the slowest axis down.
fn analyse(coordinates: &[Vec<f64>]) -> Vec<GridAxis> {
    let rows = coordinates.first().map_or(0, Vec::len);
    let ranges: Vec<(f64, f64)> = coordinates
        .iter()
        .map(|c| {
            c.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
        })
        .collect();
    let repeats: Vec<usize> = coordinates
        .iter()
        .map(|c| c.iter().take_while(|&&v| v == c[0]).count())
        .collect();

    let mut axes = vec![GridAxis::empty(); coordinates.len()];
    let mut remaining = rows;
    for d in (0..coordinates.len()).rev() {
        let (min, max) = ranges[d];
        let count = if max > min {
            let count = remaining / repeats[d];
            remaining = repeats[d];
            count
        } else {
            1
        };
        axes[d] = GridAxis::new(count, min, max);
    }
    axes
}

impl FieldRecord {
    /// Build a record from a solver export.
    ///
    /// Three active axes give a full 3D record and need the expressions
    /// `Ex`, `Ey`, `Ez`. Two active axes give an axisymmetric record: with x
    /// inactive the expressions are `Ey`, `Ez`; with y inactive `Ex`, `Ez`.
    /// Both x and y must start at 0 in that case.
    pub fn from_grid(grid: &GridDescription) -> Result<Self> {
        let origin = &grid.source_name;
        if grid.axes.len() != 3 {
            return Err(FieldError::structural(format!(
                "{origin}: {} dimensions, only 3 are supported",
                grid.axes.len()
            )));
        }
        let nodes = grid.node_count();
        let shape: usize = grid.axes.iter().map(|a| a.count).product();
        if shape != nodes {
            return Err(FieldError::structural(format!(
                "{origin}: {nodes} nodes do not form a rectangular grid ({shape} expected)"
            )));
        }
        let active: Vec<bool> = grid.axes.iter().map(GridAxis::is_active).collect();
        let expected: &[&str] = match active.as_slice() {
            [true, true, true] => &["Ex", "Ey", "Ez"],
            [false, true, true] => &["Ey", "Ez"],
            [true, false, true] => &["Ex", "Ez"],
            [true, true, false] => {
                return Err(FieldError::structural(format!(
                    "{origin}: axisymmetric data must vary along z"
                )))
            }
            _ => {
                return Err(FieldError::structural(format!(
                    "{origin}: {} active axes, need 2 or 3",
                    grid.active_axes()
                )))
            }
        };
        let found: Vec<&str> = grid.expression_names.iter().map(|n| component_name(n)).collect();
        if found != expected {
            return Err(FieldError::structural(format!(
                "{origin}: expected expressions {expected:?}, found {found:?}"
            )));
        }

        let components = expected.len();
        let mut payload = Vec::new();
        payload
            .try_reserve_exact(nodes * components)
            .map_err(|e| {
                FieldError::Allocation(format!("{origin}: {} samples ({e})", nodes * components))
            })?;
        for row in 0..nodes {
            payload.extend(grid.values.iter().map(|column| column[row]));
        }

        let source_name = Path::new(origin)
            .file_name()
            .map_or_else(|| origin.clone(), |n| n.to_string_lossy().into_owned());
        if components == 3 {
            let axes = [grid.axes[0], grid.axes[1], grid.axes[2]];
            return FieldRecord::cartesian(axes, payload, source_name);
        }

        for (axis, name) in grid.axes.iter().zip(AXIS_NAMES).take(2) {
            if axis.min != 0.0 {
                return Err(FieldError::structural(format!(
                    "{origin}: axisymmetric data needs {name} min 0, found {}",
                    axis.min
                )));
            }
        }
        let radial = if active[0] { grid.axes[0] } else { grid.axes[1] };
        FieldRecord::axisymmetric(radial, grid.axes[2], payload, source_name)
    }
}
