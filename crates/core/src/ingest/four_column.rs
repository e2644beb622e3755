//! Magnetics tool exports: headerless rows of `r z Er Ez`.
//!
//! Rows are ordered with the second column varying fastest, so the number of
//! leading rows sharing the first radial value is the axial sample count.

use crate::core_types::GridAxis;
use crate::error::{FieldError, Result};
use crate::field::FieldRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

struct Columns {
    r: Vec<f64>,
    z: Vec<f64>,
    er: Vec<f64>,
    ez: Vec<f64>,
}

impl Columns {
    fn with_capacity(rows: usize, origin: &str) -> Result<Self> {
        let reserve = || -> Result<Vec<f64>> {
            let mut column = Vec::new();
            column
                .try_reserve(rows)
                .map_err(|e| FieldError::Allocation(format!("{origin}: {rows} rows ({e})")))?;
            Ok(column)
        };
        Ok(Self {
            r: reserve()?,
            z: reserve()?,
            er: reserve()?,
            ez: reserve()?,
        })
    }
}

fn range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

impl FieldRecord {
    /// Build an axisymmetric record from a four-column export.
    ///
    /// `size_hint` is the file size in bytes; together with the length of the
    /// first row it sizes the column buffers up front.
    pub fn from_four_column<R: BufRead>(
        reader: R,
        source_name: &str,
        size_hint: Option<u64>,
    ) -> Result<Self> {
        let origin = source_name;
        let mut lines = reader.lines().enumerate().peekable();
        let first_len = match lines.peek() {
            Some((_, Ok(line))) => line.len().max(1),
            _ => 1,
        };
        let estimate = size_hint.map_or(0, |size| (size / first_len as u64) as usize);
        debug!(file = %origin, rows = estimate, "Estimated row count");
        let mut cols = Columns::with_capacity(estimate, origin)?;

        let mut axial_count = 0usize;
        let mut leading_run = true;
        for (i, line) in lines {
            let line = line.map_err(|e| FieldError::io(origin, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let number = i + 1;
            let mut values = [0.0; 4];
            let mut found = 0;
            for word in line.split_whitespace().take(4) {
                values[found] = word.parse::<f64>().map_err(|e| {
                    FieldError::structural(format!("{origin}:{number}: '{word}': {e}"))
                })?;
                found += 1;
            }
            if found < 4 {
                return Err(FieldError::structural(format!(
                    "{origin}:{number}: only {found} of 4 values"
                )));
            }
            let [r, z, er, ez] = values;
            if leading_run {
                if cols.r.first().is_none_or(|&r0| r0 == r) {
                    axial_count += 1;
                } else {
                    leading_run = false;
                }
            }
            cols.r.push(r);
            cols.z.push(z);
            cols.er.push(er);
            cols.ez.push(ez);
        }

        let rows = cols.r.len();
        if rows == 0 {
            return Err(FieldError::structural(format!("{origin}: no data rows")));
        }
        if rows % axial_count != 0 {
            return Err(FieldError::structural(format!(
                "{origin}: {rows} rows do not form columns of {axial_count}"
            )));
        }
        let radial_count = rows / axial_count;
        let (r_min, r_max) = range(&cols.r);
        let (z_min, z_max) = range(&cols.z);
        if r_min != 0.0 {
            return Err(FieldError::structural(format!(
                "{origin}: axisymmetric data needs radial min 0, found {r_min}"
            )));
        }

        let mut payload = Vec::new();
        payload
            .try_reserve_exact(rows * 2)
            .map_err(|e| FieldError::Allocation(format!("{origin}: {} samples ({e})", rows * 2)))?;
        // Input runs radial-major; the slice stores radial index fastest.
        for iz in 0..axial_count {
            for ir in 0..radial_count {
                let src = ir * axial_count + iz;
                payload.push(cols.er[src]);
                payload.push(cols.ez[src]);
            }
        }
        drop(cols);

        let radial = GridAxis::new(radial_count, r_min, r_max);
        let axial = GridAxis::new(axial_count, z_min, z_max);
        let name = Path::new(origin)
            .file_name()
            .map_or_else(|| origin.to_string(), |n| n.to_string_lossy().into_owned());
        FieldRecord::axisymmetric(radial, axial, payload, name)
    }

    /// Read a four-column export from `path`.
    pub fn load_four_column<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FieldError::io(path, e))?;
        let size = file.metadata().ok().map(|m| m.len());
        let origin = path.display().to_string();
        let record = Self::from_four_column(BufReader::new(file), &origin, size)?;
        info!(
            path = %origin,
            radial = record.axis(1).count,
            axial = record.axis(2).count,
            "Four-column export loaded"
        );
        Ok(record)
    }
}
