//! Reading and writing the binary field container.
//!
//! Header layout (native endian, 512 bytes):
//!
//! ```text
//! offset  size  field
//!      0     4  magic 'CD3B'
//!      4     4  payload offset from the start of the file
//!      8    64  model name, NUL padded
//!     72    64  source name, NUL padded
//!    136     4  kind (0 = axisymmetric slice, 1 = full 3D)
//!    140    12  per-axis sample counts
//!    152    24  per-axis minima
//!    176    24  per-axis maxima
//!    200    24  per-axis spacings
//!    224     4  slice row stride (0 for full 3D)
//!    228   284  reserved, zero
//! ```
//!
//! An axisymmetric slice is written with its surrounding 3D box in the axis
//! limits: x and y both span `[-R, R]`, x has one sample, and y carries the
//! radial sample count and spacing. Reading accepts that layout as well as a
//! radial axis starting at 0.

use crate::core_types::{nearly_equal, GridAxis};
use crate::error::{zeroed_payload, FieldError, Result};
use crate::field::{FieldKind, FieldRecord};
use bytemuck::{Pod, Zeroable};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// File magic, the bytes `CD3B` read as a big-endian word
pub const MAGIC: u32 = 0x4344_3342;

/// Total header size in bytes
pub const HEADER_LEN: usize = 512;

/// Width of the model and source name fields
pub const NAME_LEN: usize = 64;

const KIND_AXISYMMETRIC: u32 = 0;
const KIND_CARTESIAN: u32 = 1;

/// Relative slack when matching the stored radial minimum against 0 or `-R`
const RADIAL_TOLERANCE: f64 = 1e-9;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ContainerHeader {
    magic: u32,
    data_offset: u32,
    model_name: [u8; NAME_LEN],
    source_name: [u8; NAME_LEN],
    kind: u32,
    counts: [u32; 3],
    mins: [f64; 3],
    maxs: [f64; 3],
    deltas: [f64; 3],
    stride: u32,
    reserved: u32,
    filler: [u8; 280],
}

const _: () = assert!(std::mem::size_of::<ContainerHeader>() == HEADER_LEN);

/// A record as stored on disk together with the model it came from
#[derive(Debug, Clone, PartialEq)]
pub struct StoredField {
    pub model_name: String,
    pub record: FieldRecord,
}

fn encode_name(name: &str) -> [u8; NAME_LEN] {
    let mut out = [0u8; NAME_LEN];
    // Keep room for the terminating NUL and never split a character.
    let mut end = name.len().min(NAME_LEN - 1);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    out[..end].copy_from_slice(&name.as_bytes()[..end]);
    out
}

fn decode_name(raw: &[u8; NAME_LEN]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Header axes of a slice: the radial axis widened to `[-R, R]` on x and y.
fn slice_header_axes(record: &FieldRecord) -> [GridAxis; 3] {
    let radial = *record.axis(1);
    let r = radial.max;
    [
        GridAxis {
            count: 1,
            min: -r,
            max: r,
            delta: radial.delta,
        },
        GridAxis {
            min: -r,
            ..radial
        },
        *record.axis(2),
    ]
}

/// Radial axis of a slice header, starting at 0 whichever layout was stored.
fn radial_from_header(axis: &GridAxis, location: &str) -> Result<GridAxis> {
    let starts_at_zero = nearly_equal(axis.min, 0.0, RADIAL_TOLERANCE);
    if !starts_at_zero && !nearly_equal(axis.min, -axis.max, RADIAL_TOLERANCE) {
        return Err(FieldError::structural(format!(
            "{location}: radial axis spans {} to {}, expected 0 or -{} as minimum",
            axis.min, axis.max, axis.max
        )));
    }
    Ok(GridAxis {
        min: 0.0,
        ..*axis
    })
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| FieldError::structural(format!("{what} {value} does not fit the header")))
}

/// Serialise a single leaf record.
///
/// # Errors
/// Fails with a structural error for containers and records with children,
/// and with an I/O error (attributed to `origin`) on a short write.
pub fn write_record<W: Write>(
    record: &FieldRecord,
    model_name: &str,
    mut writer: W,
    origin: &Path,
) -> Result<()> {
    if !record.has_data() {
        return Err(FieldError::structural(format!(
            "{}: a field without data cannot be written",
            record.source_name()
        )));
    }
    if !record.is_leaf() {
        return Err(FieldError::structural(format!(
            "{}: nested fields are written one file per record",
            record.source_name()
        )));
    }

    let mut header = ContainerHeader::zeroed();
    header.magic = MAGIC;
    header.data_offset = HEADER_LEN as u32;
    header.model_name = encode_name(model_name);
    header.source_name = encode_name(record.source_name());
    header.kind = match record.kind() {
        FieldKind::Axisymmetric => KIND_AXISYMMETRIC,
        FieldKind::Cartesian => KIND_CARTESIAN,
    };
    let axes = match record.kind() {
        FieldKind::Axisymmetric => slice_header_axes(record),
        FieldKind::Cartesian => *record.axes(),
    };
    for (i, axis) in axes.iter().enumerate() {
        header.counts[i] = to_u32(axis.count, "sample count")?;
        header.mins[i] = axis.min;
        header.maxs[i] = axis.max;
        header.deltas[i] = axis.delta;
    }
    header.stride = to_u32(record.stride(), "stride")?;

    let io_err = |e| FieldError::io(origin, e);
    writer.write_all(bytemuck::bytes_of(&header)).map_err(io_err)?;
    writer
        .write_all(bytemuck::cast_slice(record.payload()))
        .map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    Ok(())
}

/// Deserialise one record.
///
/// The header is validated before any payload storage is reserved; no
/// partial record escapes on failure.
pub fn read_record<R: Read>(mut reader: R, origin: &Path) -> Result<StoredField> {
    let io_err = |e| FieldError::io(origin, e);
    let mut header = ContainerHeader::zeroed();
    reader
        .read_exact(bytemuck::bytes_of_mut(&mut header))
        .map_err(io_err)?;

    let location = origin.display();
    if header.magic != MAGIC {
        return Err(FieldError::structural(format!(
            "{location}: bad magic {:#010x}, not a field container",
            header.magic
        )));
    }
    let kind = match header.kind {
        KIND_AXISYMMETRIC => FieldKind::Axisymmetric,
        KIND_CARTESIAN => FieldKind::Cartesian,
        other => {
            return Err(FieldError::structural(format!(
                "{location}: unsupported field kind {other}"
            )))
        }
    };
    let mut axes: [GridAxis; 3] = std::array::from_fn(|i| GridAxis {
        count: header.counts[i] as usize,
        min: header.mins[i],
        max: header.maxs[i],
        delta: header.deltas[i],
    });
    let active = axes.iter().filter(|a| a.is_active()).count();
    if active != kind.active_axes() {
        return Err(FieldError::structural(format!(
            "{location}: {kind:?} field with {active} active axes"
        )));
    }
    for (axis, name) in axes.iter().zip(crate::core_types::AXIS_NAMES) {
        if axis.count == 0 {
            return Err(FieldError::structural(format!("{location}: {name} axis has no samples")));
        }
        if axis.is_active() && (axis.delta <= 0.0 || axis.max <= axis.min) {
            return Err(FieldError::structural(format!(
                "{location}: {name} axis min {} max {} delta {}",
                axis.min, axis.max, axis.delta
            )));
        }
    }
    if kind == FieldKind::Axisymmetric && header.stride as usize != axes[1].count {
        return Err(FieldError::structural(format!(
            "{location}: stride {} does not match radial count {}",
            header.stride, axes[1].count
        )));
    }
    if kind == FieldKind::Axisymmetric {
        axes[1] = radial_from_header(&axes[1], &location.to_string())?;
    }

    let data_offset = header.data_offset as usize;
    if data_offset < HEADER_LEN {
        return Err(FieldError::structural(format!(
            "{location}: payload offset {data_offset} inside the header"
        )));
    }
    let skip = (data_offset - HEADER_LEN) as u64;
    if skip > 0 {
        let skipped = io::copy(&mut (&mut reader).take(skip), &mut io::sink()).map_err(io_err)?;
        if skipped != skip {
            return Err(io_err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file ends before the payload",
            )));
        }
    }

    let len = axes
        .iter()
        .try_fold(kind.component_count(), |acc, a| acc.checked_mul(a.count))
        .ok_or_else(|| FieldError::Allocation(format!("{location}: grid size overflows")))?;
    let mut payload = zeroed_payload(len, &location.to_string())?;
    reader
        .read_exact(bytemuck::cast_slice_mut(&mut payload))
        .map_err(io_err)?;

    let mut source_name = decode_name(&header.source_name);
    if source_name.is_empty() {
        source_name = origin
            .file_name()
            .map_or_else(|| location.to_string(), |n| n.to_string_lossy().into_owned());
    }
    let record = match kind {
        FieldKind::Cartesian => FieldRecord::cartesian(axes, payload, source_name)?,
        FieldKind::Axisymmetric => FieldRecord::axisymmetric(axes[1], axes[2], payload, source_name)?,
    };
    let model_name = decode_name(&header.model_name);
    debug!(
        path = %location,
        model = %model_name,
        counts = ?header.counts,
        "Field header decoded"
    );
    Ok(StoredField { model_name, record })
}

/// Write `record` to `path`, replacing any existing file.
pub fn save<P: AsRef<Path>>(path: P, record: &FieldRecord, model_name: &str) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| FieldError::io(path, e))?;
    write_record(record, model_name, BufWriter::new(file), path)?;
    info!(
        path = %path.display(),
        source = %record.source_name(),
        samples = record.sample_count(),
        "Field written"
    );
    Ok(())
}

/// Read the record stored at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<StoredField> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FieldError::io(path, e))?;
    let stored = read_record(BufReader::new(file), path)?;
    info!(
        path = %path.display(),
        source = %stored.record.source_name(),
        samples = stored.record.sample_count(),
        "Field loaded"
    );
    Ok(stored)
}

/// Read the record stored at `path`, discarding the model name.
pub fn load_record<P: AsRef<Path>>(path: P) -> Result<FieldRecord> {
    load(path).map(|stored| stored.record)
}
