//! Binary field container
//!
//! One field record per file: a fixed 512-byte header followed by the flat
//! payload of doubles in native byte order.

pub mod binary;

pub use binary::{
    load, load_record, read_record, save, write_record, StoredField, HEADER_LEN, MAGIC,
    NAME_LEN,
};
