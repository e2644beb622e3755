//! Nested field descriptions.
//!
//! A text file assembles binary field files into a hierarchy:
//!
//! ```text
//! fields data/            # directory for the relative names below
//! cfield coarse.bin       # composite node, loads coarse.bin as its own grid
//!   field fine_a.bin      # leaf child
//!   cfield                # composite without data of its own
//!     field finest.bin
//!   end
//! end coarse.bin
//! ```
//!
//! Tokens are separated by whitespace or commas. An `end` tag must repeat the
//! name given to its `cfield` (or be bare when the `cfield` was bare). Text
//! after `#` is a comment.

use super::hierarchy::HierarchyConfig;
use super::record::FieldRecord;
use crate::codec;
use crate::error::{FieldError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Words of a line with any `#` comment removed.
fn tokens(line: &str) -> impl Iterator<Item = &str> {
    let content = line.split('#').next().unwrap_or_default();
    content
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

struct FieldSetParser<'c, L> {
    lines: Vec<(usize, String)>,
    cursor: usize,
    base_dir: PathBuf,
    origin: String,
    config: &'c HierarchyConfig,
    loader: L,
}

impl<L> FieldSetParser<'_, L>
where
    L: FnMut(&Path) -> Result<FieldRecord>,
{
    fn next_line(&mut self) -> Option<(usize, Vec<String>)> {
        while let Some((number, line)) = self.lines.get(self.cursor) {
            self.cursor += 1;
            let words: Vec<String> = tokens(line).map(str::to_string).collect();
            if !words.is_empty() {
                return Some((*number, words));
            }
        }
        None
    }

    fn error(&self, line: usize, message: impl std::fmt::Display) -> FieldError {
        FieldError::structural(format!("{}:{line}: {message}", self.origin))
    }

    fn load_leaf(&mut self, line: usize, name: Option<&String>) -> Result<FieldRecord> {
        let name = name.ok_or_else(|| self.error(line, "field needs a file name"))?;
        let path = self.base_dir.join(name);
        let mut record = (self.loader)(&path)?;
        record.source_name.clone_from(name);
        debug!(field = %name, "Field set member loaded");
        Ok(record)
    }

    /// Parse the children of a `cfield` up to and including its `end`.
    fn parse_composite(&mut self, start: usize, name: Option<String>) -> Result<FieldRecord> {
        let mut node = match &name {
            Some(n) => self.load_leaf(start, Some(n))?,
            None => FieldRecord::container(format!("{}:{start}", self.origin)),
        };
        loop {
            let Some((line, words)) = self.next_line() else {
                return Err(self.error(
                    start,
                    format!("cfield {} has no matching end", name.as_deref().unwrap_or("")),
                ));
            };
            let child = match words[0].as_str() {
                "field" => self.load_leaf(line, words.get(1))?,
                "cfield" => self.parse_composite(line, words.get(1).cloned())?,
                "end" => {
                    let end_name = words.get(1).map(String::as_str);
                    if end_name != name.as_deref() {
                        return Err(self.error(
                            line,
                            format!(
                                "end {} does not match cfield {}",
                                end_name.unwrap_or(""),
                                name.as_deref().unwrap_or("")
                            ),
                        ));
                    }
                    return Ok(node);
                }
                other => {
                    return Err(self.error(line, format!("expected field, cfield or end, found '{other}'")));
                }
            };
            node.add_child(child, self.config)?;
        }
    }

    fn parse(mut self) -> Result<FieldRecord> {
        let mut root: Option<FieldRecord> = None;
        while let Some((line, words)) = self.next_line() {
            let node = match words[0].as_str() {
                "fields" => {
                    let dir = words
                        .get(1)
                        .ok_or_else(|| self.error(line, "fields needs a directory"))?;
                    let dir = self.base_dir.join(dir);
                    if !dir.is_dir() {
                        return Err(self.error(line, format!("'{}' is not a directory", dir.display())));
                    }
                    self.base_dir = dir;
                    continue;
                }
                "field" => self.load_leaf(line, words.get(1))?,
                "cfield" => self.parse_composite(line, words.get(1).cloned())?,
                other => {
                    return Err(self.error(line, format!("expected field or cfield, found '{other}'")));
                }
            };
            if root.is_some() {
                return Err(self.error(line, "only one top-level field is allowed"));
            }
            root = Some(node);
        }
        root.ok_or_else(|| FieldError::structural(format!("{}: no field defined", self.origin)))
    }
}

/// Build a hierarchy from a description read from `reader`.
///
/// Relative file names resolve against `base_dir` (updated by `fields`
/// lines). `loader` turns a resolved path into a record, which lets callers
/// substitute in-memory fields.
pub fn parse_field_set<R, L>(
    reader: R,
    origin: &str,
    base_dir: &Path,
    config: &HierarchyConfig,
    loader: L,
) -> Result<FieldRecord>
where
    R: BufRead,
    L: FnMut(&Path) -> Result<FieldRecord>,
{
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| FieldError::io(origin, e))?;
        lines.push((i + 1, line));
    }
    FieldSetParser {
        lines,
        cursor: 0,
        base_dir: base_dir.to_path_buf(),
        origin: origin.to_string(),
        config,
        loader,
    }
    .parse()
}

/// Load a field description file and every binary field it references.
///
/// Relative names resolve against the directory holding the description.
pub fn load_field_set<P: AsRef<Path>>(path: P, config: &HierarchyConfig) -> Result<FieldRecord> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| FieldError::io(path, e))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let origin = path.display().to_string();
    let root = parse_field_set(BufReader::new(file), &origin, base_dir, config, |p: &Path| {
        codec::load_record(p)
    })?;
    info!(
        path = %origin,
        children = root.children().len(),
        "Field set assembled"
    );
    Ok(root)
}
