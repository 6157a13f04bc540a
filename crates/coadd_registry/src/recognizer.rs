//! Coadd piece filename recognition.
//!
//! A piece lives at `<filter>/fpC-<run>-<filter><camcol>-<field>_ts_coaddNorm_NN.fit.gz`,
//! e.g. `r/fpC-001234-r5-0042_ts_coaddNorm_NN.fit.gz`. The run is six digits,
//! the camcol one digit and the field four digits. The filter letter appears
//! twice, as the parent directory and inside the name, and both must agree.

use coadd_registry_db::{Filter, FrameId};
use std::fmt;
use std::path::Path;

const NAME_PREFIX: &str = "fpC-";
const NAME_SUFFIX: &str = "_ts_coaddNorm_NN.fit.gz";
const RUN_DIGITS: usize = 6;
const CAMCOL_DIGITS: usize = 1;
const FIELD_DIGITS: usize = 4;

/// Outcome of matching one path against the piece grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    Frame(FrameId),
    Unrecognized(Mismatch),
}

/// Why a path is not a coadd piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// File name or parent directory name is not valid UTF-8.
    NotUtf8,
    /// Path has no parent directory component.
    NoParentDir,
    /// Parent directory is not a single filter letter.
    ParentNotFilter(String),
    /// Name does not start with `fpC-`.
    MissingPrefix,
    /// Run is not six digits followed by `-`.
    BadRun,
    /// Filter letter in the name differs from the parent directory.
    FilterMismatch { dir: Filter, name: Option<char> },
    /// Camcol is not one digit followed by `-`.
    BadCamcol,
    /// Field is not four digits.
    BadField,
    /// Name does not end in exactly `_ts_coaddNorm_NN.fit.gz`.
    BadSuffix,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::NotUtf8 => write!(f, "path is not valid UTF-8"),
            Mismatch::NoParentDir => write!(f, "no parent directory"),
            Mismatch::ParentNotFilter(name) => {
                write!(f, "parent directory '{}' is not a filter (u, g, r, i, z)", name)
            }
            Mismatch::MissingPrefix => write!(f, "name does not start with '{}'", NAME_PREFIX),
            Mismatch::BadRun => write!(f, "run is not {} digits", RUN_DIGITS),
            Mismatch::FilterMismatch { dir, name: Some(c) } => {
                write!(f, "filter '{}' in name does not match directory '{}'", c, dir)
            }
            Mismatch::FilterMismatch { dir, name: None } => {
                write!(f, "name is missing filter '{}'", dir)
            }
            Mismatch::BadCamcol => write!(f, "camcol is not {} digit", CAMCOL_DIGITS),
            Mismatch::BadField => write!(f, "field is not {} digits", FIELD_DIGITS),
            Mismatch::BadSuffix => write!(f, "name does not end with '{}'", NAME_SUFFIX),
        }
    }
}

/// Match a file path against the piece grammar.
///
/// Only the last two path components are inspected; the file is never opened.
pub fn recognize(path: &Path) -> Recognition {
    match parse_path(path) {
        Ok(frame) => Recognition::Frame(frame),
        Err(mismatch) => Recognition::Unrecognized(mismatch),
    }
}

fn parse_path(path: &Path) -> Result<FrameId, Mismatch> {
    let name = path
        .file_name()
        .ok_or(Mismatch::NoParentDir)?
        .to_str()
        .ok_or(Mismatch::NotUtf8)?;
    let parent = path
        .parent()
        .and_then(Path::file_name)
        .ok_or(Mismatch::NoParentDir)?
        .to_str()
        .ok_or(Mismatch::NotUtf8)?;

    let dir_filter =
        Filter::parse(parent).ok_or_else(|| Mismatch::ParentNotFilter(parent.to_string()))?;
    parse_name(name, dir_filter)
}

/// Parse a piece file name whose parent directory names `dir_filter`.
fn parse_name(name: &str, dir_filter: Filter) -> Result<FrameId, Mismatch> {
    let mut cursor = Cursor::new(name);

    if !cursor.literal(NAME_PREFIX) {
        return Err(Mismatch::MissingPrefix);
    }

    let run = cursor.digits(RUN_DIGITS).ok_or(Mismatch::BadRun)?;
    if !cursor.literal("-") {
        return Err(Mismatch::BadRun);
    }

    match cursor.next_char() {
        Some(c) if c == dir_filter.as_char() => {}
        other => {
            return Err(Mismatch::FilterMismatch {
                dir: dir_filter,
                name: other,
            })
        }
    }

    let camcol = cursor.digits(CAMCOL_DIGITS).ok_or(Mismatch::BadCamcol)?;
    if !cursor.literal("-") {
        return Err(Mismatch::BadCamcol);
    }

    let field = cursor.digits(FIELD_DIGITS).ok_or(Mismatch::BadField)?;

    if !cursor.literal(NAME_SUFFIX) || !cursor.is_empty() {
        return Err(Mismatch::BadSuffix);
    }

    // Fixed-width ASCII digits always fit their target widths.
    Ok(FrameId {
        run: run.parse().map_err(|_| Mismatch::BadRun)?,
        filter: dir_filter,
        camcol: camcol.parse().map_err(|_| Mismatch::BadCamcol)?,
        field: field.parse().map_err(|_| Mismatch::BadField)?,
    })
}

/// Left-to-right reader over a file name.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn literal(&mut self, expected: &str) -> bool {
        match self.rest.strip_prefix(expected) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// Take exactly `count` ASCII digits.
    fn digits(&mut self, count: usize) -> Option<&'a str> {
        let taken = self.rest.get(..count)?;
        if !taken.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.rest = &self.rest[count..];
        Some(taken)
    }

    fn next_char(&mut self) -> Option<char> {
        let mut chars = self.rest.chars();
        let c = chars.next()?;
        self.rest = chars.as_str();
        Some(c)
    }

    fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }
}
