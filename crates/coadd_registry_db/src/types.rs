//! Row types stored in the registry.

use std::fmt;

/// Photometric filter band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    U,
    G,
    R,
    I,
    Z,
}

impl Filter {
    /// All bands in wavelength order.
    pub const ALL: [Filter; 5] = [Filter::U, Filter::G, Filter::R, Filter::I, Filter::Z];

    /// Parse a single filter letter (lowercase only).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'u' => Some(Filter::U),
            'g' => Some(Filter::G),
            'r' => Some(Filter::R),
            'i' => Some(Filter::I),
            'z' => Some(Filter::Z),
            _ => None,
        }
    }

    /// Parse a string holding exactly one filter letter.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Filter::U => 'u',
            Filter::G => 'g',
            Filter::R => 'r',
            Filter::I => 'i',
            Filter::Z => 'z',
        }
    }

    /// Text form stored in the `filter` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Filter::U => "u",
            Filter::G => "g",
            Filter::R => "r",
            Filter::I => "i",
            Filter::Z => "z",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one coadd piece: the composite key of a `raw` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId {
    pub run: u32,
    pub filter: Filter,
    pub camcol: u8,
    pub field: u16,
}

impl FrameId {
    /// Deduplication key, e.g. `7_Bu_C2_F9`.
    pub fn key(&self) -> String {
        composite_key(
            i64::from(self.run),
            self.filter.as_str(),
            i64::from(self.camcol),
            i64::from(self.field),
        )
    }
}

/// Format the deduplication key for a row.
///
/// Integers are written without padding, so run `001234` becomes `1234`.
/// Rows read back from an older catalog go through this too, which keeps
/// seeded keys and freshly recognized keys comparable.
pub fn composite_key(run: i64, filter: &str, camcol: i64, field: i64) -> String {
    format!("{}_B{}_C{}_F{}", run, filter, camcol, field)
}

/// A stored `raw` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: i64,
    pub frame: FrameId,
}
