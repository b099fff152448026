use std::fmt;

use thiserror::Error;

/// Errors returned by the section and descriptor codecs.
///
/// Decoding never substitutes defaults for a structurally invalid record: the
/// decoded values drive motor slave addressing, so any doubt is an error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("buffer too short: need {needed} bytes, got {actual}")]
    BufferTooShort { needed: usize, actual: usize },

    /// The first bytes of the system section are not the expected tag.
    #[error("signature mismatch: found {found:02x?}")]
    SignatureMismatch { found: [u8; 3] },

    #[error("unsupported descriptor version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("invalid value 0x{value:02x} for {field}")]
    InvalidEnumValue { field: &'static str, value: u8 },

    /// Over-length text is rejected, never truncated.
    #[error("{field} is {len} bytes long, max {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Missing terminator, interior NUL or invalid UTF-8.
    #[error("malformed text in {field}")]
    MalformedString { field: &'static str },

    /// The stored section size byte is smaller than the record it announces.
    #[error("invalid section size {size}, expected at least {min}")]
    InvalidSectionSize { size: usize, min: usize },

    #[error("invalid init date {year}-{month:02}-{day:02}")]
    InvalidDate { year: u16, month: u8, day: u8 },

    /// Fatal at encode time: the write is blocked before reaching the store.
    #[error("layout overflow: {total} bytes exceeds the {limit} byte budget")]
    LayoutOverflow { total: usize, limit: usize },

    #[error("storage access out of bounds at {offset} (+{len})")]
    OutOfBounds { offset: usize, len: usize },

    #[error("storage driver error")]
    Storage,

    #[error(transparent)]
    Scroll(#[from] scroll::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Stored data that exceeds the layout budget.
///
/// Reported at decode time only; the physical store already holds the data so
/// decoding continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutWarning {
    pub total: usize,
    pub limit: usize,
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stored layout of {} bytes exceeds the {} byte budget",
            self.total, self.limit
        )
    }
}
