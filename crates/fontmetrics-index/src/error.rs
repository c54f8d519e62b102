#![forbid(unsafe_code)]

//! Errors raised while building, encoding, or decoding a width index.

use std::fmt;
use std::io;

use fontmetrics_core::CodePointRange;

/// Part of the binary layout being read when decoding failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Leading `int32` range count.
    RangeCount,
    /// `(lower, upper)` pairs.
    Ranges,
    /// `int32` width count after the ranges.
    WidthCount,
    /// One byte per covered code point.
    Widths,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RangeCount => "range count",
            Self::Ranges => "ranges",
            Self::WidthCount => "width count",
            Self::Widths => "widths",
        })
    }
}

/// Failure to decode a serialized width index.
#[derive(Debug)]
pub enum DecodeError {
    /// The data ends before a declared count is satisfied.
    Truncated {
        /// Section being read.
        section: Section,
        /// Total bytes required to finish the section.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },
    /// A header count is negative.
    NegativeCount {
        /// Which count.
        section: Section,
        /// The value read.
        count: i32,
    },
    /// Strict decoding only: `width_count` disagrees with the range spans.
    WidthCountMismatch {
        /// `width_count` from the header.
        declared: usize,
        /// Sum of the range spans.
        expected: i64,
    },
    /// The underlying reader or file failed.
    Io(io::Error),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated {
                section,
                needed,
                available,
            } => write!(
                f,
                "width index truncated in {section}: need {needed} bytes, have {available}"
            ),
            Self::NegativeCount { section, count } => {
                write!(f, "negative {section} in width index: {count}")
            }
            Self::WidthCountMismatch { declared, expected } => write!(
                f,
                "width count mismatch: header declares {declared}, ranges cover {expected}"
            ),
            Self::Io(e) => write!(f, "failed to read width index: {e}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Failure to build or write a width index.
#[derive(Debug)]
pub enum EncodeError {
    /// A count does not fit the signed 32-bit header field.
    TooLarge {
        /// Which count.
        section: Section,
        /// The count that did not fit.
        count: u64,
    },
    /// The table holds a range with `lower > upper`.
    InvertedRange(CodePointRange),
    /// The sink or file failed.
    Io(io::Error),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { section, count } => {
                write!(f, "{section} too large for width index: {count}")
            }
            Self::InvertedRange(range) => {
                write!(f, "cannot encode inverted range {range}")
            }
            Self::Io(e) => write!(f, "failed to write width index: {e}"),
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::TooLarge { .. } | Self::InvertedRange(_) => None,
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
