#![forbid(unsafe_code)]

//! Binary encoding of a [`WidthIndex`].
//!
//! All integers are big-endian, signed 32-bit:
//!
//! ```text
//! int32  range_count                 N
//! N x    int32 lower, int32 upper    inclusive code point bounds
//! int32  width_count                 W
//! W x    int8  width
//! ```
//!
//! The encoded length is `4 + 8 * N + 4 + W`. Range bounds are signed, so a
//! foreign blob may carry negative bounds; they are compared and summed as
//! signed values.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use fontmetrics_core::{CodePointRange, RangeTable, WidthSource, stored_width};

use crate::error::{DecodeError, EncodeError, Section};
use crate::index::WidthIndex;

const COUNT_LEN: usize = 4;
const RANGE_LEN: usize = 8;

/// Options controlling how strictly a blob is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Reject blobs whose `width_count` differs from the sum of range spans.
    ///
    /// Off by default: a mismatched blob decodes and the affected lookups
    /// fall back.
    pub strict: bool,
}

impl DecodeOptions {
    /// Options with width-count validation enabled.
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }
}

/// Measure every code point of `table` with `source` and serialize the result.
///
/// # Errors
///
/// Returns [`EncodeError::TooLarge`] if a count exceeds `i32::MAX`.
pub fn encode<S>(table: &RangeTable, source: &S) -> Result<Vec<u8>, EncodeError>
where
    S: WidthSource + ?Sized,
{
    Ok(WidthIndex::build(table, source)?.to_bytes())
}

/// Decode a serialized index with default options.
///
/// # Errors
///
/// See [`WidthIndex::from_bytes`].
pub fn decode(bytes: &[u8]) -> Result<WidthIndex, DecodeError> {
    WidthIndex::from_bytes(bytes)
}

impl WidthIndex {
    /// Build an index by measuring every code point of `table` with `source`.
    ///
    /// Code points below U+0020 (including negative bounds) are stored as
    /// zero; all other widths are clamped to `[0, 127]`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::InvertedRange`] if a range has
    /// `lower > upper`, and [`EncodeError::TooLarge`] if the range or width
    /// count does not fit the 32-bit header fields.
    pub fn build<S>(table: &RangeTable, source: &S) -> Result<Self, EncodeError>
    where
        S: WidthSource + ?Sized,
    {
        if let Some(range) = table.first_inverted() {
            return Err(EncodeError::InvertedRange(*range));
        }
        check_count(Section::Ranges, table.len() as u64)?;
        let total = table.total_len();
        check_count(Section::Widths, total)?;

        let mut widths = Vec::with_capacity(total as usize);
        for range in table {
            for code_point in range.lower..=range.upper {
                widths.push(match u32::try_from(code_point) {
                    Ok(cp) => stored_width(source, cp),
                    Err(_) => 0,
                });
            }
        }

        tracing::debug!(
            ranges = table.len(),
            widths = widths.len(),
            "built width index"
        );
        Ok(Self::from_parts(table.as_slice().to_vec(), widths))
    }

    /// Size of [`to_bytes`](Self::to_bytes) output.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        COUNT_LEN + self.range_count() * RANGE_LEN + COUNT_LEN + self.width_count()
    }

    /// Serialize the index.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        // Counts fit in i32: `build` checks them and decoded counts came from i32.
        out.extend_from_slice(&(self.range_count() as i32).to_be_bytes());
        for range in self.ranges() {
            out.extend_from_slice(&range.lower.to_be_bytes());
            out.extend_from_slice(&range.upper.to_be_bytes());
        }
        out.extend_from_slice(&(self.width_count() as i32).to_be_bytes());
        out.extend(self.widths().iter().map(|&w| w as u8));
        out
    }

    /// Write the serialized index to `sink`.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error from the sink.
    pub fn write_to<W: Write>(&self, mut sink: W) -> Result<(), EncodeError> {
        sink.write_all(&self.to_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Write the serialized index to a file, replacing it if present.
    ///
    /// # Errors
    ///
    /// Propagates any I/O error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EncodeError> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes())?;
        tracing::info!(
            path = %path.display(),
            bytes = self.encoded_len(),
            "saved width index"
        );
        Ok(())
    }

    /// Decode a serialized index, tolerating width-count mismatches.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if the data ends before a declared
    /// count is satisfied and [`DecodeError::NegativeCount`] for negative
    /// header counts.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_bytes_with(bytes, DecodeOptions::default())
    }

    /// Decode a serialized index with explicit options.
    ///
    /// # Errors
    ///
    /// As [`from_bytes`](Self::from_bytes), plus
    /// [`DecodeError::WidthCountMismatch`] when `options.strict` is set.
    pub fn from_bytes_with(bytes: &[u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(bytes);

        let range_count = reader.read_count(Section::RangeCount)?;
        let raw_ranges = reader.take_array(range_count, RANGE_LEN, Section::Ranges)?;
        let ranges = raw_ranges
            .chunks_exact(RANGE_LEN)
            .map(|chunk| {
                let (lower, upper) = chunk.split_at(COUNT_LEN);
                CodePointRange::new(be_i32(lower), be_i32(upper))
            })
            .collect();

        let width_count = reader.read_count(Section::WidthCount)?;
        let widths = reader
            .take_array(width_count, 1, Section::Widths)?
            .iter()
            .map(|&b| b as i8)
            .collect();

        if reader.remaining() > 0 {
            tracing::debug!(
                trailing = reader.remaining(),
                "ignoring bytes after width data"
            );
        }

        let index = Self::from_parts(ranges, widths);
        let expected = index.expected_width_count();
        if expected != width_count as i64 {
            if options.strict {
                return Err(DecodeError::WidthCountMismatch {
                    declared: width_count,
                    expected,
                });
            }
            tracing::warn!(
                declared = width_count,
                expected,
                "width count does not match ranges; affected lookups will fall back"
            );
        }

        tracing::debug!(
            ranges = index.range_count(),
            widths = index.width_count(),
            search = ?index.search_mode(),
            "decoded width index"
        );
        Ok(index)
    }

    /// Read a serialized index from `reader` until end of input.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Io`] on read failure, otherwise as
    /// [`from_bytes`](Self::from_bytes).
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, DecodeError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::from_bytes(&buf)
    }

    /// Load a serialized index from a file.
    ///
    /// # Errors
    ///
    /// As [`read_from`](Self::read_from).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        Self::load_with(path, DecodeOptions::default())
    }

    /// Load a serialized index from a file with explicit options.
    ///
    /// # Errors
    ///
    /// As [`from_bytes_with`](Self::from_bytes_with), plus
    /// [`DecodeError::Io`].
    pub fn load_with(path: impl AsRef<Path>, options: DecodeOptions) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading width index");
        let bytes = fs::read(path)?;
        Self::from_bytes_with(&bytes, options)
    }
}

fn check_count(section: Section, count: u64) -> Result<(), EncodeError> {
    if count > i32::MAX as u64 {
        return Err(EncodeError::TooLarge { section, count });
    }
    Ok(())
}

fn be_i32(bytes: &[u8]) -> i32 {
    let mut word = [0u8; COUNT_LEN];
    word.copy_from_slice(bytes);
    i32::from_be_bytes(word)
}

/// Cursor over a fully buffered blob.
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, section: Section) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(DecodeError::Truncated {
                section,
                needed: self.pos.saturating_add(len),
                available: self.bytes.len(),
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array(
        &mut self,
        count: usize,
        item_len: usize,
        section: Section,
    ) -> Result<&'a [u8], DecodeError> {
        self.take(count.saturating_mul(item_len), section)
    }

    fn read_count(&mut self, section: Section) -> Result<usize, DecodeError> {
        let count = be_i32(self.take(COUNT_LEN, section)?);
        usize::try_from(count).map_err(|_| DecodeError::NegativeCount { section, count })
    }
}
