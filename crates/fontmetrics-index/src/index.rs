#![forbid(unsafe_code)]

//! Width lookup over a range-compressed table.
//!
//! A [`WidthIndex`] stores one width byte per code point covered by its
//! ranges, concatenated in range order. Resolving a code point means finding
//! its range and adding the distance from the range's lower bound to the
//! running offset of all ranges before it.
//!
//! # Lookup policy
//!
//! - Code points below U+0020 are always zero width.
//! - The first range (in stored order) containing the code point wins.
//! - A code point with no range, or whose slot lies outside the width
//!   buffer, resolves to the fallback width (the reference font size by
//!   default). Missing data is never an error.

use fontmetrics_core::{
    CodePointRange, FIRST_PRINTABLE, REFERENCE_FONT_SIZE, RangeTable, WidthSource,
};

/// How [`WidthIndex`] locates the range for a code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Ranges are ordered and disjoint: binary search over lower bounds.
    Binary,
    /// Ranges may be unordered or overlapping: scan in stored order.
    Linear,
}

/// Read-only width table for a fixed reference font.
///
/// Immutable after construction and safe to share between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidthIndex {
    ranges: Vec<CodePointRange>,
    /// Signed running offset of each range's first slot.
    offsets: Vec<i64>,
    widths: Vec<i8>,
    search: SearchMode,
    fallback: i8,
}

impl WidthIndex {
    /// Assemble an index from ranges and a flat width buffer.
    ///
    /// The buffer is not checked against the ranges; slots past its end
    /// resolve to the fallback width.
    pub(crate) fn from_parts(ranges: Vec<CodePointRange>, widths: Vec<i8>) -> Self {
        let mut offsets = Vec::with_capacity(ranges.len());
        let mut offset = 0i64;
        for r in &ranges {
            offsets.push(offset);
            offset += r.span();
        }

        let search = if is_strictly_ordered(&ranges) {
            SearchMode::Binary
        } else {
            SearchMode::Linear
        };

        Self {
            ranges,
            offsets,
            widths,
            search,
            fallback: REFERENCE_FONT_SIZE,
        }
    }

    /// Replace the width reported for code points without an entry.
    #[must_use]
    pub fn with_fallback_width(mut self, width: i8) -> Self {
        self.fallback = width;
        self
    }

    /// Width of a single code point.
    ///
    /// # Example
    /// ```
    /// use fontmetrics_core::{CodePointRange, RangeTable, REFERENCE_FONT_SIZE, from_fn};
    /// use fontmetrics_index::WidthIndex;
    ///
    /// let table = RangeTable::new([CodePointRange::new(0, 127)]);
    /// let index = WidthIndex::build(&table, &from_fn(|_| 70)).unwrap();
    /// assert_eq!(index.width_of(u32::from('A')), 70);
    /// assert_eq!(index.width_of(u32::from('\t')), 0);
    /// assert_eq!(index.width_of(0x4E2D), REFERENCE_FONT_SIZE);
    /// ```
    #[must_use]
    pub fn width_of(&self, code_point: u32) -> i8 {
        if code_point < FIRST_PRINTABLE {
            return 0;
        }
        self.slot(code_point)
            .and_then(|slot| self.widths.get(slot))
            .copied()
            .unwrap_or(self.fallback)
    }

    /// Width of `c`.
    #[inline]
    #[must_use]
    pub fn char_width(&self, c: char) -> i8 {
        self.width_of(u32::from(c))
    }

    /// Total width of `text`, one code point at a time.
    #[must_use]
    pub fn text_width(&self, text: &str) -> i64 {
        text.chars().map(|c| i64::from(self.char_width(c))).sum()
    }

    /// Total width of UTF-16 text.
    ///
    /// Surrogate pairs are combined into a single code point. An unpaired
    /// surrogate is measured as its own code unit value.
    #[must_use]
    pub fn text_width_utf16(&self, units: &[u16]) -> i64 {
        char::decode_utf16(units.iter().copied())
            .map(|decoded| match decoded {
                Ok(c) => u32::from(c),
                Err(e) => u32::from(e.unpaired_surrogate()),
            })
            .map(|cp| i64::from(self.width_of(cp)))
            .sum()
    }

    /// True if some range contains `code_point` and its slot is populated.
    #[must_use]
    pub fn covers(&self, code_point: u32) -> bool {
        self.slot(code_point)
            .is_some_and(|slot| slot < self.widths.len())
    }

    /// Ranges in stored order.
    #[must_use]
    pub fn ranges(&self) -> &[CodePointRange] {
        &self.ranges
    }

    /// The ranges as a [`RangeTable`], e.g. to re-export with another source.
    #[must_use]
    pub fn range_table(&self) -> RangeTable {
        RangeTable::new(self.ranges.iter().copied())
    }

    /// The flat width buffer, one entry per covered code point.
    #[must_use]
    pub fn widths(&self) -> &[i8] {
        &self.widths
    }

    /// Number of ranges.
    #[must_use]
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    /// Number of stored widths.
    #[must_use]
    pub fn width_count(&self) -> usize {
        self.widths.len()
    }

    /// Width reported for code points without an entry.
    #[must_use]
    pub fn fallback_width(&self) -> i8 {
        self.fallback
    }

    /// How ranges are located, fixed at construction.
    #[must_use]
    pub fn search_mode(&self) -> SearchMode {
        self.search
    }

    /// Sum of all range spans; equals `width_count` for a consistent index.
    #[must_use]
    pub fn expected_width_count(&self) -> i64 {
        self.ranges.iter().map(CodePointRange::span).sum()
    }

    /// Slot of `code_point` in the width buffer, if its range is known.
    fn slot(&self, code_point: u32) -> Option<usize> {
        let cp = i64::from(code_point);
        let idx = match self.search {
            SearchMode::Binary => {
                let after = self.ranges.partition_point(|r| i64::from(r.lower) <= cp);
                let idx = after.checked_sub(1)?;
                self.ranges[idx].contains(code_point).then_some(idx)?
            }
            SearchMode::Linear => self.ranges.iter().position(|r| r.contains(code_point))?,
        };
        let pos = self.offsets[idx] + cp - i64::from(self.ranges[idx].lower);
        usize::try_from(pos).ok()
    }
}

impl WidthSource for WidthIndex {
    #[inline]
    fn char_width(&self, code_point: u32) -> i32 {
        i32::from(self.width_of(code_point))
    }

    fn text_width(&self, text: &str) -> i64 {
        WidthIndex::text_width(self, text)
    }
}

/// Every range is non-empty and ends before the next one starts.
fn is_strictly_ordered(ranges: &[CodePointRange]) -> bool {
    ranges.iter().all(|r| !r.is_empty())
        && ranges.windows(2).all(|pair| pair[0].upper < pair[1].lower)
}
