#![forbid(unsafe_code)]

//! Code point ranges and the range-definition loader.
//!
//! A [`RangeTable`] lists the inclusive code point intervals a width index
//! carries data for. Tables are usually parsed from a small text format:
//!
//! ```text
//! # comment
//! 0000 . 007F   Basic Latin
//! 0080 . 00FF   Latin-1 Supplement
//! ```
//!
//! Each line holds a hexadecimal lower bound, a single separator character
//! surrounded by spaces, a hexadecimal upper bound, and three spaces
//! followed by a free-form label.
//!
//! # Example
//! ```
//! use fontmetrics_core::{CodePointRange, RangeTable};
//!
//! let table = RangeTable::parse("0080 . 00FF   Latin-1\n0000 . 007F   ASCII\n").unwrap();
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.as_slice()[0], CodePointRange::new(0x00, 0x7F));
//! assert_eq!(table.total_len(), 256);
//! ```

use std::fmt;
use std::io;
use std::path::Path;

/// Range sets bundled with the crate, by name.
const BUILTIN_RANGES: &[(&str, &str)] = &[("short", include_str!("../ranges/short.txt"))];

/// An inclusive interval of code points.
///
/// Bounds are signed 32-bit values, exactly as they appear in a serialized
/// index. Ranges built by the loader are non-negative and satisfy
/// `lower <= upper`. Ranges read back from a foreign index may have negative
/// bounds or be inverted; an inverted range contains no code point and its
/// [`span`](Self::span) is zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodePointRange {
    /// Inclusive lower bound.
    pub lower: i32,
    /// Inclusive upper bound.
    pub upper: i32,
}

impl CodePointRange {
    /// Create a range from inclusive bounds.
    #[must_use]
    pub const fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }

    /// Signed slot count `upper - lower + 1`.
    #[inline]
    #[must_use]
    pub const fn span(&self) -> i64 {
        self.upper as i64 - self.lower as i64 + 1
    }

    /// Number of code points covered (zero for inverted ranges).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.span() as u64
        }
    }

    /// True if the range is inverted and covers nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lower > self.upper
    }

    /// Check whether `code_point` lies within the inclusive bounds.
    #[inline]
    #[must_use]
    pub const fn contains(&self, code_point: u32) -> bool {
        let cp = code_point as i64;
        self.lower as i64 <= cp && cp <= self.upper as i64
    }

    /// Check whether two non-empty ranges share at least one code point.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.lower <= other.upper
            && other.lower <= self.upper
    }
}

impl fmt::Display for CodePointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bound(f, self.lower)?;
        f.write_str("..")?;
        write_bound(f, self.upper)
    }
}

fn write_bound(f: &mut fmt::Formatter<'_>, bound: i32) -> fmt::Result {
    if bound < 0 {
        write!(f, "{bound}")
    } else {
        write!(f, "U+{bound:04X}")
    }
}

/// What was wrong with a range-definition line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The line does not have the `<lower> . <upper>   ` shape.
    Shape,
    /// A bound is not a hexadecimal value in `0..=7FFFFFFF`.
    InvalidHex,
    /// The lower bound is greater than the upper bound.
    Inverted,
}

/// A malformed line in a range-definition text.
///
/// Loading stops at the first bad line; no partial table is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// 1-based line number.
    pub line: usize,
    /// The offending line, trimmed.
    pub content: String,
    /// What was wrong with it.
    pub kind: FormatErrorKind,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            FormatErrorKind::Shape => "expected `<lower> . <upper>   `",
            FormatErrorKind::InvalidHex => "invalid hexadecimal bound",
            FormatErrorKind::Inverted => "lower bound exceeds upper bound",
        };
        write!(f, "invalid range at line {}: {what}: {:?}", self.line, self.content)
    }
}

impl std::error::Error for FormatError {}

/// Failure to read a range-definition file.
#[derive(Debug)]
pub enum RangeLoadError {
    /// The file could not be read.
    Io(io::Error),
    /// The file content is malformed.
    Format(FormatError),
}

impl fmt::Display for RangeLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read range definitions: {e}"),
            Self::Format(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RangeLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(e) => Some(e),
        }
    }
}

impl From<io::Error> for RangeLoadError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<FormatError> for RangeLoadError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

/// A structural problem found by [`RangeTable::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// A range has `lower > upper`.
    Inverted(CodePointRange),
    /// Two ranges share code points.
    Overlap {
        /// The earlier range in table order.
        first: CodePointRange,
        /// The range that starts inside `first`.
        second: CodePointRange,
    },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverted(range) => write!(f, "inverted range {range}"),
            Self::Overlap { first, second } => {
                write!(f, "range {first} overlaps range {second}")
            }
        }
    }
}

impl std::error::Error for RangeError {}

/// An ordered set of code point ranges, sorted ascending by `lower`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeTable {
    ranges: Vec<CodePointRange>,
}

impl RangeTable {
    /// Build a table from arbitrary ranges.
    ///
    /// Ranges are stably sorted by their lower bound. Overlaps are kept; use
    /// [`validate`](Self::validate) to reject them.
    #[must_use]
    pub fn new(ranges: impl IntoIterator<Item = CodePointRange>) -> Self {
        let mut ranges: Vec<CodePointRange> = ranges.into_iter().collect();
        ranges.sort_by_key(|r| r.lower);
        Self { ranges }
    }

    /// Parse range-definition text.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] for the first non-blank, non-comment line that
    /// does not match the expected shape.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut ranges = Vec::new();
        for (idx, raw) in text.split('\n').enumerate() {
            let line = raw.trim_matches(|c: char| c <= ' ');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let range = parse_line(line).map_err(|kind| FormatError {
                line: idx + 1,
                content: line.to_string(),
                kind,
            })?;
            ranges.push(range);
        }
        let table = Self::new(ranges);
        tracing::debug!(ranges = table.len(), "parsed range definitions");
        Ok(table)
    }

    /// Read and parse a range-definition file.
    ///
    /// # Errors
    ///
    /// Returns [`RangeLoadError::Io`] if the file cannot be read and
    /// [`RangeLoadError::Format`] if its content is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RangeLoadError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading range definitions");
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    /// Look up a range set bundled with the crate.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        BUILTIN_RANGES
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, text)| Self::parse(text).ok())
    }

    /// Names accepted by [`builtin`](Self::builtin).
    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN_RANGES.iter().map(|(n, _)| *n)
    }

    /// The ranges in sorted order.
    #[must_use]
    pub fn as_slice(&self) -> &[CodePointRange] {
        &self.ranges
    }

    /// Iterate over the ranges in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, CodePointRange> {
        self.ranges.iter()
    }

    /// Number of ranges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if the table has no ranges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// First inverted range, if any.
    #[must_use]
    pub fn first_inverted(&self) -> Option<&CodePointRange> {
        self.ranges.iter().find(|r| r.is_empty())
    }

    /// Total number of code points covered, counting overlaps twice.
    #[must_use]
    pub fn total_len(&self) -> u64 {
        self.ranges.iter().map(CodePointRange::len).sum()
    }

    /// Find the range containing `code_point`, if any.
    #[must_use]
    pub fn find(&self, code_point: u32) -> Option<&CodePointRange> {
        self.ranges.iter().find(|r| r.contains(code_point))
    }

    /// Check that no range is inverted and no two ranges overlap.
    ///
    /// Adjacent ranges (`a.upper + 1 == b.lower`) are legal.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in table order.
    pub fn validate(&self) -> Result<(), RangeError> {
        if let Some(r) = self.first_inverted() {
            return Err(RangeError::Inverted(*r));
        }
        for pair in self.ranges.windows(2) {
            if pair[0].upper >= pair[1].lower {
                return Err(RangeError::Overlap {
                    first: pair[0],
                    second: pair[1],
                });
            }
        }
        Ok(())
    }

    /// Convenience for `validate().is_ok()`.
    #[must_use]
    pub fn is_disjoint(&self) -> bool {
        self.validate().is_ok()
    }
}

impl<'a> IntoIterator for &'a RangeTable {
    type Item = &'a CodePointRange;
    type IntoIter = std::slice::Iter<'a, CodePointRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl FromIterator<CodePointRange> for RangeTable {
    fn from_iter<I: IntoIterator<Item = CodePointRange>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Match one trimmed line: token, space, any separator, space, token, three spaces.
fn parse_line(line: &str) -> Result<CodePointRange, FormatErrorKind> {
    let (lower, rest) = line.split_once(' ').ok_or(FormatErrorKind::Shape)?;
    if lower.is_empty() {
        return Err(FormatErrorKind::Shape);
    }

    let mut chars = rest.chars();
    chars.next().ok_or(FormatErrorKind::Shape)?;
    let rest = chars
        .as_str()
        .strip_prefix(' ')
        .ok_or(FormatErrorKind::Shape)?;

    let end = rest.find(' ').unwrap_or(rest.len());
    let (upper, tail) = rest.split_at(end);
    if upper.is_empty() || !tail.starts_with("   ") {
        return Err(FormatErrorKind::Shape);
    }

    let lower = parse_bound(lower)?;
    let upper = parse_bound(upper)?;
    if lower > upper {
        return Err(FormatErrorKind::Inverted);
    }
    Ok(CodePointRange::new(lower, upper))
}

/// Hexadecimal bound that fits the signed 32-bit index field.
fn parse_bound(token: &str) -> Result<i32, FormatErrorKind> {
    u32::from_str_radix(token, 16)
        .ok()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or(FormatErrorKind::InvalidHex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_and_len() {
        let r = CodePointRange::new(0x41, 0x5A);
        assert_eq!(r.span(), 26);
        assert_eq!(r.len(), 26);
        assert!(!r.is_empty());

        let single = CodePointRange::new(7, 7);
        assert_eq!(single.len(), 1);

        let inverted = CodePointRange::new(10, 8);
        assert!(inverted.is_empty());
        assert_eq!(inverted.span(), -1);
        assert_eq!(inverted.len(), 0);
    }

    #[test]
    fn contains_is_inclusive() {
        let r = CodePointRange::new(0x41, 0x5A);
        assert!(r.contains(0x41));
        assert!(r.contains(0x5A));
        assert!(!r.contains(0x40));
        assert!(!r.contains(0x5B));
    }

    #[test]
    fn span_of_widest_range() {
        let r = CodePointRange::new(i32::MIN, i32::MAX);
        assert_eq!(r.span(), 1 << 32);
        assert_eq!(r.len(), 1 << 32);
    }

    #[test]
    fn negative_lower_bound_is_signed() {
        let r = CodePointRange::new(-16, 100);
        assert_eq!(r.span(), 117);
        assert!(r.contains(0));
        assert!(r.contains(100));
        assert!(!r.contains(101));
        // Code points beyond i32::MAX never fall inside a signed range.
        assert!(!CodePointRange::new(-1, i32::MAX).contains(u32::MAX));
    }

    #[test]
    fn overlaps() {
        let a = CodePointRange::new(0, 10);
        assert!(a.overlaps(&CodePointRange::new(10, 20)));
        assert!(!a.overlaps(&CodePointRange::new(11, 20)));
        assert!(!a.overlaps(&CodePointRange::new(5, 4)));
    }

    #[test]
    fn display_uses_unicode_notation() {
        assert_eq!(CodePointRange::new(0x41, 0x1F600).to_string(), "U+0041..U+1F600");
        assert_eq!(CodePointRange::new(-16, 0x64).to_string(), "-16..U+0064");
    }

    #[test]
    fn parse_skips_blank_and_comment_lines() {
        let text = "# header\n\n0000 . 007F   Basic Latin\n   \n# trailing\n";
        let table = RangeTable::parse(text).unwrap();
        assert_eq!(table.as_slice(), &[CodePointRange::new(0, 0x7F)]);
    }

    #[test]
    fn parse_sorts_by_lower() {
        let text = "1E00 . 1EFF   Latin Extended Additional\n\
                    0080 . 00FF   Latin-1 Supplement\n\
                    0000 . 007F   Basic Latin\n";
        let table = RangeTable::parse(text).unwrap();
        let lowers: Vec<i32> = table.iter().map(|r| r.lower).collect();
        assert_eq!(lowers, vec![0x0000, 0x0080, 0x1E00]);
    }

    #[test]
    fn sort_is_stable_for_equal_lower_bounds() {
        let table = RangeTable::new([
            CodePointRange::new(5, 9),
            CodePointRange::new(0, 1),
            CodePointRange::new(5, 6),
        ]);
        assert_eq!(
            table.as_slice(),
            &[
                CodePointRange::new(0, 1),
                CodePointRange::new(5, 9),
                CodePointRange::new(5, 6),
            ]
        );
    }

    #[test]
    fn parse_accepts_any_separator_character() {
        let table = RangeTable::parse("0041 - 005A   dash\n0061 ~ 007A   tilde\n").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn parse_accepts_lowercase_hex_and_crlf() {
        let table = RangeTable::parse("00e0 . 00ff   lower\r\n").unwrap();
        assert_eq!(table.as_slice(), &[CodePointRange::new(0xE0, 0xFF)]);
    }

    #[test]
    fn parse_requires_three_spaces_after_upper() {
        let err = RangeTable::parse("0000 . 007F  Basic Latin\n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Shape);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn parse_rejects_line_without_label() {
        // Trailing spaces are trimmed, so a bare range has no three-space tail.
        let err = RangeTable::parse("0000 . 007F   \n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Shape);
    }

    #[test]
    fn parse_rejects_missing_separator() {
        let err = RangeTable::parse("0000 007F   x\n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Shape);
    }

    #[test]
    fn parse_reports_invalid_hex() {
        let err = RangeTable::parse("0000 . 007F   ok\nzzzz . 00FF   bad\n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidHex);
        assert_eq!(err.line, 2);
        assert_eq!(err.content, "zzzz . 00FF   bad");
    }

    #[test]
    fn parse_rejects_bounds_beyond_signed_field() {
        let err = RangeTable::parse("7FFFFFFF . 80000000   too wide\n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidHex);
        let err = RangeTable::parse("-10 . 0010   negative\n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::InvalidHex);
    }

    #[test]
    fn sort_uses_signed_lower_bounds() {
        let table = RangeTable::new([CodePointRange::new(0x20, 0x21), CodePointRange::new(-4, -1)]);
        assert_eq!(table.as_slice()[0], CodePointRange::new(-4, -1));
    }

    #[test]
    fn parse_rejects_inverted_bounds() {
        let err = RangeTable::parse("00FF . 0080   backwards\n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Inverted);
    }

    #[test]
    fn parse_aborts_without_partial_table() {
        let text = "0000 . 007F   ok\nnot a range\n0080 . 00FF   ok\n";
        assert!(RangeTable::parse(text).is_err());
    }

    #[test]
    fn format_error_display() {
        let err = RangeTable::parse("garbage\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 1"), "{msg}");
        assert!(msg.contains("garbage"), "{msg}");
    }

    #[test]
    fn builtin_short_is_valid() {
        let table = RangeTable::builtin("short").expect("bundled table parses");
        assert!(!table.is_empty());
        assert_eq!(table.validate(), Ok(()));
        assert!(table.find(u32::from('A')).is_some());
        assert!(table.find(0x1E00).is_some());
        assert!(table.find(0x4E2D).is_none());
    }

    #[test]
    fn builtin_unknown_name() {
        assert!(RangeTable::builtin("nope").is_none());
        assert!(RangeTable::builtin_names().any(|n| n == "short"));
    }

    #[test]
    fn validate_accepts_adjacent_ranges() {
        let table = RangeTable::new([CodePointRange::new(0, 9), CodePointRange::new(10, 19)]);
        assert!(table.is_disjoint());
    }

    #[test]
    fn validate_reports_overlap() {
        let table = RangeTable::new([CodePointRange::new(0, 10), CodePointRange::new(10, 19)]);
        assert_eq!(
            table.validate(),
            Err(RangeError::Overlap {
                first: CodePointRange::new(0, 10),
                second: CodePointRange::new(10, 19),
            })
        );
    }

    #[test]
    fn validate_reports_inverted() {
        let table = RangeTable::new([CodePointRange::new(3, 1)]);
        assert_eq!(table.first_inverted(), Some(&CodePointRange::new(3, 1)));
        assert_eq!(
            table.validate(),
            Err(RangeError::Inverted(CodePointRange::new(3, 1)))
        );
    }

    #[test]
    fn total_len_sums_ranges() {
        let table = RangeTable::new([CodePointRange::new(0, 9), CodePointRange::new(20, 24)]);
        assert_eq!(table.total_len(), 15);
        assert_eq!(RangeTable::default().total_len(), 0);
    }

    #[test]
    #[tracing_test::traced_test]
    fn parse_logs_range_count() {
        RangeTable::parse("0000 . 007F   Basic Latin\n").unwrap();
        assert!(logs_contain("parsed range definitions"));
        assert!(logs_contain("ranges=1"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = RangeTable::load("/nonexistent/ranges.txt").unwrap_err();
        assert!(matches!(err, RangeLoadError::Io(_)));
    }
}
