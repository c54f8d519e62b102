#![forbid(unsafe_code)]

//! Core types for fontmetrics.
//!
//! - [`CodePointRange`] / [`RangeTable`] - the code point intervals a width
//!   index carries data for, plus the range-definition loader
//! - [`WidthSource`] - anything that can measure a code point in the
//!   reference font (a host rasterizer, or a decoded index)
//!
//! # Example
//! ```
//! use fontmetrics_core::{RangeTable, WidthSource, from_fn, stored_width};
//!
//! let table = RangeTable::builtin("short").unwrap();
//! assert!(table.find(u32::from('A')).is_some());
//!
//! let rasterizer = from_fn(|cp| if cp == u32::from('W') { 200 } else { 60 });
//! assert_eq!(stored_width(&rasterizer, u32::from('W')), 127);
//! assert_eq!(stored_width(&rasterizer, u32::from('\n')), 0);
//! ```

pub mod range;
pub mod source;

/// Family of the font the bundled widths were measured with.
pub const REFERENCE_FONT_NAME: &str = "Verdana";

/// Point size of the reference font.
///
/// Also the width reported for code points a width index has no entry for.
pub const REFERENCE_FONT_SIZE: i8 = 110;

pub use range::{
    CodePointRange, FormatError, FormatErrorKind, RangeError, RangeLoadError, RangeTable,
};
pub use source::{
    FIRST_PRINTABLE, FromFn, MAX_STORED_WIDTH, MIN_STORED_WIDTH, WidthSource, clamp_width, from_fn,
    stored_width,
};
