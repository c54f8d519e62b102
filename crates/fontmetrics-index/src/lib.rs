#![forbid(unsafe_code)]

//! Compact binary width index.
//!
//! A [`WidthIndex`] answers "how wide is this code point in the reference
//! font?" from a precomputed table, with no rasterizer at query time.
//!
//! - [`WidthIndex::build`] measures a [`RangeTable`](fontmetrics_core::RangeTable)
//!   with any [`WidthSource`](fontmetrics_core::WidthSource)
//! - [`WidthIndex::to_bytes`] / [`WidthIndex::from_bytes`] convert to and
//!   from the binary layout described in [`codec`]
//! - [`WidthIndex::width_of`] / [`WidthIndex::text_width`] query it
//! - [`WidthCache`] memoizes text widths
//!
//! # Example
//! ```
//! use fontmetrics_core::{RangeTable, from_fn};
//! use fontmetrics_index::WidthIndex;
//!
//! // Offline: measure once and serialize.
//! let table = RangeTable::builtin("short").unwrap();
//! let rasterizer = from_fn(|cp| if cp == u32::from('i') { 30 } else { 68 });
//! let blob = WidthIndex::build(&table, &rasterizer).unwrap().to_bytes();
//!
//! // Runtime: decode and query.
//! let index = WidthIndex::from_bytes(&blob).unwrap();
//! assert_eq!(index.text_width("Hi"), 98);
//! ```

pub mod codec;
pub mod error;
pub mod index;
pub mod width_cache;

pub use codec::{DecodeOptions, decode, encode};
pub use error::{DecodeError, EncodeError, Section};
pub use index::{SearchMode, WidthIndex};
pub use width_cache::{CacheStats, DEFAULT_CACHE_CAPACITY, WidthCache};
