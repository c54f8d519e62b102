#![forbid(unsafe_code)]

//! Width sources.
//!
//! A [`WidthSource`] reports the pixel width of a single code point in the
//! reference font. The host environment typically backs it with a font
//! rasterizer; a decoded width index is also a width source.

use std::sync::Arc;

/// Smallest width stored in an index.
pub const MIN_STORED_WIDTH: i8 = 0;
/// Largest width stored in an index.
pub const MAX_STORED_WIDTH: i8 = i8::MAX;

/// Code points below this value are measured as zero width.
pub const FIRST_PRINTABLE: u32 = 0x20;

/// Something that can measure code points in the reference font.
pub trait WidthSource {
    /// Width of a single code point, in pixels.
    ///
    /// Values outside `[0, 127]` are allowed here; the encoder clamps them.
    fn char_width(&self, code_point: u32) -> i32;

    /// Width of a whole string.
    ///
    /// The default sums [`char_width`](Self::char_width) over the code points
    /// of `text`. Rasterizers that apply their own string layout may
    /// override it.
    fn text_width(&self, text: &str) -> i64 {
        text.chars()
            .map(|c| i64::from(self.char_width(u32::from(c))))
            .sum()
    }
}

impl<T: WidthSource + ?Sized> WidthSource for &T {
    #[inline]
    fn char_width(&self, code_point: u32) -> i32 {
        (**self).char_width(code_point)
    }

    fn text_width(&self, text: &str) -> i64 {
        (**self).text_width(text)
    }
}

impl<T: WidthSource + ?Sized> WidthSource for Box<T> {
    #[inline]
    fn char_width(&self, code_point: u32) -> i32 {
        (**self).char_width(code_point)
    }

    fn text_width(&self, text: &str) -> i64 {
        (**self).text_width(text)
    }
}

impl<T: WidthSource + ?Sized> WidthSource for Arc<T> {
    #[inline]
    fn char_width(&self, code_point: u32) -> i32 {
        (**self).char_width(code_point)
    }

    fn text_width(&self, text: &str) -> i64 {
        (**self).text_width(text)
    }
}

/// A [`WidthSource`] backed by a closure. Created by [`from_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

impl<F> std::fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

impl<F> WidthSource for FromFn<F>
where
    F: Fn(u32) -> i32,
{
    #[inline]
    fn char_width(&self, code_point: u32) -> i32 {
        (self.0)(code_point)
    }
}

/// Wrap a `code point -> width` closure as a [`WidthSource`].
///
/// # Example
/// ```
/// use fontmetrics_core::{WidthSource, from_fn};
///
/// let mono = from_fn(|_| 60);
/// assert_eq!(mono.char_width(u32::from('x')), 60);
/// assert_eq!(mono.text_width("abc"), 180);
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(u32) -> i32,
{
    FromFn(f)
}

/// Clamp a raw width to the range an index can store.
#[inline]
#[must_use]
pub fn clamp_width(width: i32) -> i8 {
    // The clamp guarantees the value fits.
    width.clamp(i32::from(MIN_STORED_WIDTH), i32::from(MAX_STORED_WIDTH)) as i8
}

/// Width an index stores for `code_point`: zero for control characters,
/// otherwise the clamped source width.
#[inline]
pub fn stored_width<S: WidthSource + ?Sized>(source: &S, code_point: u32) -> i8 {
    if code_point < FIRST_PRINTABLE {
        0
    } else {
        clamp_width(source.char_width(code_point))
    }
}
