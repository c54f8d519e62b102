//! Property-based invariant tests for the width index.
//!
//! 1. Decoding an encoded index reproduces clamped source widths.
//! 2. Control characters are zero width regardless of table contents.
//! 3. Uncovered code points resolve to the fallback width.
//! 4. Text width is the sum of code point widths.
//! 5. Binary search and stored-order scan agree on disjoint ranges.
//! 6. Any strict prefix of a blob fails to decode.
//! 7. Tables reaching below zero still build, and their blobs decode strictly.

use fontmetrics_core::{CodePointRange, REFERENCE_FONT_SIZE, RangeTable, clamp_width, from_fn};
use fontmetrics_index::{DecodeError, DecodeOptions, SearchMode, WidthIndex, decode, encode};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Disjoint ranges: alternating gaps and runs starting at `start`.
fn disjoint_ranges_strategy() -> impl Strategy<Value = Vec<CodePointRange>> {
    (0i32..64, prop::collection::vec((0i32..40, 0i32..40), 0..12)).prop_map(|(start, parts)| {
        let mut next = start;
        let mut ranges = Vec::with_capacity(parts.len());
        for (gap, len) in parts {
            let lower = next + gap;
            let upper = lower + len;
            ranges.push(CodePointRange::new(lower, upper));
            next = upper + 1;
        }
        ranges
    })
}

/// Deterministic pseudo-rasterizer with out-of-range outputs.
fn raw_width(seed: i32, cp: u32) -> i32 {
    (cp as i32).wrapping_mul(31).wrapping_add(seed) % 300 - 50
}

fn covered(ranges: &[CodePointRange], cp: u32) -> bool {
    ranges.iter().any(|r| r.contains(cp))
}

fn raw_blob(ranges: &[CodePointRange], widths: &[i8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(ranges.len() as i32).to_be_bytes());
    for r in ranges {
        out.extend_from_slice(&r.lower.to_be_bytes());
        out.extend_from_slice(&r.upper.to_be_bytes());
    }
    out.extend_from_slice(&(widths.len() as i32).to_be_bytes());
    out.extend(widths.iter().map(|&w| w as u8));
    out
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn decode_encode_reproduces_source(ranges in disjoint_ranges_strategy(), seed in any::<i32>()) {
        let table = RangeTable::new(ranges.clone());
        let source = from_fn(|cp| raw_width(seed, cp));
        let index = decode(&encode(&table, &source).unwrap()).unwrap();

        for r in &ranges {
            for cp in (r.lower as u32)..=(r.upper as u32) {
                let expected = if cp < 32 { 0 } else { clamp_width(raw_width(seed, cp)) };
                prop_assert_eq!(index.width_of(cp), expected, "cp {:#x}", cp);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Control characters
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn control_characters_are_zero(ranges in disjoint_ranges_strategy(), fill in any::<i8>()) {
        let widths = vec![fill; RangeTable::new(ranges.clone()).total_len() as usize];
        let index = decode(&raw_blob(&ranges, &widths)).unwrap();
        for cp in 0..32 {
            prop_assert_eq!(index.width_of(cp), 0);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Fallback
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn uncovered_code_points_fall_back(ranges in disjoint_ranges_strategy(), cp in 32u32..1200) {
        let table = RangeTable::new(ranges.clone());
        let index = WidthIndex::build(&table, &from_fn(|_| 1)).unwrap();
        if !covered(&ranges, cp) {
            prop_assert_eq!(index.width_of(cp), REFERENCE_FONT_SIZE);
        } else {
            prop_assert_eq!(index.width_of(cp), 1);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Text additivity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn text_width_is_additive(text in "[ -~\u{a0}-\u{17f}\u{1f600}-\u{1f64f}]{0,40}") {
        let table = RangeTable::builtin("short").unwrap();
        let index = WidthIndex::build(&table, &from_fn(|cp| (cp % 90) as i32)).unwrap();

        let expected: i64 = text.chars().map(|c| i64::from(index.width_of(u32::from(c)))).sum();
        prop_assert_eq!(index.text_width(&text), expected);

        let units: Vec<u16> = text.encode_utf16().collect();
        prop_assert_eq!(index.text_width_utf16(&units), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Search strategies agree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn binary_and_linear_lookup_agree(ranges in disjoint_ranges_strategy(), seed in any::<i32>()) {
        let table = RangeTable::new(ranges.clone());
        let sorted = WidthIndex::build(&table, &from_fn(|cp| raw_width(seed, cp))).unwrap();
        prop_assert_eq!(sorted.search_mode(), SearchMode::Binary);

        // Same data with ranges stored in reverse order forces the scan.
        let mut reversed_ranges = ranges.clone();
        let mut reversed_widths = Vec::new();
        for r in ranges.iter().rev() {
            for cp in (r.lower as u32)..=(r.upper as u32) {
                reversed_widths.push(sorted.width_of(cp));
            }
        }
        reversed_ranges.reverse();
        let reversed = decode(&raw_blob(&reversed_ranges, &reversed_widths)).unwrap();
        if ranges.len() > 1 {
            prop_assert_eq!(reversed.search_mode(), SearchMode::Linear);
        }

        let limit = ranges.last().map_or(64, |r| r.upper + 8);
        for cp in 0..=(limit as u32) {
            prop_assert_eq!(sorted.width_of(cp), reversed.width_of(cp), "cp {:#x}", cp);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Truncation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_strict_prefix_is_truncated(ranges in disjoint_ranges_strategy(), cut in any::<prop::sample::Index>()) {
        let table = RangeTable::new(ranges);
        let blob = encode(&table, &from_fn(|_| 40)).unwrap();
        let len = cut.index(blob.len());
        let is_truncated = matches!(decode(&blob[..len]), Err(DecodeError::Truncated { .. }));
        prop_assert!(is_truncated, "prefix of {} / {} bytes decoded", len, blob.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Negative bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn negative_bounds_build_and_decode_strictly(
        ranges in disjoint_ranges_strategy(),
        shift in -80i32..0,
        seed in any::<i32>(),
    ) {
        let shifted: Vec<CodePointRange> = ranges
            .iter()
            .map(|r| CodePointRange::new(r.lower + shift, r.upper + shift))
            .collect();
        let table = RangeTable::new(shifted.clone());
        let index = WidthIndex::build(&table, &from_fn(|cp| raw_width(seed, cp))).unwrap();
        let back = WidthIndex::from_bytes_with(&index.to_bytes(), DecodeOptions::strict()).unwrap();
        prop_assert_eq!(&back, &index);

        let limit = shifted.last().map_or(0, |r| r.upper.max(0) as u32 + 4);
        for cp in 0..=limit {
            let expected = if cp < 32 {
                0
            } else if covered(&shifted, cp) {
                clamp_width(raw_width(seed, cp))
            } else {
                REFERENCE_FONT_SIZE
            };
            prop_assert_eq!(back.width_of(cp), expected, "cp {:#x}", cp);
        }
    }
}

#[test]
fn three_declared_ranges_with_two_present() {
    let mut blob = raw_blob(
        &[CodePointRange::new(0x20, 0x21), CodePointRange::new(0x30, 0x31)],
        &[1, 2, 3, 4],
    );
    blob[..4].copy_from_slice(&3i32.to_be_bytes());
    blob.truncate(4 + 2 * 8);
    assert!(matches!(decode(&blob), Err(DecodeError::Truncated { .. })));
}

#[test]
fn latin_boundaries() {
    let table = RangeTable::new([CodePointRange::new(0x41, 0x5A)]);
    let index = WidthIndex::build(&table, &from_fn(|cp| cp as i32 - 0x41 + 10)).unwrap();
    assert_eq!(index.width_of(0x41), 10);
    assert_eq!(index.width_of(0x5A), 35);
    assert_eq!(index.width_of(0x40), REFERENCE_FONT_SIZE);
    assert_eq!(index.width_of(0x5B), REFERENCE_FONT_SIZE);
}

#[test]
fn shared_across_threads() {
    let table = RangeTable::builtin("short").unwrap();
    let index = std::sync::Arc::new(WidthIndex::build(&table, &from_fn(|_| 60)).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = std::sync::Arc::clone(&index);
            std::thread::spawn(move || index.text_width("Hello World!"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 12 * 60);
    }
}
