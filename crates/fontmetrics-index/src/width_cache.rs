#![forbid(unsafe_code)]

//! LRU cache of text widths.
//!
//! Measuring a string walks every code point through the width source.
//! Callers that measure the same labels repeatedly (badge renderers, table
//! layouts) can keep a [`WidthCache`] next to their source.
//!
//! # Example
//! ```
//! use fontmetrics_core::{CodePointRange, RangeTable, from_fn};
//! use fontmetrics_index::{WidthCache, WidthIndex};
//!
//! let table = RangeTable::new([CodePointRange::new(0, 127)]);
//! let index = WidthIndex::build(&table, &from_fn(|_| 70)).unwrap();
//! let mut cache = WidthCache::new(128);
//!
//! assert_eq!(cache.get_or_compute(&index, "build"), 350);
//! assert_eq!(cache.get_or_compute(&index, "build"), 350);
//!
//! assert_eq!((cache.stats().hits, cache.stats().misses), (1, 1));
//! ```

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use fontmetrics_core::WidthSource;
use lru::LruCache;
use rustc_hash::FxHasher;

/// Default cache capacity.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to measure the text.
    pub misses: u64,
    /// Current number of entries.
    pub size: usize,
    /// Maximum number of entries.
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate in `[0.0, 1.0]`; zero before any lookup.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }
}

/// LRU cache mapping text to its measured width.
///
/// Keys are 64-bit FxHash values of the text rather than the text itself.
/// Widths depend on the source, so use one cache per source.
///
/// Not thread-safe; wrap in a mutex or keep one per thread.
#[derive(Debug)]
pub struct WidthCache {
    entries: LruCache<u64, i64>,
    hits: u64,
    misses: u64,
}

impl WidthCache {
    /// Create a cache holding up to `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(non_zero(capacity)),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached width of `text`, measuring it with `source` on a miss.
    pub fn get_or_compute<S>(&mut self, source: &S, text: &str) -> i64
    where
        S: WidthSource + ?Sized,
    {
        self.get_or_compute_with(text, |t| source.text_width(t))
    }

    /// Cached width of `text`, measuring it with `compute` on a miss.
    pub fn get_or_compute_with<F>(&mut self, text: &str, compute: F) -> i64
    where
        F: FnOnce(&str) -> i64,
    {
        let key = hash_text(text);
        if let Some(&cached) = self.entries.get(&key) {
            self.hits += 1;
            return cached;
        }
        self.misses += 1;
        let measured = compute(text);
        self.entries.put(key, measured);
        measured
    }

    /// True if a width for `text` is cached.
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(&hash_text(text))
    }

    /// Cached width without measuring or touching LRU order.
    #[must_use]
    pub fn peek(&self, text: &str) -> Option<i64> {
        self.entries.peek(&hash_text(text)).copied()
    }

    /// Drop every entry; statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Zero the hit and miss counters.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    /// Snapshot of the counters and occupancy.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.len(),
            capacity: self.capacity(),
        }
    }

    /// Number of cached widths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Change the capacity, evicting least recently used entries if needed.
    pub fn resize(&mut self, capacity: usize) {
        self.entries.resize(non_zero(capacity));
    }
}

impl Default for WidthCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

#[inline]
fn hash_text(text: &str) -> u64 {
    let mut h = FxHasher::default();
    text.hash(&mut h);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmetrics_core::from_fn;

    /// 10px per code point.
    fn monospace() -> impl WidthSource {
        from_fn(|_| 10)
    }

    #[test]
    fn starts_empty_with_requested_capacity() {
        let labels = WidthCache::new(64);
        assert_eq!((labels.len(), labels.capacity()), (0, 64));
        assert_eq!(WidthCache::default().capacity(), DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn capacity_is_never_zero() {
        let mut labels = WidthCache::new(0);
        assert_eq!(labels.capacity(), 1);
        labels.resize(0);
        assert_eq!(labels.capacity(), 1);
    }

    #[test]
    fn second_measure_is_a_hit() {
        let font = monospace();
        let mut labels = WidthCache::new(64);

        assert_eq!(labels.get_or_compute(&font, "passing"), 70);
        assert_eq!(labels.get_or_compute(&font, "passing"), 70);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.stats(), CacheStats {
            hits: 1,
            misses: 1,
            size: 1,
            capacity: 64,
        });
        assert!((labels.stats().hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn measures_once_per_label() {
        let mut labels = WidthCache::new(8);
        let mut measured = Vec::new();
        for label in ["build", "build", "coverage", "build"] {
            labels.get_or_compute_with(label, |t| {
                measured.push(t.to_string());
                t.chars().count() as i64 * 7
            });
        }
        assert_eq!(measured, ["build", "coverage"]);
        assert_eq!(labels.peek("coverage"), Some(56));
    }

    #[test]
    fn least_recent_label_is_evicted() {
        let font = monospace();
        let mut labels = WidthCache::new(2);

        labels.get_or_compute(&font, "build");
        labels.get_or_compute(&font, "docs");
        labels.get_or_compute(&font, "build");
        labels.get_or_compute(&font, "license");

        assert!(labels.contains("build"));
        assert!(!labels.contains("docs"));
        assert_eq!(labels.peek("license"), Some(70));
    }

    #[test]
    fn peek_leaves_recency_alone() {
        let font = monospace();
        let mut labels = WidthCache::new(2);

        labels.get_or_compute(&font, "build");
        labels.get_or_compute(&font, "docs");
        assert_eq!(labels.peek("build"), Some(50));
        labels.get_or_compute(&font, "license");

        assert_eq!(labels.peek("build"), None);
        assert_eq!(labels.stats().hits, 0);
    }

    #[test]
    fn clear_keeps_stats_until_reset() {
        let font = monospace();
        let mut labels = WidthCache::new(16);
        labels.get_or_compute(&font, "npm");
        labels.get_or_compute(&font, "npm");

        labels.clear();
        assert!(labels.is_empty());
        assert_eq!(labels.stats().hits, 1);

        labels.reset_stats();
        assert_eq!(labels.stats(), CacheStats {
            capacity: 16,
            ..CacheStats::default()
        });
    }

    #[test]
    fn shrinking_drops_older_entries() {
        let font = monospace();
        let mut labels = WidthCache::new(4);
        for label in ["a", "bb", "ccc", "dddd"] {
            labels.get_or_compute(&font, label);
        }
        labels.resize(2);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.peek("dddd"), Some(40));
        assert_eq!(labels.peek("a"), None);
    }

    #[test]
    fn no_lookups_means_zero_hit_rate() {
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
