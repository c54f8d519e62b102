#![forbid(unsafe_code)]

//! Pixel widths of text in a fixed reference font.
//!
//! Widths come from one of two places:
//! - a rasterizer supplied by the host (any [`WidthSource`]), or
//! - a precomputed [`WidthIndex`] when no rasterizer is available.
//!
//! The choice is made once, at startup, from a [`MetricsConfig`], and the
//! resulting [`FontMetrics`] handle is passed to whatever needs widths.
//!
//! # Example
//! ```no_run
//! use fontmetrics::{FontMetrics, MetricsConfig, Strategy};
//!
//! let config = MetricsConfig::new()
//!     .with_strategy(Strategy::Index)
//!     .with_index_path("/usr/share/fontmetrics/verdana-110.bin");
//! let metrics = FontMetrics::resolve(&config, None)?;
//! println!("{}", metrics.text_width("Hello World!"));
//! # Ok::<(), fontmetrics::MetricsError>(())
//! ```

pub mod config;
pub mod metrics;

pub use config::{
    ConfigError, ENV_FALLBACK_WIDTH, ENV_INDEX, ENV_STRATEGY, ENV_STRICT, MetricsConfig, Strategy,
};
pub use metrics::{Backend, FontMetrics, MetricsError, SharedSource};

pub use fontmetrics_core::{
    CodePointRange, REFERENCE_FONT_NAME, REFERENCE_FONT_SIZE, RangeTable, WidthSource, from_fn,
};
pub use fontmetrics_index::{DecodeOptions, WidthCache, WidthIndex};
