#![forbid(unsafe_code)]

//! The width source chosen at startup.

use std::fmt;
use std::sync::Arc;

use fontmetrics_core::{RangeTable, WidthSource, clamp_width};
use fontmetrics_index::{DecodeError, DecodeOptions, EncodeError, WidthIndex};

use crate::config::{ConfigError, MetricsConfig, Strategy};

/// A host-provided rasterizer, shareable across threads.
pub type SharedSource = Arc<dyn WidthSource + Send + Sync>;

/// Which kind of source answers queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The host's font rasterizer.
    Rasterizer,
    /// A decoded [`WidthIndex`].
    Index,
}

/// Failure to resolve a width source.
#[derive(Debug)]
pub enum MetricsError {
    /// [`Strategy::Rasterizer`] was requested but the host supplied none.
    NoRasterizer,
    /// An index was needed but neither a path nor bundled bytes are configured.
    NoIndexPath,
    /// The index could not be loaded or decoded.
    Index(DecodeError),
    /// The environment held an invalid value.
    Config(ConfigError),
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRasterizer => {
                write!(f, "rasterizer strategy requested but none is available")
            }
            Self::NoIndexPath => write!(f, "no width index configured"),
            Self::Index(e) => write!(f, "width index unavailable: {e}"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MetricsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Index(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::NoRasterizer | Self::NoIndexPath => None,
        }
    }
}

impl From<DecodeError> for MetricsError {
    fn from(value: DecodeError) -> Self {
        Self::Index(value)
    }
}

impl From<ConfigError> for MetricsError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

#[derive(Clone)]
enum Inner {
    Rasterizer(SharedSource),
    Index(Arc<WidthIndex>),
}

/// Width queries against the source selected at startup.
///
/// Cheap to clone and safe to share; pass it to whatever needs widths.
///
/// # Example
/// ```
/// use fontmetrics::{Backend, FontMetrics};
/// use fontmetrics_core::{CodePointRange, RangeTable, from_fn};
/// use fontmetrics_index::WidthIndex;
///
/// let table = RangeTable::new([CodePointRange::new(0, 127)]);
/// let metrics = FontMetrics::from_index(WidthIndex::build(&table, &from_fn(|_| 70)).unwrap());
/// assert_eq!(metrics.backend(), Backend::Index);
/// assert_eq!(metrics.text_width("Hi"), 140);
/// ```
#[derive(Clone)]
pub struct FontMetrics {
    inner: Inner,
}

impl FontMetrics {
    /// Resolve the width source described by `config`.
    ///
    /// `rasterizer` is the host's font rasterizer, if it has one.
    /// [`Strategy::Auto`] uses it when present and otherwise loads the index.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if the requested source is unavailable.
    pub fn resolve(
        config: &MetricsConfig,
        rasterizer: Option<SharedSource>,
    ) -> Result<Self, MetricsError> {
        match (config.strategy, rasterizer) {
            (Strategy::Rasterizer | Strategy::Auto, Some(source)) => {
                tracing::info!(strategy = %config.strategy, "using rasterizer widths");
                Ok(Self::from_rasterizer(source))
            }
            (Strategy::Rasterizer, None) => Err(MetricsError::NoRasterizer),
            (Strategy::Auto, None) => {
                tracing::warn!("rasterizer not available; falling back to width index");
                Self::load_index(config)
            }
            (Strategy::Index, _) => Self::load_index(config),
        }
    }

    /// Read [`MetricsConfig::from_env`] and [`resolve`](Self::resolve) it.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Config`] for bad environment values, otherwise
    /// as [`resolve`](Self::resolve).
    pub fn from_env(rasterizer: Option<SharedSource>) -> Result<Self, MetricsError> {
        let config = MetricsConfig::from_env()?;
        Self::resolve(&config, rasterizer)
    }

    fn load_index(config: &MetricsConfig) -> Result<Self, MetricsError> {
        let options = DecodeOptions {
            strict: config.strict_decode,
        };
        let index = match (&config.index_path, config.index_bytes) {
            (Some(path), _) => {
                let index = WidthIndex::load_with(path, options).inspect_err(|e| {
                    tracing::error!(path = %path.display(), error = %e, "width index not available");
                })?;
                tracing::info!(
                    path = %path.display(),
                    ranges = index.range_count(),
                    "using width index"
                );
                index
            }
            (None, Some(bytes)) => {
                let index = WidthIndex::from_bytes_with(bytes, options).inspect_err(|e| {
                    tracing::error!(error = %e, "bundled width index not available");
                })?;
                tracing::info!(
                    bytes = bytes.len(),
                    ranges = index.range_count(),
                    "using bundled width index"
                );
                index
            }
            (None, None) => return Err(MetricsError::NoIndexPath),
        };
        Ok(Self::from_index(index.with_fallback_width(config.fallback_width)))
    }

    /// Measure with a host rasterizer.
    #[must_use]
    pub fn from_rasterizer(source: SharedSource) -> Self {
        Self {
            inner: Inner::Rasterizer(source),
        }
    }

    /// Measure with a decoded width index.
    #[must_use]
    pub fn from_index(index: WidthIndex) -> Self {
        Self {
            inner: Inner::Index(Arc::new(index)),
        }
    }

    /// Which source answers queries.
    #[must_use]
    pub fn backend(&self) -> Backend {
        match self.inner {
            Inner::Rasterizer(_) => Backend::Rasterizer,
            Inner::Index(_) => Backend::Index,
        }
    }

    /// The index, when the index backend is active.
    #[must_use]
    pub fn index(&self) -> Option<&WidthIndex> {
        match &self.inner {
            Inner::Index(index) => Some(index),
            Inner::Rasterizer(_) => None,
        }
    }

    /// Width of a single code point.
    ///
    /// Rasterizer widths are clamped to `[0, 127]`; index widths are returned
    /// as stored.
    #[must_use]
    pub fn width_of(&self, code_point: u32) -> i8 {
        match &self.inner {
            Inner::Rasterizer(source) => clamp_width(source.char_width(code_point)),
            Inner::Index(index) => index.width_of(code_point),
        }
    }

    /// Width of `text`.
    #[must_use]
    pub fn text_width(&self, text: &str) -> i64 {
        match &self.inner {
            Inner::Rasterizer(source) => source.text_width(text),
            Inner::Index(index) => index.text_width(text),
        }
    }

    /// Build a width index for `table` from the active source.
    ///
    /// # Errors
    ///
    /// See [`WidthIndex::build`].
    pub fn export(&self, table: &RangeTable) -> Result<WidthIndex, EncodeError> {
        match &self.inner {
            Inner::Rasterizer(source) => WidthIndex::build(table, source),
            Inner::Index(index) => WidthIndex::build(table, &**index),
        }
    }
}

impl WidthSource for FontMetrics {
    fn char_width(&self, code_point: u32) -> i32 {
        match &self.inner {
            Inner::Rasterizer(source) => source.char_width(code_point),
            Inner::Index(index) => i32::from(index.width_of(code_point)),
        }
    }

    fn text_width(&self, text: &str) -> i64 {
        FontMetrics::text_width(self, text)
    }
}

impl fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("FontMetrics");
        s.field("backend", &self.backend());
        if let Inner::Index(index) = &self.inner {
            s.field("ranges", &index.range_count())
                .field("widths", &index.width_count());
        }
        s.finish()
    }
}
