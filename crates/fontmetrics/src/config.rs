#![forbid(unsafe_code)]

//! Startup configuration.
//!
//! [`MetricsConfig`] decides which width source backs a
//! [`FontMetrics`](crate::FontMetrics) handle. It is resolved once, usually
//! from the environment:
//!
//! | variable | meaning |
//! |----------|---------|
//! | `FONTMETRICS_STRATEGY` | `auto` (default), `rasterizer`, or `index` |
//! | `FONTMETRICS_INDEX` | path to a serialized width index |
//! | `FONTMETRICS_FALLBACK_WIDTH` | width for code points without an entry |
//! | `FONTMETRICS_STRICT` | `1`/`true`/`yes`/`on` to reject inconsistent index files, `0`/`false`/`no`/`off` (default) to accept them |
//!
//! Hosts that ship an index inside their binary can add it with
//! [`MetricsConfig::with_index_bytes`]; a configured path still takes
//! precedence.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use fontmetrics_core::REFERENCE_FONT_SIZE;

/// Selects the [`Strategy`].
pub const ENV_STRATEGY: &str = "FONTMETRICS_STRATEGY";
/// Path to a serialized width index.
pub const ENV_INDEX: &str = "FONTMETRICS_INDEX";
/// Width for code points the index has no entry for.
pub const ENV_FALLBACK_WIDTH: &str = "FONTMETRICS_FALLBACK_WIDTH";
/// Enables strict index decoding.
pub const ENV_STRICT: &str = "FONTMETRICS_STRICT";

/// Which width source to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Prefer the rasterizer, fall back to the index when none is available.
    #[default]
    Auto,
    /// Require the host rasterizer.
    Rasterizer,
    /// Require a serialized width index.
    Index,
}

impl Strategy {
    /// Canonical lowercase name, as accepted by `FONTMETRICS_STRATEGY`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Rasterizer => "rasterizer",
            Self::Index => "index",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "rasterizer" | "system" => Ok(Self::Rasterizer),
            "index" | "indexed" => Ok(Self::Index),
            _ => Err(ConfigError::InvalidStrategy(s.to_string())),
        }
    }
}

/// An environment value that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `FONTMETRICS_STRATEGY` is not a known strategy.
    InvalidStrategy(String),
    /// `FONTMETRICS_FALLBACK_WIDTH` is not an `i8`.
    InvalidFallbackWidth(String),
    /// `FONTMETRICS_STRICT` is not a boolean.
    InvalidStrict(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStrategy(v) => write!(
                f,
                "invalid {ENV_STRATEGY} {v:?} (expected auto, rasterizer, or index)"
            ),
            Self::InvalidFallbackWidth(v) => write!(
                f,
                "invalid {ENV_FALLBACK_WIDTH} {v:?} (expected an integer in -128..=127)"
            ),
            Self::InvalidStrict(v) => write!(
                f,
                "invalid {ENV_STRICT} {v:?} (expected 1, true, yes, on, 0, false, no, or off)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// How to obtain widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Which width source to use.
    pub strategy: Strategy,
    /// Serialized width index used by [`Strategy::Index`] and as the
    /// [`Strategy::Auto`] fallback.
    pub index_path: Option<PathBuf>,
    /// Index compiled into the host (e.g. with `include_bytes!`), used when
    /// no `index_path` is set.
    pub index_bytes: Option<&'static [u8]>,
    /// Width for code points the index has no entry for.
    pub fallback_width: i8,
    /// Reject index files whose width count disagrees with their ranges.
    pub strict_decode: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            index_path: None,
            index_bytes: None,
            fallback_width: REFERENCE_FONT_SIZE,
            strict_decode: false,
        }
    }
}

impl MetricsConfig {
    /// Defaults: [`Strategy::Auto`], no index, reference-size fallback, lenient decoding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the index file.
    #[must_use]
    pub fn with_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = Some(path.into());
        self
    }

    /// Use an index compiled into the host when no path is set.
    #[must_use]
    pub fn with_index_bytes(mut self, bytes: &'static [u8]) -> Self {
        self.index_bytes = Some(bytes);
        self
    }

    /// Set the width for code points without an entry.
    #[must_use]
    pub fn with_fallback_width(mut self, width: i8) -> Self {
        self.fallback_width = width;
        self
    }

    /// Reject index files whose width count disagrees with their ranges.
    #[must_use]
    pub fn with_strict_decode(mut self, strict: bool) -> Self {
        self.strict_decode = strict;
        self
    }

    /// Read the configuration from `FONTMETRICS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unparseable values. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_STRATEGY) {
            config.strategy = value.parse()?;
        }
        if let Some(path) = lookup(ENV_INDEX).filter(|p| !p.trim().is_empty()) {
            config.index_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup(ENV_FALLBACK_WIDTH) {
            config.fallback_width = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidFallbackWidth(value.clone()))?;
        }
        if let Some(value) = lookup(ENV_STRICT) {
            config.strict_decode =
                parse_flag(&value).ok_or(ConfigError::InvalidStrict(value))?;
        }

        tracing::debug!(
            strategy = %config.strategy,
            index = ?config.index_path,
            fallback_width = config.fallback_width,
            strict = config.strict_decode,
            "resolved metrics configuration"
        );
        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
