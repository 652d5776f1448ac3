//! # Logger Options
//!
//! Configuration for [`crate::TracingLogger`] expressed as a sequence of
//! [`LoggerOption`] values. Each constructor in this module captures a single
//! configuration value and, when applied, writes it into a fresh
//! [`QueryLogOptions`]. Options are applied in order, so when two options target
//! the same field the later one wins.
//!
//! ```rust
//! use std::time::Duration;
//! use tracing_querylog::options::*;
//! use tracing_querylog::{BannedKeyword, TracingLogger};
//!
//! let logger = TracingLogger::new([
//!     with_banned_keywords(vec![BannedKeyword::new("password")]),
//!     with_query_options(QueryOptions {
//!         slow_threshold: Duration::from_millis(200),
//!         log_level: LogLevel::Warn,
//!         truncate_len: 256,
//!         log_latency: true,
//!         colorful: false,
//!     }),
//! ]);
//! assert_eq!(logger.options().log_level, LogLevel::Warn);
//! ```
//!
//! No validation happens here. Values that make no sense (an empty keyword, a
//! zero threshold) only change what gets logged later.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{Dispatch, Span};

use crate::destination::Destination;
use crate::error::ConfigError;
use crate::policy::{BannedKeyword, Category};

/// Minimum severity that reaches the destination.
///
/// Levels are ordered by verbosity: `Silent < Error < Warn < Info`. A logger at
/// level `Warn` emits warnings and errors but drops info messages; `Silent`
/// drops everything.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silent,
    Error,
    Warn,
    Info,
}

impl LogLevel {
    /// Whether events of `category` pass this level.
    pub fn allows(self, category: Category) -> bool {
        let required = match category {
            Category::Error => LogLevel::Error,
            Category::Warn => LogLevel::Warn,
            Category::Info => LogLevel::Info,
        };
        self >= required
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        crate::defaults::LOG_LEVEL
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Silent => write!(f, "silent"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

/// Query-behaviour knobs that are always set together by [`with_query_options`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Queries at or above this duration are logged as slow. Zero disables.
    pub slow_threshold: Duration,
    pub log_level: LogLevel,
    /// Maximum SQL length in characters. Zero disables truncation.
    pub truncate_len: usize,
    /// Append the elapsed time to every query message.
    pub log_latency: bool,
    /// Wrap messages in ANSI colors matching their category.
    pub colorful: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            slow_threshold: crate::defaults::SLOW_THRESHOLD,
            log_level: LogLevel::default(),
            truncate_len: crate::defaults::TRUNCATE_LEN,
            log_latency: false,
            colorful: false,
        }
    }
}

/// The complete option set held by a [`crate::TracingLogger`].
#[derive(Debug, Clone, Default)]
pub struct QueryLogOptions {
    pub destination: Destination,
    /// Checked in order against every outgoing message.
    pub banned_keywords: Vec<BannedKeyword>,
    pub slow_threshold: Duration,
    pub log_level: LogLevel,
    pub truncate_len: usize,
    pub log_latency: bool,
    pub colorful: bool,
}

impl QueryLogOptions {
    /// Build an option set by applying `options` in order to the defaults.
    pub fn apply<I>(options: I) -> Self
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        let mut set = Self::default();
        for option in options {
            option.apply(&mut set);
        }
        set
    }

    /// The query-behaviour fields as a [`QueryOptions`] bundle.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            slow_threshold: self.slow_threshold,
            log_level: self.log_level,
            truncate_len: self.truncate_len,
            log_latency: self.log_latency,
            colorful: self.colorful,
        }
    }
}

/// An opaque configuration step produced by the `with_*` constructors.
pub struct LoggerOption {
    f: Box<dyn FnOnce(&mut QueryLogOptions) + Send>,
}

impl LoggerOption {
    fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut QueryLogOptions) + Send + 'static,
    {
        Self { f: Box::new(f) }
    }

    pub(crate) fn apply(self, options: &mut QueryLogOptions) {
        (self.f)(options)
    }
}

impl fmt::Debug for LoggerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerOption").finish_non_exhaustive()
    }
}

/// Log through `span`, the way a pre-populated log entry carries its fields.
///
/// Events become children of the span, so every field recorded on it shows up
/// alongside the query. A disabled span (for example `Span::none()`) is
/// accepted and events fall back to the caller's context span.
pub fn with_span(span: Span) -> LoggerOption {
    LoggerOption::new(move |o| o.destination = Destination::Span(span))
}

/// Log into a dedicated subscriber instead of the ambient one.
///
/// This option and [`with_span`] set the same destination; whichever is
/// applied last is used.
pub fn with_dispatch(dispatch: Dispatch) -> LoggerOption {
    LoggerOption::new(move |o| o.destination = Destination::Dispatch(dispatch))
}

/// Replace the banned keyword list. Lists are never merged.
pub fn with_banned_keywords(keywords: Vec<BannedKeyword>) -> LoggerOption {
    LoggerOption::new(move |o| o.banned_keywords = keywords)
}

/// Set threshold, level, truncation, latency and colors in one step.
pub fn with_query_options(query: QueryOptions) -> LoggerOption {
    LoggerOption::new(move |o| {
        o.slow_threshold = query.slow_threshold;
        o.log_level = query.log_level;
        o.truncate_len = query.truncate_len;
        o.log_latency = query.log_latency;
        o.colorful = query.colorful;
    })
}

pub fn with_log_level(level: LogLevel) -> LoggerOption {
    LoggerOption::new(move |o| o.log_level = level)
}

pub fn with_slow_threshold(threshold: Duration) -> LoggerOption {
    LoggerOption::new(move |o| o.slow_threshold = threshold)
}

pub fn with_truncate_len(len: usize) -> LoggerOption {
    LoggerOption::new(move |o| o.truncate_len = len)
}

pub fn with_latency(enabled: bool) -> LoggerOption {
    LoggerOption::new(move |o| o.log_latency = enabled)
}

pub fn with_colors(enabled: bool) -> LoggerOption {
    LoggerOption::new(move |o| o.colorful = enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = QueryLogOptions::apply(Vec::<LoggerOption>::new());
        assert!(matches!(options.destination, Destination::Console));
        assert!(options.banned_keywords.is_empty());
        assert_eq!(options.slow_threshold, Duration::ZERO);
        assert_eq!(options.log_level, LogLevel::Info);
        assert_eq!(options.truncate_len, 0);
        assert!(!options.log_latency);
        assert!(!options.colorful);
    }

    /// Two keyword lists in sequence: only the last survives
    #[test]
    fn test_banned_keywords_last_write_wins() {
        let options = QueryLogOptions::apply([
            with_banned_keywords(vec![BannedKeyword::new("password")]),
            with_banned_keywords(vec![BannedKeyword::case_sensitive("Token")]),
        ]);
        assert_eq!(
            options.banned_keywords,
            vec![BannedKeyword::case_sensitive("Token")]
        );
    }

    #[test]
    fn test_query_options_bundle_sets_every_field() {
        let bundle = QueryOptions {
            slow_threshold: Duration::from_millis(250),
            log_level: LogLevel::Error,
            truncate_len: 64,
            log_latency: true,
            colorful: true,
        };
        let options = QueryLogOptions::apply([with_query_options(bundle.clone())]);
        assert_eq!(options.query_options(), bundle);
    }

    #[test]
    fn test_single_field_option_after_bundle() {
        let options = QueryLogOptions::apply([
            with_query_options(QueryOptions {
                truncate_len: 64,
                ..QueryOptions::default()
            }),
            with_truncate_len(8),
            with_colors(true),
        ]);
        assert_eq!(options.truncate_len, 8);
        assert!(options.colorful);
    }

    #[test]
    fn test_destination_last_write_wins() {
        let dispatch = Dispatch::new(tracing_subscriber::registry());
        let options = QueryLogOptions::apply([with_dispatch(dispatch), with_span(Span::none())]);
        assert!(matches!(options.destination, Destination::Span(_)));

        let dispatch = Dispatch::new(tracing_subscriber::registry());
        let options = QueryLogOptions::apply([with_span(Span::none()), with_dispatch(dispatch)]);
        assert!(matches!(options.destination, Destination::Dispatch(_)));
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Info.allows(Category::Info));
        assert!(LogLevel::Info.allows(Category::Error));
        assert!(!LogLevel::Warn.allows(Category::Info));
        assert!(LogLevel::Warn.allows(Category::Warn));
        assert!(!LogLevel::Error.allows(Category::Warn));
        assert!(LogLevel::Error.allows(Category::Error));
        assert!(!LogLevel::Silent.allows(Category::Error));
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("off".parse::<LogLevel>().unwrap(), LogLevel::Silent);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
