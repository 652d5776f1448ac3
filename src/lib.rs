//! # tracing-querylog
//!
//! Route a database layer's query logs through [`tracing`] instead of a
//! hard-wired logger. The crate implements the usual query-logging callback
//! contract ([`QueryLogger`]: info, warn, error and a per-statement trace hook)
//! and turns each call into a structured `tracing` event.
//!
//! ## Features
//!
//! - **Redaction**: statements containing a banned keyword are replaced by a
//!   fixed placeholder before anything is written
//! - **Truncation**: long SQL is cut to a configurable number of characters
//! - **Slow queries**: statements at or above a threshold are logged at WARN
//!   with a `SLOW QUERY` annotation
//! - **Latency**: optional elapsed-time suffix on every query message
//! - **Colors**: optional ANSI coloring by severity
//! - **Level filtering**: `silent`, `error`, `warn` or `info`
//!
//! ## Architecture Overview
//!
//! - `options`: the option set and its `with_*` constructors
//! - `destination`: where events go (console, a span, or a dispatch)
//! - `policy`: pure redaction and formatting functions
//! - `logger`: the [`QueryLogger`] trait and the [`TracingLogger`] adapter
//! - `config`: CLI/env/JSON configuration that produces options
//! - `logging`: the console formatter
//!
//! ## Usage Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use tracing::Span;
//! use tracing_querylog::options::*;
//! use tracing_querylog::{BannedKeyword, QueryLogger, TracingLogger};
//!
//! let logger = TracingLogger::new([
//!     with_span(tracing::info_span!("db", system = "sqlite")),
//!     with_banned_keywords(vec![BannedKeyword::new("password")]),
//!     with_query_options(QueryOptions {
//!         slow_threshold: Duration::from_millis(100),
//!         log_level: LogLevel::Info,
//!         truncate_len: 200,
//!         log_latency: true,
//!         colorful: false,
//!     }),
//! ]);
//!
//! let begin = Instant::now();
//! // ... run the statement ...
//! logger.trace(&Span::current(), begin, &|| "SELECT * FROM users".to_string(), 3, None);
//! ```

/// The option set and its constructors
///
/// Options are opaque values applied in order to a default option set, so a
/// repeated option simply overrides the earlier one.
pub mod options;

/// Output destinations for formatted events
pub mod destination;

/// Pure redaction, truncation, classification and color helpers
pub mod policy;

/// The query-logging contract and its `tracing` implementation
pub mod logger;

/// Declarative configuration from CLI flags, environment variables and JSON
pub mod config;

/// Errors raised while reading configuration
pub mod error;

/// Console formatting for the fallback destination
pub mod logging;

pub use config::QueryLogConfig;
pub use destination::Destination;
pub use error::ConfigError;
pub use logger::{QueryLogger, TracingLogger};
pub use options::{LogLevel, LoggerOption, QueryLogOptions, QueryOptions};
pub use policy::{BannedKeyword, Category};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
///
/// A logger built without options logs every category to the console and
/// leaves messages untouched.
pub mod defaults {
    use std::time::Duration;

    use crate::options::LogLevel;

    /// `tracing` target of every event this crate emits.
    pub const TARGET: &str = "sql";

    /// Log everything. Level filtering in the host subscriber still applies.
    pub const LOG_LEVEL: LogLevel = LogLevel::Info;

    /// Slow-query detection is off until a threshold is configured.
    pub const SLOW_THRESHOLD: Duration = Duration::ZERO;

    /// No truncation.
    pub const TRUNCATE_LEN: usize = 0;
}
