//! # Declarative Configuration
//!
//! [`QueryLogConfig`] describes the policy knobs of a [`crate::TracingLogger`]
//! in a form that can come from outside the program: command-line flags,
//! environment variables, or a JSON document. Destinations are runtime objects
//! and are never part of this struct; pass them as extra options.
//!
//! ## Command-line usage
//!
//! The struct derives [`clap::Args`], so a host application can flatten it into
//! its own parser:
//!
//! ```rust
//! use clap::Parser;
//! use tracing_querylog::config::QueryLogConfig;
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[clap(flatten)]
//!     sql: QueryLogConfig,
//! }
//!
//! let cli = Cli::parse_from(["app", "--sql-slow-threshold", "250ms", "--sql-banned-keyword", "password"]);
//! assert_eq!(cli.sql.slow_threshold.as_millis(), 250);
//! ```
//!
//! ## JSON usage
//!
//! ```rust
//! use tracing_querylog::config::QueryLogConfig;
//!
//! # fn main() -> Result<(), tracing_querylog::ConfigError> {
//! let config = QueryLogConfig::from_json(r#"{ "log_level": "warn", "slow_threshold": "1s" }"#)?;
//! assert_eq!(config.slow_threshold.as_secs(), 1);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;
use crate::options::{
    with_banned_keywords, with_query_options, LogLevel, LoggerOption, QueryOptions,
};
use crate::policy::BannedKeyword;

/// Policy configuration for query logging.
#[derive(Args, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLogConfig {
    /// Minimum level of query logs to emit
    #[clap(long = "sql-log-level", env = "SQL_LOG_LEVEL", value_enum, default_value_t = crate::defaults::LOG_LEVEL)]
    pub log_level: LogLevel,

    /// Log queries at or above this duration as slow (e.g. 200ms, 1s; 0 disables)
    #[clap(long = "sql-slow-threshold", env = "SQL_SLOW_THRESHOLD", value_parser = parse_duration, default_value = "0")]
    #[serde(
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub slow_threshold: Duration,

    /// Truncate SQL longer than this many characters (0 disables)
    #[clap(long = "sql-truncate-len", env = "SQL_TRUNCATE_LEN", default_value_t = crate::defaults::TRUNCATE_LEN)]
    pub truncate_len: usize,

    /// Append query latency to every query log
    #[clap(long = "sql-log-latency", env = "SQL_LOG_LATENCY", default_value_t = false)]
    pub log_latency: bool,

    /// Color query logs by severity
    #[clap(long = "sql-colorful", env = "SQL_COLORFUL", default_value_t = false)]
    pub colorful: bool,

    /// Redact queries containing this keyword, ignoring case (repeatable or comma separated)
    #[clap(long = "sql-banned-keyword", env = "SQL_BANNED_KEYWORD", value_name = "KEYWORD", value_delimiter = ',')]
    #[serde(skip)]
    pub banned: Vec<String>,

    /// Redact queries containing this exact keyword (repeatable or comma separated)
    #[clap(long = "sql-banned-keyword-exact", env = "SQL_BANNED_KEYWORD_EXACT", value_name = "KEYWORD", value_delimiter = ',')]
    #[serde(skip)]
    pub banned_exact: Vec<String>,

    /// Keyword rules as structured values (JSON only)
    #[clap(skip)]
    pub banned_keywords: Vec<BannedKeyword>,
}

impl Default for QueryLogConfig {
    fn default() -> Self {
        Self {
            log_level: crate::defaults::LOG_LEVEL,
            slow_threshold: crate::defaults::SLOW_THRESHOLD,
            truncate_len: crate::defaults::TRUNCATE_LEN,
            log_latency: false,
            colorful: false,
            banned: Vec::new(),
            banned_exact: Vec::new(),
            banned_keywords: Vec::new(),
        }
    }
}

impl QueryLogConfig {
    /// Parse a JSON document. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// All keyword rules, structured ones first, then flag-provided ones.
    pub fn keyword_rules(&self) -> Vec<BannedKeyword> {
        self.banned_keywords
            .iter()
            .cloned()
            .chain(self.banned.iter().map(BannedKeyword::new))
            .chain(self.banned_exact.iter().map(BannedKeyword::case_sensitive))
            .collect()
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            slow_threshold: self.slow_threshold,
            log_level: self.log_level,
            truncate_len: self.truncate_len,
            log_latency: self.log_latency,
            colorful: self.colorful,
        }
    }

    /// The options this configuration describes, ready for
    /// [`crate::TracingLogger::new`].
    pub fn into_options(self) -> Vec<LoggerOption> {
        vec![
            with_banned_keywords(self.keyword_rules()),
            with_query_options(self.query_options()),
        ]
    }
}

/// Parse a human duration such as `"250ms"`, `"1.5s"`, `"2m"` or `"1h"`.
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();

    if s.is_empty() {
        return Err(ConfigError::invalid_duration(s, "duration cannot be empty"));
    }

    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, "s")
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, "m")
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, "h")
    } else {
        (s, "s") // Default to seconds
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_duration(s, format!("invalid number '{}'", num_str)))?;
    if !num.is_finite() || num < 0.0 {
        return Err(ConfigError::invalid_duration(s, "must be a non-negative number"));
    }

    let unit_ns = match unit {
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60e9,
        "h" => 3_600e9,
        _ => return Err(ConfigError::invalid_duration(s, "unknown unit")),
    };
    Ok(Duration::from_nanos((num * unit_ns).round() as u64))
}

/// Milliseconds with as many fractional digits as the value needs, so the
/// text parses back to the same nanosecond count.
fn serialize_duration<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let nanos = d.as_nanos();
    let (millis, frac) = (nanos / 1_000_000, nanos % 1_000_000);
    let text = if frac == 0 {
        format!("{}ms", millis)
    } else {
        let digits = format!("{:06}", frac);
        format!("{}.{}ms", millis, digits.trim_end_matches('0'))
    };
    serializer.serialize_str(&text)
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Millis(ms) => Ok(Duration::from_millis(ms)),
        Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}
