//! # Redaction and Formatting Policy
//!
//! Pure, stateless helpers applied by [`crate::TracingLogger`] to every message
//! before it is handed to a destination. None of these functions allocate
//! unless they actually change their input.
//!
//! ## Pipeline
//!
//! For a query-completion event the logger applies, in order:
//!
//! 1. [`classify`] the event from its error and elapsed time
//! 2. [`contains_banned`] over the full SQL text, replacing it with
//!    [`REDACTED_PLACEHOLDER`] on a match
//! 3. [`truncate`] the surviving SQL
//! 4. [`format_latency`] when latency logging is enabled
//! 5. [`colorize`] when colored output is enabled
//!
//! The keyword scan runs before truncation so that a banned keyword sitting
//! past the truncation point still redacts the statement.

use std::borrow::Cow;
use std::error::Error;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Body substituted for any message that matched a banned keyword.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED: query contains a banned keyword]";

/// Appended to text cut by [`truncate`].
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Annotation placed in front of statements that crossed the slow threshold.
pub const SLOW_QUERY_TAG: &str = "SLOW QUERY";

/// ANSI escape sequences used for colored output.
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

/// A rule for scanning outgoing messages.
///
/// When `case_sensitive` is false the keyword matches regardless of case, so
/// `"password"` also catches `"PASSWORD"` and `"Password"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannedKeyword {
    /// The watched substring, for example `"password"`.
    pub keyword: String,
    /// If true the keyword must match the message byte for byte.
    #[serde(default)]
    pub case_sensitive: bool,
}

impl BannedKeyword {
    /// Rule that matches regardless of case.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            case_sensitive: false,
        }
    }

    /// Rule that only matches the exact casing given.
    pub fn case_sensitive(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            case_sensitive: true,
        }
    }

    /// Check whether this rule matches `text`.
    ///
    /// An empty keyword never matches; it would otherwise redact everything.
    pub fn matches(&self, text: &str) -> bool {
        if self.keyword.is_empty() {
            return false;
        }
        if self.case_sensitive {
            text.contains(self.keyword.as_str())
        } else {
            text.to_lowercase()
                .contains(self.keyword.to_lowercase().as_str())
        }
    }
}

/// Severity bucket assigned to a single log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Info,
    /// Plain warnings and slow queries.
    Warn,
    Error,
}

impl Category {
    /// ANSI color used for this category when colored output is on.
    pub fn color(self) -> &'static str {
        match self {
            Category::Info => ansi::GREEN,
            Category::Warn => ansi::YELLOW,
            Category::Error => ansi::RED,
        }
    }
}

/// Cut `text` to at most `max_len` characters and append [`TRUNCATION_MARKER`].
///
/// Returns the input unchanged when `max_len` is zero or the text already fits.
/// Lengths are counted in characters, so multi-byte UTF-8 is never split.
pub fn truncate(text: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed(text);
    }
    match text.char_indices().nth(max_len) {
        Some((byte_idx, _)) => {
            let mut cut = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            cut.push_str(&text[..byte_idx]);
            cut.push_str(TRUNCATION_MARKER);
            Cow::Owned(cut)
        }
        None => Cow::Borrowed(text),
    }
}

/// True if any rule in `rules` matches `text`.
pub fn contains_banned(text: &str, rules: &[BannedKeyword]) -> bool {
    rules.iter().any(|rule| rule.matches(text))
}

/// Wrap `text` in the ANSI color pair of `category` when `enabled`.
pub fn colorize(text: &str, category: Category, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(text);
    }
    Cow::Owned(format!("{}{}{}", category.color(), text, ansi::RESET))
}

/// Three-way classification of a finished query.
///
/// An error always wins. Otherwise the query is slow when `threshold` is
/// non-zero and `elapsed` reached it. A zero threshold disables the check.
pub fn classify(
    err: Option<&(dyn Error + 'static)>,
    elapsed: Duration,
    threshold: Duration,
) -> Category {
    if err.is_some() {
        Category::Error
    } else if !threshold.is_zero() && elapsed >= threshold {
        Category::Warn
    } else {
        Category::Info
    }
}

/// Format a duration with the most readable unit, e.g. `"1.50ms"`.
pub fn format_latency(duration: Duration) -> String {
    let total_ns = duration.as_nanos();

    if total_ns < 1_000 {
        format!("{}ns", total_ns)
    } else if total_ns < 1_000_000 {
        format!("{:.2}μs", total_ns as f64 / 1_000.0)
    } else if total_ns < 1_000_000_000 {
        format!("{:.2}ms", total_ns as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", total_ns as f64 / 1_000_000_000.0)
    }
}
