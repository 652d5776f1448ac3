//! # Query Logger Adapter
//!
//! [`QueryLogger`] is the callback contract a database layer drives: three
//! leveled message hooks plus [`QueryLogger::trace`], called once per executed
//! statement. [`TracingLogger`] implements it on top of `tracing`.
//!
//! ## Trace pipeline
//!
//! For every completed statement the adapter:
//!
//! 1. Measures the elapsed time since `begin`
//! 2. Classifies the event as error, slow (warn) or info
//! 3. Returns early if the configured level drops that category, before the
//!    SQL text is ever produced
//! 4. Redacts the statement if it contains a banned keyword, otherwise
//!    truncates it
//! 5. Adds the slow-query annotation and the latency suffix
//! 6. Colors the message and writes it to the destination
//!
//! ## Concurrency
//!
//! The option set is shared behind an `Arc` and never mutated after
//! construction. Cloning a logger is cheap and clones may be used from any
//! number of threads without locking.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Span;

use crate::destination::EventRecord;
use crate::options::{LogLevel, LoggerOption, QueryLogOptions};
use crate::policy::{self, Category, REDACTED_PLACEHOLDER, SLOW_QUERY_TAG};

/// Logging hooks invoked by a query execution layer.
///
/// `ctx` is the span the query runs under, typically `Span::current()`.
pub trait QueryLogger: Send + Sync {
    /// A copy of this logger that filters at `level`.
    fn log_mode(&self, level: LogLevel) -> Box<dyn QueryLogger>;

    fn info(&self, ctx: &Span, args: fmt::Arguments<'_>);

    fn warn(&self, ctx: &Span, args: fmt::Arguments<'_>);

    fn error(&self, ctx: &Span, args: fmt::Arguments<'_>);

    /// Record a finished statement.
    ///
    /// `sql` is only called when the event will actually be written.
    /// `rows_affected` is negative when the row count is unknown.
    fn trace(
        &self,
        ctx: &Span,
        begin: Instant,
        sql: &dyn Fn() -> String,
        rows_affected: i64,
        err: Option<&(dyn Error + 'static)>,
    );
}

/// A [`QueryLogger`] that writes through `tracing`.
///
/// ```rust
/// use std::time::Instant;
/// use tracing::Span;
/// use tracing_querylog::{QueryLogger, TracingLogger};
///
/// let logger = TracingLogger::default();
/// let begin = Instant::now();
/// logger.trace(&Span::current(), begin, &|| "SELECT 1".to_string(), 1, None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    options: Arc<QueryLogOptions>,
}

impl TracingLogger {
    /// Build a logger from zero or more options applied in order.
    pub fn new<I>(options: I) -> Self
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        Self::from_options(QueryLogOptions::apply(options))
    }

    pub fn from_options(options: QueryLogOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &QueryLogOptions {
        &self.options
    }

    /// Same destination and policy, different level.
    pub fn with_log_level(&self, level: LogLevel) -> Self {
        let mut options = QueryLogOptions::clone(&self.options);
        options.log_level = level;
        Self::from_options(options)
    }

    /// Record a finished statement whose duration the caller already measured.
    ///
    /// This is [`QueryLogger::trace`] without the clock read, for layers that
    /// time queries themselves.
    pub fn trace_elapsed(
        &self,
        ctx: &Span,
        elapsed: Duration,
        sql: &dyn Fn() -> String,
        rows_affected: i64,
        err: Option<&(dyn Error + 'static)>,
    ) {
        let options = &*self.options;
        let category = policy::classify(err, elapsed, options.slow_threshold);
        if !options.log_level.allows(category) {
            return;
        }

        let sql = sql();
        let body = self.sanitize(&sql);
        let error = err.map(|e| e.to_string());
        let error = error.as_deref().map(|e| self.sanitize(e));

        let mut message = String::with_capacity(body.len() + 32);
        if category == Category::Warn {
            let _ = write!(
                message,
                "{} >= {} ",
                SLOW_QUERY_TAG,
                policy::format_latency(options.slow_threshold)
            );
        }
        message.push_str(&body);
        if options.log_latency {
            let _ = write!(message, " [{}]", policy::format_latency(elapsed));
        }
        let message = policy::colorize(&message, category, options.colorful);

        let record = EventRecord {
            message: &message,
            rows: (rows_affected >= 0).then_some(rows_affected),
            elapsed_ms: Some(elapsed.as_secs_f64() * 1_000.0),
            slow: Some(category == Category::Warn),
            error: error.as_deref(),
        };
        options.destination.write(ctx, category, &record);
    }

    fn log_message(&self, ctx: &Span, category: Category, args: fmt::Arguments<'_>) {
        let options = &*self.options;
        if !options.log_level.allows(category) {
            return;
        }

        let text = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };
        let body = self.sanitize(&text);
        let message = policy::colorize(&body, category, options.colorful);

        let record = EventRecord {
            message: &message,
            ..EventRecord::default()
        };
        options.destination.write(ctx, category, &record);
    }

    /// Redact on a banned keyword, otherwise truncate.
    ///
    /// The keyword scan sees the full text so truncation can never hide a
    /// match.
    fn sanitize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if policy::contains_banned(text, &self.options.banned_keywords) {
            Cow::Borrowed(REDACTED_PLACEHOLDER)
        } else {
            policy::truncate(text, self.options.truncate_len)
        }
    }
}

impl QueryLogger for TracingLogger {
    fn log_mode(&self, level: LogLevel) -> Box<dyn QueryLogger> {
        Box::new(self.with_log_level(level))
    }

    fn info(&self, ctx: &Span, args: fmt::Arguments<'_>) {
        self.log_message(ctx, Category::Info, args)
    }

    fn warn(&self, ctx: &Span, args: fmt::Arguments<'_>) {
        self.log_message(ctx, Category::Warn, args)
    }

    fn error(&self, ctx: &Span, args: fmt::Arguments<'_>) {
        self.log_message(ctx, Category::Error, args)
    }

    fn trace(
        &self,
        ctx: &Span,
        begin: Instant,
        sql: &dyn Fn() -> String,
        rows_affected: i64,
        err: Option<&(dyn Error + 'static)>,
    ) {
        self.trace_elapsed(ctx, begin.elapsed(), sql, rows_affected, err)
    }
}
