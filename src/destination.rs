//! Where formatted query logs end up.
//!
//! A [`Destination`] is resolved once, when the option set is built, and every
//! call on [`crate::TracingLogger`] writes through it without re-checking
//! configuration.

use std::sync::OnceLock;

use tracing::{Dispatch, Span};

use crate::policy::Category;

/// Target used for every event emitted by this crate.
pub const TARGET: &str = crate::defaults::TARGET;

/// The sink for formatted messages.
#[derive(Debug, Clone, Default)]
pub enum Destination {
    /// Built-in console writer: errors to stderr, everything else to stdout.
    #[default]
    Console,
    /// Emit as children of this span so its fields travel with every event.
    Span(Span),
    /// Emit into this subscriber instead of the global one.
    Dispatch(Dispatch),
}

/// One finished event, borrowed for the duration of a single write.
#[derive(Debug, Default)]
pub(crate) struct EventRecord<'a> {
    pub message: &'a str,
    pub rows: Option<i64>,
    pub elapsed_ms: Option<f64>,
    pub slow: Option<bool>,
    pub error: Option<&'a str>,
}

/// Expands to the `tracing` macro matching a runtime [`Category`].
macro_rules! category_event {
    ($category:expr, $($args:tt)+) => {
        match $category {
            Category::Info => tracing::info!($($args)+),
            Category::Warn => tracing::warn!($($args)+),
            Category::Error => tracing::error!($($args)+),
        }
    };
}

impl Destination {
    /// Write `record` at the severity of `category`.
    ///
    /// `ctx` is the caller's span. Its name is always recorded in the
    /// `context` field; for a [`Destination::Span`] it also becomes the parent
    /// when the configured span is disabled. Span events are dispatched to the
    /// subscriber the parent span was created in, not the caller's default.
    pub(crate) fn write(&self, ctx: &Span, category: Category, record: &EventRecord<'_>) {
        let context = ctx.metadata().map(|meta| meta.name());
        match self {
            Destination::Span(span) => {
                // Emit through the subscriber that owns the parent span.
                let emitted = [span, ctx].into_iter().find_map(|parent| {
                    parent.with_subscriber(|(_, dispatch)| {
                        tracing::dispatcher::with_default(dispatch, || {
                            write_event(category, Some(parent), context, record)
                        })
                    })
                });
                if emitted.is_none() {
                    write_event(category, None, context, record);
                }
            }
            Destination::Dispatch(dispatch) => {
                tracing::dispatcher::with_default(dispatch, || {
                    write_event(category, None, context, record)
                });
            }
            Destination::Console => {
                tracing::dispatcher::with_default(console(), || {
                    write_event(category, None, context, record)
                });
            }
        }
    }
}

fn write_event(
    category: Category,
    parent: Option<&Span>,
    context: Option<&str>,
    record: &EventRecord<'_>,
) {
    let EventRecord {
        message,
        rows,
        elapsed_ms,
        slow,
        error,
    } = *record;

    match parent {
        Some(parent) => category_event!(
            category,
            target: TARGET,
            parent: parent,
            rows,
            elapsed_ms,
            slow,
            error,
            context,
            "{}",
            message
        ),
        None => category_event!(
            category,
            target: TARGET,
            rows,
            elapsed_ms,
            slow,
            error,
            context,
            "{}",
            message
        ),
    }
}

/// Process-wide console dispatch, built on first use.
fn console() -> &'static Dispatch {
    static CONSOLE: OnceLock<Dispatch> = OnceLock::new();
    CONSOLE.get_or_init(crate::logging::console_dispatch)
}
