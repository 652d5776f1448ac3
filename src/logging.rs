use chrono::Local;
use colored::*;
use std::fmt;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Event formatter for the console fallback destination.
///
/// Each line is a local timestamp, the level tag colored by severity, and the
/// event fields. The query message itself is written verbatim, so colors added
/// by the `colorful` option survive untouched.
pub struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // Buffer the fields so the line is written in a single call.
        let mut buffer = String::new();
        let mut buf_writer = Writer::new(&mut buffer);
        ctx.format_fields(buf_writer.by_ref(), event)?;

        let level = *event.metadata().level();
        let tag = format!("{:>5}", level.to_string());
        let tag = if writer.has_ansi_escapes() {
            match level {
                Level::INFO => tag.green(),
                Level::WARN => tag.yellow(),
                Level::ERROR => tag.red(),
                Level::DEBUG => tag.blue(),
                Level::TRACE => tag.purple(),
            }
            .to_string()
        } else {
            tag
        };

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        writeln!(writer, "{} {} {}", timestamp, tag, buffer)
    }
}

/// Build the dispatch used by [`crate::Destination::Console`].
///
/// Errors go to stderr, info and warnings to stdout. The dispatch is private to
/// this crate's events and never replaces the host's global subscriber.
pub fn console_dispatch() -> Dispatch {
    let subscriber = tracing_subscriber::fmt()
        .event_format(ConsoleFormatter)
        .with_writer(
            std::io::stderr
                .with_max_level(Level::ERROR)
                .or_else(std::io::stdout),
        )
        .with_max_level(Level::INFO)
        .finish();
    Dispatch::new(subscriber)
}

/// Install [`ConsoleFormatter`] as the global subscriber, filtered by `RUST_LOG`.
///
/// Convenient for applications that want query logs and their own logs to look
/// the same. Fails if a global subscriber is already set.
pub fn init_console() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .event_format(ConsoleFormatter)
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuf {
        type Writer = SharedBuf;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Test that the formatter writes level, message and fields on one line
    #[test]
    fn test_console_formatter_line() {
        let buf = SharedBuf::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .event_format(ConsoleFormatter)
            .with_writer(buf.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(rows = 3, "SELECT 1");
        });

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains(" WARN "));
        assert!(output.contains("SELECT 1"));
        assert!(output.contains("rows=3"));
        assert!(!output.contains("\x1b["));
    }
}
