//! tracing integration: the line-formatting side of program logging.
//!
//! [`BufferLayer`] captures every tracing event, formats it as one JSON
//! line, and hands it to the program's [`ProgramLogger`] exactly once. The
//! logger then fans the line out to the ring buffer and the file.

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use super::entry::LogEntry;
use super::ProgramLogger;
use crate::error::{CommonError, CommonResult};

/// A tracing Layer that emits one log line per event into a program logger.
pub struct BufferLayer {
    logger: Arc<ProgramLogger>,
}

impl BufferLayer {
    pub fn new(logger: Arc<ProgramLogger>) -> Self {
        Self { logger }
    }

    /// The logger this layer feeds.
    pub fn logger(&self) -> &Arc<ProgramLogger> {
        &self.logger
    }
}

impl<S> Layer<S> for BufferLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = metadata.level().as_str().to_lowercase();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let message = visitor.message.unwrap_or_default();
        let mut entry = LogEntry::new(level, self.logger.program(), metadata.target(), message);

        if !visitor.fields.is_empty() {
            entry = entry.with_fields(serde_json::Value::Object(visitor.fields));
        }

        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                entry = entry.with_span(spans.join(" > "));
            }
        }

        // A line that fails to serialize is dropped; logging must not panic.
        if let Ok(line) = entry.to_json_line() {
            self.logger.append_line(line.as_bytes());
        }
    }
}

/// Visitor that pulls the message and structured fields out of an event.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: serde_json::Map<String, serde_json::Value>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut buf = String::new();
        let _ = write!(&mut buf, "{:?}", value);
        if field.name() == "message" {
            self.message = Some(buf);
        } else {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::String(buf));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(
                field.name().to_string(),
                serde_json::Value::String(value.to_string()),
            );
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::Number(value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if let Some(n) = serde_json::Number::from_f64(value) {
            self.fields
                .insert(field.name().to_string(), serde_json::Value::Number(n));
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(
            field.name().to_string(),
            serde_json::Value::String(value.to_string()),
        );
    }
}

/// Install a global tracing subscriber feeding this program's logger.
///
/// `filter` is an env-filter directive string (e.g. "info,mediacommon=debug");
/// when `None`, `RUST_LOG` is consulted with "info" as the fallback. With
/// `console` set, a human-readable fmt layer is added alongside the buffer
/// layer.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(
    logger: Arc<ProgramLogger>,
    console: bool,
    filter: Option<&str>,
) -> CommonResult<()> {
    let env_filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(BufferLayer::new(logger));

    if console {
        subscriber
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| CommonError::Init(e.to_string()))
    } else {
        subscriber
            .try_init()
            .map_err(|e| CommonError::Init(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use tempfile::TempDir;

    fn test_logger(temp: &TempDir) -> Arc<ProgramLogger> {
        let config = LoggingConfig::new("downloader", temp.path().join("downloader.jsonl"))
            .with_capacity(32)
            .no_console();
        ProgramLogger::setup(&config).unwrap()
    }

    #[test]
    fn layer_captures_events_into_buffer_and_file() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);
        let layer = BufferLayer::new(logger.clone());

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("channel refresh started");
            tracing::warn!(videos = 42, "queue is deep");
        });

        // Banner plus the two events.
        let logs = logger.recent_logs();
        assert_eq!(logs.len(), 3);

        let first = LogEntry::from_json_line(std::str::from_utf8(&logs[1]).unwrap()).unwrap();
        assert_eq!(first.level, "info");
        assert_eq!(first.program, "downloader");
        assert_eq!(first.msg, "channel refresh started");

        let second = LogEntry::from_json_line(std::str::from_utf8(&logs[2]).unwrap()).unwrap();
        assert_eq!(second.level, "warn");
        let fields = second.fields.unwrap();
        assert_eq!(fields["videos"], 42);

        let content = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("channel refresh started"));
        assert!(content.contains("queue is deep"));
    }

    #[test]
    fn layer_records_span_scope() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);
        let layer = BufferLayer::new(logger.clone());

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            let outer = tracing::info_span!("download");
            let _outer = outer.enter();
            let inner = tracing::info_span!("probe");
            let _inner = inner.enter();
            tracing::info!("checking codec");
        });

        let logs = logger.recent_logs();
        let entry = LogEntry::from_json_line(std::str::from_utf8(logs.last().unwrap()).unwrap())
            .unwrap();
        assert_eq!(entry.span.as_deref(), Some("download > probe"));
    }
}
