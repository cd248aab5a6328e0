//! Log line record and ANSI handling.
//!
//! Every log event becomes one self-contained JSON object appended as a
//! single line, so the file stays parseable under concurrent appends and can
//! be queried with jq.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI pattern compiles"));

/// Remove ANSI color escapes from a formatted line.
///
/// Console output carries color; the ring buffer and the log file must not.
pub fn strip_ansi(line: &[u8]) -> Vec<u8> {
    ANSI_ESCAPE.replace_all(line, &b""[..]).into_owned()
}

/// One log line as stored in the JSONL file and the ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 timestamp with millisecond precision
    pub ts: String,

    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Program name (e.g. "downloader", "processor")
    pub program: String,

    /// Module path / target the event came from
    pub target: String,

    /// Human-readable message
    pub msg: String,

    /// Optional structured fields from the event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,

    /// Optional span scope chain if the event fired inside spans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current time.
    pub fn new(
        level: impl Into<String>,
        program: impl Into<String>,
        target: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            level: level.into(),
            program: program.into(),
            target: target.into(),
            msg: msg.into(),
            fields: None,
            span: None,
        }
    }

    /// Attach structured fields.
    pub fn with_fields(mut self, fields: Value) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Attach the span scope chain.
    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON line.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
