//! Ring-buffered, file-backed logging for named program instances.
//!
//! Each program (the downloader, the post-processor) gets a
//! [`ProgramLogger`]: a bounded in-memory ring of its most recent log lines
//! plus an append-only JSONL file. The ring serves live status views —
//! full-history reads and cheap "what's new since I last looked" polls —
//! while the file is the durable copy.
//!
//! ## Architecture
//!
//! ```text
//! tracing event
//!   └── BufferLayer (formats one JSON line per event)
//!         └── ProgramLogger::append_line
//!               ├── LogBuffer (ring, last N lines, in memory)
//!               └── ProgramLogWriter (JSONL file, append-only)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use mediacommon::{LoggingConfig, ProgramRegistry};
//! use mediacommon::logging::init_tracing;
//!
//! let registry = ProgramRegistry::new();
//! let config = LoggingConfig::new("downloader", "./logs/downloader.jsonl")
//!     .with_capacity(2500)
//!     .with_preload();
//!
//! let logger = registry.setup(&config)?;
//! init_tracing(logger.clone(), config.console, None)?;
//!
//! tracing::info!("channel refresh started");
//!
//! // Poll for new lines from a status view:
//! let baseline = logger.buffer_position();
//! // ... later ...
//! for line in logger.logs_since(baseline) {
//!     println!("{}", String::from_utf8_lossy(&line));
//! }
//! ```
//!
//! ## Querying the file with jq
//!
//! ```bash
//! jq 'select(.level == "error")' logs/downloader.jsonl
//! ```

pub mod buffer;
pub mod entry;
pub mod layer;
pub mod registry;
pub mod writer;

// Re-exports for convenience
pub use buffer::{BufferPosition, LogBuffer};
pub use entry::{strip_ansi, LogEntry};
pub use layer::{init_tracing, BufferLayer};
pub use registry::ProgramRegistry;
pub use writer::{read_recent_lines, ProgramLogWriter};

use std::path::Path;
use std::sync::Arc;

use crate::config::LoggingConfig;
use crate::error::{CommonError, CommonResult};

/// Logging state for one named program: ring buffer plus durable file.
#[derive(Debug)]
pub struct ProgramLogger {
    program: String,
    buffer: LogBuffer,
    writer: ProgramLogWriter,
}

impl ProgramLogger {
    /// Build a logger from config: validates the program name and capacity,
    /// opens the log file, optionally seeds the ring from prior history, and
    /// writes a session-start banner.
    ///
    /// Most callers go through [`ProgramRegistry::setup`], which also
    /// registers the logger for lookup by name.
    pub fn setup(config: &LoggingConfig) -> CommonResult<Arc<Self>> {
        if config.program.is_empty() {
            return Err(CommonError::MissingProgramName);
        }

        let buffer = LogBuffer::new(config.buffer_capacity)?;
        let writer = ProgramLogWriter::new(&config.log_file)?;

        let logger = Arc::new(Self {
            program: config.program.clone(),
            buffer,
            writer,
        });

        if config.preload {
            logger.preload_from_file();
        }

        let banner = format!(
            "=========== {} ===========",
            chrono::Local::now().to_rfc2822()
        );
        logger.append_line(banner.as_bytes());

        Ok(logger)
    }

    /// Program name this logger is keyed by.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Path to the durable log file.
    pub fn log_path(&self) -> &Path {
        self.writer.path()
    }

    /// The in-memory ring of recent lines.
    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    /// Record one formatted line: strip ANSI escapes, keep the cleaned copy
    /// in the ring, then append it to the file.
    ///
    /// File I/O happens after the buffer's lock is released. A failed file
    /// write is reported to stderr rather than propagated; log emission must
    /// never take the host program down.
    pub fn append_line(&self, line: &[u8]) {
        let clean = strip_ansi(line);
        self.buffer.append(&clean);

        if let Err(err) = self.writer.write_line(&clean) {
            eprintln!("failed to write log line for {}: {err}", self.program);
        }
    }

    /// All retained lines, oldest to newest.
    pub fn recent_logs(&self) -> Vec<Vec<u8>> {
        self.buffer.read_all()
    }

    /// Lines appended since `baseline`, oldest to newest.
    pub fn logs_since(&self, baseline: BufferPosition) -> Vec<Vec<u8>> {
        self.buffer.read_since(baseline)
    }

    /// Snapshot of the ring cursor for later [`logs_since`] polls.
    ///
    /// [`logs_since`]: ProgramLogger::logs_since
    pub fn buffer_position(&self) -> BufferPosition {
        self.buffer.position()
    }

    /// Seed the ring buffer from the existing log file, keeping the last
    /// `capacity` lines. Read failures are reported and skipped; the file
    /// not existing yet is normal on first run.
    pub fn preload_from_file(&self) {
        match read_recent_lines(self.writer.path(), self.buffer.capacity()) {
            Ok(lines) => {
                for line in &lines {
                    self.buffer.append(line);
                }
            }
            Err(err) => {
                tracing::warn!(
                    program = %self.program,
                    path = %self.writer.path().display(),
                    "could not preload log history: {err}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir, program: &str) -> LoggingConfig {
        LoggingConfig::new(program, temp.path().join(format!("{program}.jsonl")))
            .with_capacity(16)
            .no_console()
    }

    #[test]
    fn setup_rejects_empty_program_name() {
        let temp = TempDir::new().unwrap();
        let config = LoggingConfig::new("", temp.path().join("x.jsonl"));
        assert!(matches!(
            ProgramLogger::setup(&config),
            Err(CommonError::MissingProgramName)
        ));
    }

    #[test]
    fn setup_rejects_zero_capacity() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp, "downloader").with_capacity(0);
        assert!(matches!(
            ProgramLogger::setup(&config),
            Err(CommonError::InvalidCapacity)
        ));
    }

    #[test]
    fn setup_writes_session_banner() {
        let temp = TempDir::new().unwrap();
        let logger = ProgramLogger::setup(&config_in(&temp, "downloader")).unwrap();

        let logs = logger.recent_logs();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].starts_with(b"=========== "));

        let content = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.starts_with("=========== "));
    }

    #[test]
    fn append_line_strips_ansi_in_buffer_and_file() {
        let temp = TempDir::new().unwrap();
        let logger = ProgramLogger::setup(&config_in(&temp, "processor")).unwrap();

        logger.append_line(b"\x1b[31m[ERROR]\x1b[0m probe failed");

        let logs = logger.recent_logs();
        assert_eq!(logs.last().unwrap().as_slice(), b"[ERROR] probe failed");

        let content = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("[ERROR] probe failed"));
        assert!(!content.contains('\x1b'));
    }

    #[test]
    fn logs_since_sees_only_new_lines() {
        let temp = TempDir::new().unwrap();
        let logger = ProgramLogger::setup(&config_in(&temp, "downloader")).unwrap();

        let baseline = logger.buffer_position();
        logger.append_line(b"one");
        logger.append_line(b"two");

        let delta = logger.logs_since(baseline);
        assert_eq!(delta, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn preload_restores_history_across_runs() {
        let temp = TempDir::new().unwrap();

        {
            let logger = ProgramLogger::setup(&config_in(&temp, "downloader")).unwrap();
            logger.append_line(b"from the first run");
        }

        let config = config_in(&temp, "downloader").with_preload();
        let logger = ProgramLogger::setup(&config).unwrap();

        let logs = logger.recent_logs();
        // Prior banner + prior line + fresh banner.
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[1].as_slice(), b"from the first run");
    }

    #[test]
    fn preload_keeps_only_capacity_lines() {
        let temp = TempDir::new().unwrap();

        {
            let logger = ProgramLogger::setup(&config_in(&temp, "downloader")).unwrap();
            for i in 0..40 {
                logger.append_line(format!("old-{i}").as_bytes());
            }
        }

        let config = config_in(&temp, "downloader").with_preload();
        let logger = ProgramLogger::setup(&config).unwrap();

        // Ring capacity is 16; the preload plus banner must not exceed it.
        assert_eq!(logger.recent_logs().len(), 16);
        let logs = logger.recent_logs();
        assert_eq!(logs[logs.len() - 2].as_slice(), b"old-39");
    }
}
