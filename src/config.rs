//! Logging configuration for one program instance.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default ring-buffer capacity when the host does not configure one.
pub const DEFAULT_BUFFER_CAPACITY: usize = 2500;

/// Configuration for setting up logging for a named program.
///
/// One of these is built by each sibling application (the downloader and the
/// post-processor) at startup and handed to
/// [`ProgramRegistry::setup`](crate::logging::ProgramRegistry::setup).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Program name, the key into the registry. Must be non-empty.
    pub program: String,

    /// Path to the durable JSONL log file. Parent directories are created
    /// as needed.
    pub log_file: PathBuf,

    /// Ring-buffer capacity in lines. Must be non-zero.
    pub buffer_capacity: usize,

    /// Whether the host should also emit human-readable console output.
    pub console: bool,

    /// Seed the ring buffer from the existing log file at setup so a fresh
    /// process shows prior history.
    pub preload: bool,
}

impl LoggingConfig {
    pub fn new(program: impl Into<String>, log_file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            log_file: log_file.into(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            console: true,
            preload: false,
        }
    }

    /// Override the ring-buffer capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Disable console output (file and ring buffer only).
    pub fn no_console(mut self) -> Self {
        self.console = false;
        self
    }

    /// Seed the ring buffer from the existing log file at setup.
    pub fn with_preload(mut self) -> Self {
        self.preload = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = LoggingConfig::new("downloader", "/tmp/downloader.jsonl");
        assert_eq!(cfg.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert!(cfg.console);
        assert!(!cfg.preload);
    }

    #[test]
    fn builder_overrides() {
        let cfg = LoggingConfig::new("processor", "p.jsonl")
            .with_capacity(5000)
            .no_console()
            .with_preload();
        assert_eq!(cfg.buffer_capacity, 5000);
        assert!(!cfg.console);
        assert!(cfg.preload);
    }
}
