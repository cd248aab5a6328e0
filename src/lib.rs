//! mediacommon — shared support library for the media downloader and
//! post-processor.
//!
//! Both sibling applications log the same way: every event becomes one JSON
//! line that is appended to a bounded in-memory ring (for live status views)
//! and to an append-only JSONL file (the durable copy). Loggers are keyed by
//! program name in a [`ProgramRegistry`] so one program's server handlers
//! can surface another's recent history.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mediacommon::{LoggingConfig, ProgramRegistry};
//! use mediacommon::logging::init_tracing;
//!
//! fn main() -> mediacommon::CommonResult<()> {
//!     let registry = ProgramRegistry::new();
//!
//!     let config = LoggingConfig::new("downloader", "./logs/downloader.jsonl")
//!         .with_preload();
//!     let logger = registry.setup(&config)?;
//!     init_tracing(logger.clone(), config.console, None)?;
//!
//!     tracing::info!("starting channel refresh");
//!
//!     // Incremental polling from a status view:
//!     let baseline = logger.buffer_position();
//!     // ... work happens, more events fire ...
//!     let new_lines = logger.logs_since(baseline);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use config::{LoggingConfig, DEFAULT_BUFFER_CAPACITY};
pub use error::{CommonError, CommonResult};
pub use logging::{
    BufferLayer, BufferPosition, LogBuffer, LogEntry, ProgramLogger, ProgramRegistry,
};
