//! Error types shared by the support library.

use thiserror::Error;

/// Error type for logging setup and file operations.
///
/// The ring buffer itself never fails once constructed; errors exist only at
/// the setup and file boundaries.
#[derive(Error, Debug)]
pub enum CommonError {
    /// Log buffer capacity of zero is a misconfiguration, rejected at
    /// construction rather than silently defaulted.
    #[error("log buffer capacity must be greater than zero")]
    InvalidCapacity,

    /// Loggers are keyed by program name; an empty key is always a bug.
    #[error("program name is required")]
    MissingProgramName,

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to install the global tracing subscriber
    #[error("Tracing init error: {0}")]
    Init(String),
}

/// Result type alias using CommonError
pub type CommonResult<T> = Result<T, CommonError>;
