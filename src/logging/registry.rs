//! Registry mapping program names to their loggers.
//!
//! One registry is created by the host at startup and shared (`Arc`) with
//! anything that needs to look up another program's recent logs — typically
//! server handlers filling status views. It lives for the process lifetime;
//! [`clear`](ProgramRegistry::clear) exists for tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::buffer::BufferPosition;
use super::ProgramLogger;
use crate::config::LoggingConfig;
use crate::error::CommonResult;

/// Process-wide map of program name → logger.
#[derive(Debug, Default)]
pub struct ProgramRegistry {
    loggers: RwLock<HashMap<String, Arc<ProgramLogger>>>,
}

impl ProgramRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a logger from `config` and register it under its program name.
    ///
    /// Re-registering a name replaces the previous logger; the old one stays
    /// alive for any holders of its `Arc`.
    pub fn setup(&self, config: &LoggingConfig) -> CommonResult<Arc<ProgramLogger>> {
        let logger = ProgramLogger::setup(config)?;
        self.register(logger.clone());
        Ok(logger)
    }

    /// Register an already-built logger under its program name.
    pub fn register(&self, logger: Arc<ProgramLogger>) {
        self.loggers
            .write()
            .insert(logger.program().to_string(), logger);
    }

    /// Look up a program's logger.
    pub fn get(&self, program: &str) -> Option<Arc<ProgramLogger>> {
        self.loggers.read().get(program).cloned()
    }

    /// Recent log lines for a program, oldest to newest, or `None` if the
    /// program has no registered logger.
    pub fn recent_logs(&self, program: &str) -> Option<Vec<Vec<u8>>> {
        self.get(program).map(|logger| logger.recent_logs())
    }

    /// Lines appended for a program since `baseline`, or `None` if the
    /// program has no registered logger.
    pub fn logs_since(&self, program: &str, baseline: BufferPosition) -> Option<Vec<Vec<u8>>> {
        self.get(program).map(|logger| logger.logs_since(baseline))
    }

    /// Names of all registered programs.
    pub fn programs(&self) -> Vec<String> {
        self.loggers.read().keys().cloned().collect()
    }

    /// Remove all registered loggers. Test hook; production registries are
    /// never torn down mid-process.
    pub fn clear(&self) {
        self.loggers.write().clear();
    }
}
