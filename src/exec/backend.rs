// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The registry runtime talks to an `ExecutorBackend` instead of spawning
//! processes itself. This makes it easy to swap in a fake executor in tests
//! while keeping the production implementation in [`process`].
//!
//! [`process`]: super::process

use std::future::Future;
use std::pin::Pin;

use crate::errors::JobError;
use crate::exec::command::EngineCommand;

use super::process::run_command;

/// Result of running one engine command: the text to show on success, or
/// the reason the job failed.
pub type JobOutcome = std::result::Result<String, JobError>;

/// Trait abstracting how engine commands are executed.
///
/// Production code uses [`RealExecutorBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ExecutorBackend: Send + Sync + 'static {
    /// Run `command` to completion.
    ///
    /// Called from a worker task, never from the registry's owning loop, so
    /// the future may wait for as long as the process runs.
    fn execute(
        &self,
        command: EngineCommand,
    ) -> Pin<Box<dyn Future<Output = JobOutcome> + Send + '_>>;
}

/// Real executor backend used in production: one OS process per command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealExecutorBackend;

impl RealExecutorBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn execute(
        &self,
        command: EngineCommand,
    ) -> Pin<Box<dyn Future<Output = JobOutcome> + Send + '_>> {
        Box::pin(async move { run_command(&command).await })
    }
}
