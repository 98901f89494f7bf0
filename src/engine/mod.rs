// src/engine/mod.rs

//! Job registry engine for storyjobs.
//!
//! This module ties together:
//! - the job table (ordered, id-keyed job records)
//! - the dispatch queue (which job gets an execution slot next)
//! - the runtime loop that reacts to:
//!   - newly enqueued jobs
//!   - job completions reported by worker tasks
//!   - shutdown requests
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]; [`registry`] is the handle front-ends hold.

use crate::config::ConfigFile;
use crate::exec::JobOutcome;
use crate::job::{Job, JobId};

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RegistryOptions {
    /// Maximum number of jobs in `Running` at once (>= 1).
    pub max_concurrent_jobs: usize,
}

impl RegistryOptions {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            max_concurrent_jobs: cfg.scheduler.max_concurrent_jobs,
        }
    }
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 1,
        }
    }
}

/// Events flowing into the registry runtime from the handle and from workers.
#[derive(Debug)]
pub enum RegistryEvent {
    /// A new job was created by `enqueue`.
    JobEnqueued(Job),
    /// A worker finished a job (successfully or not).
    JobCompleted { id: JobId, outcome: JobOutcome },
    /// Stop once every known job is terminal.
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod registry;
pub mod runtime;
pub mod table;

pub use self::core::CoreRegistry;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::DispatchQueue;
pub use registry::JobRegistry;
pub use runtime::Runtime;
pub use table::JobTable;
