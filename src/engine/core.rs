// src/engine/core.rs

//! Pure core registry state machine.
//!
//! This module contains a synchronous, deterministic "core registry" that
//! consumes [`RegistryEvent`]s and produces:
//! - an updated job table
//! - a list of commands describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - running dispatched jobs on worker tasks
//! - publishing snapshots to observers
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, filesystem, or processes.

use crate::engine::event_handlers::{
    handle_job_completed, handle_job_enqueued, handle_shutdown, CoreStep,
};
use crate::engine::queue::DispatchQueue;
use crate::engine::table::JobTable;
use crate::engine::{RegistryEvent, RegistryOptions};
use crate::job::{Job, JobId};

/// Pure core registry state.
///
/// This owns:
/// - the job table (the only copy of job records that is ever mutated)
/// - the dispatch queue
/// - whether shutdown has been requested
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug)]
pub struct CoreRegistry {
    table: JobTable,
    queue: DispatchQueue,
    draining: bool,
}

impl CoreRegistry {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            table: JobTable::new(),
            queue: DispatchQueue::new(options.max_concurrent_jobs),
            draining: false,
        }
    }

    /// No job waiting or running.
    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    pub fn running_count(&self) -> usize {
        self.queue.running_count()
    }

    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.table.get(id)
    }

    /// All jobs, newest first.
    pub fn snapshot(&self) -> Vec<Job> {
        self.table.snapshot()
    }

    /// Handle a single registry event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RegistryEvent) -> CoreStep {
        match event {
            RegistryEvent::JobEnqueued(job) => {
                handle_job_enqueued(&mut self.table, &mut self.queue, job)
            }
            RegistryEvent::JobCompleted { id, outcome } => handle_job_completed(
                &mut self.table,
                &mut self.queue,
                self.draining,
                id,
                outcome,
            ),
            RegistryEvent::ShutdownRequested => {
                self.draining = true;
                handle_shutdown(&self.queue)
            }
        }
    }
}
