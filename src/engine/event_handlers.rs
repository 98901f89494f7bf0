// src/engine/event_handlers.rs

//! Event handling logic for the core registry.

use tracing::{debug, info, warn};

use crate::engine::queue::DispatchQueue;
use crate::engine::table::JobTable;
use crate::exec::JobOutcome;
use crate::job::{Job, JobId, JobStatus};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Build and run this job (already marked `Running`) on a worker.
    Dispatch(Job),
    /// Every job is terminal and shutdown was requested.
    RequestExit,
}

/// Decision returned by the core after handling a single `RegistryEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the visible job list changed and observers need a new snapshot.
    pub changed: bool,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn unchanged() -> Self {
        Self {
            commands: Vec::new(),
            changed: false,
            keep_running: true,
        }
    }
}

/// Handle a newly enqueued job.
///
/// The job goes to the front of the table and to the back of the dispatch
/// queue; if a slot is free it is dispatched in the same step.
pub fn handle_job_enqueued(table: &mut JobTable, queue: &mut DispatchQueue, job: Job) -> CoreStep {
    let id = job.id();

    if job.status() != JobStatus::Queued {
        warn!(job_id = %id, status = %job.status(), "ignoring enqueue of a job that is not queued");
        return CoreStep::unchanged();
    }

    if !table.insert_front(job) {
        warn!(job_id = %id, "ignoring duplicate enqueue");
        return CoreStep::unchanged();
    }

    info!(job_id = %id, total = table.len(), "job queued");
    queue.push(id);

    CoreStep {
        commands: dispatch_ready(table, queue),
        changed: true,
        keep_running: true,
    }
}

/// Handle a completion reported by a worker.
///
/// Records the terminal status and log, frees the job's slot and dispatches
/// whatever can run next.
pub fn handle_job_completed(
    table: &mut JobTable,
    queue: &mut DispatchQueue,
    draining: bool,
    id: JobId,
    outcome: JobOutcome,
) -> CoreStep {
    if !queue.finish(id) {
        return CoreStep::unchanged();
    }

    let changed = match table.get_mut(&id) {
        Some(job) => {
            let (status, log) = match outcome {
                Ok(text) => (JobStatus::Succeeded, text),
                Err(err) => (JobStatus::Failed, err.to_string()),
            };
            let applied = job.finish(status, log);
            if applied {
                info!(job_id = %id, kind = %job.kind(), status = %status, "job finished");
            } else {
                warn!(job_id = %id, current = %job.status(), "ignoring completion for job not running");
            }
            applied
        }
        None => {
            warn!(job_id = %id, "completion for unknown job");
            false
        }
    };

    let mut commands = dispatch_ready(table, queue);
    let changed = changed || has_dispatch(&commands);

    let mut keep_running = true;
    if draining && queue.is_idle() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }

    CoreStep {
        commands,
        changed,
        keep_running,
    }
}

/// Handle a shutdown request: exit now if idle, otherwise once the last job
/// finishes.
pub fn handle_shutdown(queue: &DispatchQueue) -> CoreStep {
    if queue.is_idle() {
        debug!("shutdown requested while idle");
        return CoreStep {
            commands: vec![CoreCommand::RequestExit],
            changed: false,
            keep_running: false,
        };
    }

    info!(
        running = queue.running_count(),
        waiting = queue.waiting_count(),
        "shutdown requested; draining remaining jobs"
    );
    CoreStep::unchanged()
}

/// Move waiting jobs into free slots, marking each `Running`.
pub fn dispatch_ready(table: &mut JobTable, queue: &mut DispatchQueue) -> Vec<CoreCommand> {
    let mut commands = Vec::new();

    while let Some(id) = queue.next_ready() {
        let started = match table.get_mut(&id) {
            Some(job) if job.status() == JobStatus::Queued => {
                job.start();
                Some(job.clone())
            }
            _ => None,
        };

        match started {
            Some(job) => {
                debug!(job_id = %id, kind = %job.kind(), "job dispatched");
                commands.push(CoreCommand::Dispatch(job));
            }
            None => {
                warn!(job_id = %id, "queued job vanished or was not startable; skipping");
                queue.finish(id);
            }
        }
    }

    commands
}

fn has_dispatch(commands: &[CoreCommand]) -> bool {
    commands
        .iter()
        .any(|c| matches!(c, CoreCommand::Dispatch(_)))
}
