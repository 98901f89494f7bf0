// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigProvider, ConfigSnapshot};
use crate::errors::{JobError, Result};
use crate::exec::{CommandBuilder, ExecutorBackend, JobOutcome};
use crate::job::Job;

use super::core::CoreRegistry;
use super::{CoreCommand, RegistryEvent};

/// Owns the job table and drives it in response to `RegistryEvent`s,
/// delegating actual command execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRegistry`, which contains all the
/// registry semantics. This struct handles async IO: reading events from
/// channels, running dispatched jobs on worker tasks and publishing
/// snapshots.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRegistry,
    inbox: mpsc::UnboundedReceiver<RegistryEvent>,
    completion_tx: mpsc::UnboundedSender<RegistryEvent>,
    completion_rx: mpsc::UnboundedReceiver<RegistryEvent>,
    executor: Arc<E>,
    builder: Arc<CommandBuilder>,
    config: Arc<dyn ConfigProvider>,
    snapshots: watch::Sender<Vec<Job>>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        core: CoreRegistry,
        inbox: mpsc::UnboundedReceiver<RegistryEvent>,
        executor: Arc<E>,
        builder: Arc<CommandBuilder>,
        config: Arc<dyn ConfigProvider>,
        snapshots: watch::Sender<Vec<Job>>,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            core,
            inbox,
            completion_tx,
            completion_rx,
            executor,
            builder,
            config,
            snapshots,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RegistryEvent`s from the handle and from workers.
    /// - Feeds them into the core registry.
    /// - Executes commands returned by the core (spawn jobs, exit).
    ///
    /// A closed inbox counts as a shutdown request. Returns the final job
    /// list once every job is terminal.
    pub async fn run(mut self) -> Result<Vec<Job>> {
        info!("storyjobs registry started");
        let mut inbox_open = true;

        loop {
            let event = tokio::select! {
                Some(event) = self.completion_rx.recv() => event,
                event = self.inbox.recv(), if inbox_open => match event {
                    Some(event) => event,
                    None => {
                        debug!("registry inbox closed; treating as shutdown");
                        inbox_open = false;
                        RegistryEvent::ShutdownRequested
                    }
                },
                else => break,
            };

            debug!(?event, "registry received event");

            let step = self.core.step(event);

            if step.changed {
                self.snapshots.send_replace(self.core.snapshot());
            }

            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("all jobs finished after shutdown request; stopping registry");
                break;
            }
        }

        info!("registry exiting");
        Ok(self.core.snapshot())
    }

    fn execute_command(&self, command: CoreCommand) {
        match command {
            CoreCommand::Dispatch(job) => self.spawn_job(job),
            CoreCommand::RequestExit => {
                // keep_running=false already ends the loop.
                debug!("core issued RequestExit command");
            }
        }
    }

    /// Run `job` on its own task and report the outcome back to the loop.
    ///
    /// The job body runs on an inner task so a panic anywhere in command
    /// building or execution still produces a completion, and the job never
    /// stays `Running`.
    fn spawn_job(&self, job: Job) {
        let id = job.id();
        let executor = Arc::clone(&self.executor);
        let builder = Arc::clone(&self.builder);
        let config = Arc::clone(&self.config);
        let completion_tx = self.completion_tx.clone();

        tokio::spawn(async move {
            let worker = tokio::spawn(async move {
                run_job(&job, &builder, config.as_ref(), executor.as_ref()).await
            });

            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(job_id = %id, error = %err, "job worker aborted");
                    Err(JobError::Worker(err.to_string()))
                }
            };

            if completion_tx
                .send(RegistryEvent::JobCompleted { id, outcome })
                .is_err()
            {
                warn!(job_id = %id, "registry stopped before job completion was delivered");
            }
        });
    }
}

/// Build the command for `job` from a fresh config snapshot and execute it.
async fn run_job<E: ExecutorBackend>(
    job: &Job,
    builder: &CommandBuilder,
    config: &dyn ConfigProvider,
    executor: &E,
) -> JobOutcome {
    let snapshot = ConfigSnapshot::capture(config);
    let command = builder.build(job, &snapshot)?;

    info!(
        job_id = %job.id(),
        kind = %job.kind(),
        program = %command.program.display(),
        "launching engine"
    );
    executor.execute(command).await
}
