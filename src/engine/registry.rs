// src/engine/registry.rs

//! The handle front-ends hold to submit and observe jobs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ConfigProvider;
use crate::errors::{Result, StoryjobsError};
use crate::exec::{CommandBuilder, ExecutorBackend, RealExecutorBackend};
use crate::fs::FileSystem;
use crate::job::{Job, JobId, JobKind};

use super::core::CoreRegistry;
use super::runtime::Runtime;
use super::{RegistryEvent, RegistryOptions};

/// Owner of all jobs for the lifetime of the process.
///
/// Constructing a registry spawns its runtime loop on the current Tokio
/// runtime. Every mutation is a message to that loop; reads go through a
/// `watch` channel holding the latest snapshot, newest job first.
#[derive(Debug)]
pub struct JobRegistry {
    inbox: mpsc::UnboundedSender<RegistryEvent>,
    snapshots: watch::Receiver<Vec<Job>>,
    enqueued: AtomicUsize,
    task: JoinHandle<Result<Vec<Job>>>,
}

impl JobRegistry {
    /// Registry that runs engine processes for real.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        options: RegistryOptions,
        config: Arc<dyn ConfigProvider>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self::with_backend(
            options,
            config,
            CommandBuilder::new(fs),
            RealExecutorBackend::new(),
        )
    }

    /// Registry with an explicit command builder and executor backend.
    pub fn with_backend<E: ExecutorBackend>(
        options: RegistryOptions,
        config: Arc<dyn ConfigProvider>,
        builder: CommandBuilder,
        executor: E,
    ) -> Self {
        let (inbox, inbox_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(Vec::new());

        let runtime = Runtime::new(
            CoreRegistry::new(options),
            inbox_rx,
            Arc::new(executor),
            Arc::new(builder),
            config,
            snapshot_tx,
        );
        let task = tokio::spawn(runtime.run());

        info!(
            max_concurrent_jobs = options.max_concurrent_jobs,
            "job registry started"
        );

        Self {
            inbox,
            snapshots,
            enqueued: AtomicUsize::new(0),
            task,
        }
    }

    /// Create a `Queued` job and hand it to the registry.
    ///
    /// Never blocks; the job appears in [`list`](Self::list) once the
    /// runtime loop has taken it.
    pub fn enqueue(&self, kind: JobKind) -> Result<JobId> {
        let job = Job::new(kind);
        let id = job.id();
        debug!(job_id = %id, kind = %job.kind(), "enqueue");

        self.inbox
            .send(RegistryEvent::JobEnqueued(job))
            .map_err(|_| StoryjobsError::RegistryClosed)?;
        self.enqueued.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    /// Current jobs, newest first.
    pub fn list(&self) -> Vec<Job> {
        self.snapshots.borrow().clone()
    }

    pub fn get(&self, id: JobId) -> Option<Job> {
        self.snapshots
            .borrow()
            .iter()
            .find(|job| job.id() == id)
            .cloned()
    }

    /// Receiver that is notified on every change of the job list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Job>> {
        self.snapshots.clone()
    }

    /// Wait until every job enqueued so far has reached a terminal status.
    pub async fn wait_idle(&self) -> Result<Vec<Job>> {
        let target = self.enqueued.load(Ordering::SeqCst);
        let mut rx = self.snapshots.clone();

        let jobs = rx
            .wait_for(|jobs| {
                jobs.len() >= target && jobs.iter().all(|job| job.status().is_terminal())
            })
            .await
            .map_err(|_| StoryjobsError::RegistryClosed)?;
        Ok(jobs.clone())
    }

    /// Stop accepting work, let queued and running jobs finish, and return
    /// the final job list.
    pub async fn shutdown(self) -> Result<Vec<Job>> {
        info!("job registry shutting down");
        // The loop may already be gone; the join below reports why.
        let _ = self.inbox.send(RegistryEvent::ShutdownRequested);
        drop(self.inbox);

        self.task
            .await
            .map_err(|err| anyhow::anyhow!("registry task failed: {err}"))?
    }
}
