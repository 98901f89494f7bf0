// src/job/mod.rs

//! Job records and their state machine.
//!
//! - [`Job`] is one requested unit of engine work.
//! - [`JobStatus`] only moves forward: `Queued -> Running -> Succeeded|Failed`.
//! - [`render`] assembles the argument list of a `RenderImages` job.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod render;

pub use render::RenderRequest;

/// Opaque job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the engine should do for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    HealthCheck,
    SmokeTest,
    /// Arguments after the `render-images` subcommand, already serialized.
    RenderImages { args: Vec<String> },
}

impl JobKind {
    /// Subcommand token the engine expects first in its argv.
    pub fn subcommand(&self) -> &'static str {
        match self {
            JobKind::HealthCheck => "doctor",
            JobKind::SmokeTest => "smoke",
            JobKind::RenderImages { .. } => "render-images",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::HealthCheck => write!(f, "health-check"),
            JobKind::SmokeTest => write!(f, "smoke-test"),
            JobKind::RenderImages { .. } => write!(f, "render-images"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    /// Whether `self -> next` is a legal forward step.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Succeeded)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single job as seen by observers.
///
/// Fields are read-only outside this module; only the registry advances the
/// status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    kind: JobKind,
    status: JobStatus,
    log: String,
    created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(kind: JobKind) -> Self {
        Self::with_id(JobId::new(), kind)
    }

    pub fn with_id(id: JobId, kind: JobKind) -> Self {
        Self {
            id,
            kind,
            status: JobStatus::Queued,
            log: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn kind(&self) -> &JobKind {
        &self.kind
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn log(&self) -> &str {
        &self.log
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// `Queued -> Running`. Returns false (and changes nothing) otherwise.
    pub(crate) fn start(&mut self) -> bool {
        self.advance(JobStatus::Running)
    }

    /// `Running -> Succeeded|Failed`, replacing the log.
    pub(crate) fn finish(&mut self, status: JobStatus, log: String) -> bool {
        if !status.is_terminal() || !self.advance(status) {
            return false;
        }
        self.log = log;
        true
    }

    fn advance(&mut self, next: JobStatus) -> bool {
        if self.status.can_advance_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_queued_with_empty_log() {
        let job = Job::new(JobKind::HealthCheck);
        assert_eq!(job.status(), JobStatus::Queued);
        assert!(job.log().is_empty());
    }

    #[test]
    fn job_walks_forward_only() {
        let mut job = Job::new(JobKind::SmokeTest);

        assert!(!job.finish(JobStatus::Succeeded, "early".into()));
        assert!(job.log().is_empty(), "log must not be written while queued");

        assert!(job.start());
        assert!(!job.start());
        assert!(job.finish(JobStatus::Failed, "bad".into()));
        assert_eq!(job.status(), JobStatus::Failed);

        assert!(!job.finish(JobStatus::Succeeded, "late".into()));
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.log(), "bad");
    }

    #[test]
    fn finish_rejects_non_terminal_status() {
        let mut job = Job::new(JobKind::HealthCheck);
        job.start();
        assert!(!job.finish(JobStatus::Queued, String::new()));
        assert_eq!(job.status(), JobStatus::Running);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn subcommand_tokens() {
        assert_eq!(JobKind::HealthCheck.subcommand(), "doctor");
        assert_eq!(JobKind::SmokeTest.subcommand(), "smoke");
        assert_eq!(
            JobKind::RenderImages { args: vec![] }.subcommand(),
            "render-images"
        );
    }
}
