// src/exec/command.rs

//! Turning a job into a concrete engine invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ConfigSnapshot;
use crate::errors::JobError;
use crate::exec::env::{engine_environment, inherited_env};
use crate::fs::FileSystem;
use crate::job::{Job, JobKind};
use crate::types::SMOKE_OUTPUT_FILE;

/// Fully resolved process invocation for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub env: BTreeMap<String, String>,
}

/// Maps a job plus a config snapshot to an [`EngineCommand`].
///
/// Side effects are limited to preparing the filesystem the engine expects:
/// restoring the execute bit on the engine script and creating the output
/// directory for smoke tests.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    fs: Arc<dyn FileSystem>,
    base_env: BTreeMap<String, String>,
}

impl CommandBuilder {
    /// Builder inheriting the current process environment.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            base_env: inherited_env(),
        }
    }

    /// Replace the inherited environment (tests, sandboxed runs).
    pub fn with_base_env(mut self, base_env: BTreeMap<String, String>) -> Self {
        self.base_env = base_env;
        self
    }

    pub fn build(&self, job: &Job, config: &ConfigSnapshot) -> Result<EngineCommand, JobError> {
        let program = self.resolve_program(config)?;
        let working_dir = engine_root(&program)?;
        let args = self.job_args(job.kind(), config)?;
        let env = engine_environment(&self.base_env, &working_dir, config.api_key.as_deref());

        debug!(
            job_id = %job.id(),
            program = %program.display(),
            ?args,
            cwd = %working_dir.display(),
            "built engine command"
        );

        Ok(EngineCommand {
            program,
            args,
            working_dir,
            env,
        })
    }

    fn resolve_program(&self, config: &ConfigSnapshot) -> Result<PathBuf, JobError> {
        let path = config.engine_path.as_ref().ok_or_else(|| {
            JobError::Configuration(
                "engine path is not configured (set [engine].path in settings)".to_string(),
            )
        })?;

        if !self.fs.is_file(path) {
            return Err(JobError::ExecutableNotFound(path.clone()));
        }

        if !self.fs.is_executable(path) {
            debug!(path = %path.display(), "engine script lacks execute bit; repairing");
            if let Err(e) = self.fs.make_executable(path) {
                warn!(path = %path.display(), error = %e, "could not make engine script executable");
                return Err(JobError::ExecutableNotFound(path.clone()));
            }
        }

        self.fs
            .canonicalize(path)
            .map_err(|_| JobError::ExecutableNotFound(path.clone()))
    }

    fn job_args(&self, kind: &JobKind, config: &ConfigSnapshot) -> Result<Vec<String>, JobError> {
        let mut args = vec![kind.subcommand().to_string()];

        match kind {
            JobKind::HealthCheck => {}
            JobKind::SmokeTest => {
                let out_dir = config.output_directory.as_ref().ok_or_else(|| {
                    JobError::Configuration(
                        "output directory is not configured (set [output].directory in settings)"
                            .to_string(),
                    )
                })?;
                self.fs.create_dir_all(out_dir).map_err(|e| {
                    JobError::Configuration(format!(
                        "cannot create output directory {}: {e}",
                        out_dir.display()
                    ))
                })?;
                args.push("--out".to_string());
                args.push(
                    out_dir
                        .join(SMOKE_OUTPUT_FILE)
                        .to_string_lossy()
                        .into_owned(),
                );
            }
            JobKind::RenderImages { args: render_args } => {
                args.extend(render_args.iter().cloned());
            }
        }

        Ok(args)
    }
}

/// The engine script lives at `<root>/<dir>/<script>`; its root is the
/// working directory the engine expects.
fn engine_root(program: &Path) -> Result<PathBuf, JobError> {
    program
        .parent()
        .and_then(Path::parent)
        .filter(|root| !root.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            JobError::Configuration(format!(
                "engine path {} must be two levels below the engine root",
                program.display()
            ))
        })
}
