// src/lib.rs

pub mod cli;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod job;
pub mod logging;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, CredentialAction};
use crate::config::{AppConfig, ConfigSnapshot, apply_env_overrides, load_or_default};
use crate::credentials::mask_secret;
use crate::engine::{JobRegistry, RegistryOptions};
use crate::exec::CommandBuilder;
use crate::fs::{DryRunFileSystem, FileSystem, RealFileSystem};
use crate::job::{Job, JobKind, JobStatus};
use crate::types::{API_KEY_NAME, CredentialStoreKind};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, then environment overrides)
/// - the credential store
/// - the job registry and the real executor
///
/// Job commands run exactly one job, print its log to stdout and fail if the
/// job failed.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = apply_env_overrides(load_or_default(&args.config)?);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let app = Arc::new(AppConfig::from_config(cfg, Arc::clone(&fs))?);

    let kind = match &args.command {
        Command::Credential { action } => return manage_credential(&app, action),
        Command::Doctor => JobKind::HealthCheck,
        Command::Smoke => JobKind::SmokeTest,
        Command::RenderImages(render) => {
            let output_dir = app.file().output_directory().ok_or_else(|| {
                anyhow!("render-images needs an output directory ([output].directory)")
            })?;
            render.to_request().into_job_kind(&output_dir)?
        }
    };

    if args.dry_run {
        return print_dry_run(&app, fs, kind);
    }

    let registry = JobRegistry::start(
        RegistryOptions::from_config(app.file()),
        app.clone(),
        fs,
    );

    let id = registry.enqueue(kind)?;
    registry.wait_idle().await?;
    let job = registry
        .get(id)
        .ok_or_else(|| anyhow!("job {id} disappeared from the registry"))?;
    registry.shutdown().await?;

    if !job.log().is_empty() {
        println!("{}", job.log());
    }
    info!(job_id = %job.id(), status = %job.status(), "job done");

    if job.status() == JobStatus::Failed {
        bail!("{} job failed", job.kind());
    }
    Ok(())
}

fn manage_credential(app: &AppConfig, action: &CredentialAction) -> Result<()> {
    let store = app.credentials();
    if !matches!(action, CredentialAction::Show) {
        ensure_persistent_store(app.file().credentials.store)?;
    }
    match action {
        CredentialAction::Show => match store.get(API_KEY_NAME) {
            Some(key) => println!("{API_KEY_NAME} = {}", mask_secret(&key)),
            None => println!("{API_KEY_NAME} is not set"),
        },
        CredentialAction::Set { value } => {
            store
                .set(API_KEY_NAME, value)
                .with_context(|| format!("failed to store {API_KEY_NAME}"))?;
            if value.trim().is_empty() {
                println!("{API_KEY_NAME} removed");
            } else {
                println!("{API_KEY_NAME} = {}", mask_secret(value.trim()));
            }
        }
        CredentialAction::Delete => {
            store
                .delete(API_KEY_NAME)
                .with_context(|| format!("failed to delete {API_KEY_NAME}"))?;
            println!("{API_KEY_NAME} removed");
        }
    }
    Ok(())
}

/// Only the file store outlives this process; writing to the others would
/// report success for a key that is gone on the next run.
fn ensure_persistent_store(kind: CredentialStoreKind) -> Result<()> {
    match kind {
        CredentialStoreKind::File => Ok(()),
        CredentialStoreKind::Env => bail!(
            "the env credential store is read-only; export {API_KEY_NAME} in your shell, \
             or set `store = \"file\"` under [credentials] in the config to save it"
        ),
        CredentialStoreKind::Memory => bail!(
            "the memory credential store is forgotten when storyjobs exits; \
             set `store = \"file\"` under [credentials] in the config to save {API_KEY_NAME}"
        ),
    }
}

/// Resolve the command a job would run and print it. The environment is not
/// printed; it carries the API key. Nothing on disk changes: the builder
/// sees a [`DryRunFileSystem`].
fn print_dry_run(app: &AppConfig, fs: Arc<dyn FileSystem>, kind: JobKind) -> Result<()> {
    let job = Job::new(kind);
    let snapshot = ConfigSnapshot::capture(app);
    let command = CommandBuilder::new(Arc::new(DryRunFileSystem::new(fs))).build(&job, &snapshot)?;

    println!("storyjobs dry-run");
    println!("  job:     {}", job.kind());
    println!("  program: {}", command.program.display());
    println!("  args:    {:?}", command.args);
    println!("  cwd:     {}", command.working_dir.display());
    println!(
        "  api key: {}",
        snapshot
            .api_key
            .as_deref()
            .map(mask_secret)
            .unwrap_or_else(|| "(not set)".to_string())
    );

    debug!("dry-run complete (no execution)");
    Ok(())
}
