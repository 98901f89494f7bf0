// src/exec/process.rs

//! Running one engine process to completion.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::JobError;
use crate::exec::command::EngineCommand;

/// Spawn `command`, wait for it to exit and collect its output.
///
/// - exit 0: `Ok(stdout)`, or `Ok(stderr)` when stdout is empty;
/// - non-zero exit: [`JobError::ProcessFailed`] with stdout followed by stderr;
/// - spawn failure: [`JobError::Launch`].
///
/// A process terminated by a signal has no exit code and reports `-1`.
pub async fn run_command(command: &EngineCommand) -> Result<String, JobError> {
    info!(
        program = %command.program.display(),
        args = ?command.args,
        cwd = %command.working_dir.display(),
        "starting engine process"
    );

    let output = Command::new(&command.program)
        .args(&command.args)
        .current_dir(&command.working_dir)
        .env_clear()
        .envs(&command.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| {
            warn!(
                program = %command.program.display(),
                error = %source,
                "failed to spawn engine process"
            );
            JobError::Launch {
                program: command.program.clone(),
                source,
            }
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let code = output.status.code().unwrap_or(-1);

    info!(
        program = %command.program.display(),
        exit_code = code,
        success = output.status.success(),
        "engine process exited"
    );
    debug!(stdout_len = stdout.len(), stderr_len = stderr.len(), "captured engine output");

    if output.status.success() {
        Ok(if stdout.is_empty() { stderr } else { stdout })
    } else {
        Err(JobError::ProcessFailed {
            exit_code: code,
            output: stdout + &stderr,
        })
    }
}
