// src/errors.rs

//! Crate-wide error types.
//!
//! - [`StoryjobsError`] covers startup concerns: config, IO, credential
//!   stores, a closed registry.
//! - [`JobError`] is the failure taxonomy of a single job. It never escapes
//!   the registry; it is rendered into the job's log instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoryjobsError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error("Credential store error: {0}")]
    CredentialError(String),

    #[error("Job registry is closed")]
    RegistryClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why a job ended up `Failed`.
///
/// The `Display` output is what the user sees in the job log.
#[derive(Error, Debug)]
pub enum JobError {
    /// Required settings are missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The engine path does not point at an executable file, even after
    /// trying to add the execute bits.
    #[error("engine file not found or not executable: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    /// The OS refused to start the process.
    #[error("failed to launch '{}': {source}", program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran and exited non-zero.
    #[error("engine exited with code {exit_code}.\n{output}")]
    ProcessFailed { exit_code: i32, output: String },

    /// The dispatch task died before reporting an outcome.
    #[error("job worker stopped unexpectedly: {0}")]
    Worker(String),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, StoryjobsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_failed_renders_code_and_output() {
        let err = JobError::ProcessFailed {
            exit_code: 2,
            output: "boom".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains('2'));
        assert!(text.ends_with("boom"));
    }

    #[test]
    fn launch_error_names_program() {
        let err = JobError::Launch {
            program: PathBuf::from("/opt/engine/run.sh"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/opt/engine/run.sh"));
    }
}
