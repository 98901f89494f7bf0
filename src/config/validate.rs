// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, StoryjobsError};
use crate::types::CredentialStoreKind;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::StoryjobsError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.engine,
            raw.output,
            raw.scheduler,
            raw.credentials,
        ))
    }
}

/// Run every check on a raw config without consuming it.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_raw_config(cfg)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_scheduler(cfg)?;
    validate_credentials(cfg)?;
    Ok(())
}

fn validate_scheduler(cfg: &RawConfigFile) -> Result<()> {
    if cfg.scheduler.max_concurrent_jobs == 0 {
        return Err(StoryjobsError::ConfigError(
            "[scheduler].max_concurrent_jobs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_credentials(cfg: &RawConfigFile) -> Result<()> {
    // No engine path check: an unset engine fails the job, not startup.
    if cfg.credentials.store == CredentialStoreKind::File {
        let has_file = cfg
            .credentials
            .file
            .as_deref()
            .is_some_and(|f| !f.trim().is_empty());
        if !has_file {
            return Err(StoryjobsError::ConfigError(
                "[credentials].store = \"file\" requires [credentials].file".to_string(),
            ));
        }
    }
    Ok(())
}
