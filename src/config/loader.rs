// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable overriding `[engine].path`.
pub const ENGINE_ENV: &str = "STORYJOBS_ENGINE";
/// Environment variable overriding `[output].directory`.
pub const OUTPUT_DIR_ENV: &str = "STORYJOBS_OUTPUT_DIR";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file yields the defaults.
///
/// A fresh install has no settings yet; jobs then fail with a configuration
/// message instead of the whole program refusing to start.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "config file not found; using defaults");
        return Ok(ConfigFile::default());
    }
    load_and_validate(path)
}

/// Apply `STORYJOBS_ENGINE` / `STORYJOBS_OUTPUT_DIR` on top of a loaded config.
pub fn apply_env_overrides(cfg: ConfigFile) -> ConfigFile {
    apply_overrides(cfg, |name| std::env::var(name).ok())
}

/// Override helper with an injectable variable lookup.
pub fn apply_overrides(mut cfg: ConfigFile, lookup: impl Fn(&str) -> Option<String>) -> ConfigFile {
    if let Some(engine) = lookup(ENGINE_ENV).filter(|v| !v.trim().is_empty()) {
        debug!(engine = %engine, "engine path overridden from environment");
        cfg.engine.path = Some(engine);
    }
    if let Some(dir) = lookup(OUTPUT_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        debug!(dir = %dir, "output directory overridden from environment");
        cfg.output.directory = Some(dir);
    }
    cfg
}
