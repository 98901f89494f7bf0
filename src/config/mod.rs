// src/config/mod.rs

//! Configuration loading and validation for storyjobs.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Expose settings to the job core as a [`ConfigProvider`] (`provider.rs`).

pub mod loader;
pub mod model;
pub mod provider;
pub mod validate;

pub use loader::{apply_env_overrides, load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, CredentialsSection, EngineSection, OutputSection, RawConfigFile, SchedulerSection,
};
pub use provider::{AppConfig, ConfigProvider, ConfigSnapshot};
pub use validate::validate_config;
