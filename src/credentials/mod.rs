// src/credentials/mod.rs

//! Secret storage for the engine API key.
//!
//! The core only ever calls [`CredentialProvider::get`]; `set` and `delete`
//! exist for the settings front-end. Backends:
//! - [`EnvCredentialProvider`]: process environment, read-only.
//! - [`MemoryCredentialProvider`]: a plain map, for tests and ephemeral runs.
//! - [`file::FileCredentialProvider`]: a private TOML file.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::{Result, StoryjobsError};

pub mod file;

pub use file::FileCredentialProvider;

pub trait CredentialProvider: Send + Sync + Debug {
    fn get(&self, name: &str) -> Option<String>;

    /// Store `value`. A blank value deletes the credential instead.
    fn set(&self, name: &str, value: &str) -> Result<()>;

    fn delete(&self, name: &str) -> Result<()>;
}

/// Reads credentials from the process environment.
///
/// The environment belongs to the caller, so this store is read-only: `set`
/// and `delete` fail instead of pretending to persist anything.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn set(&self, name: &str, _value: &str) -> Result<()> {
        Err(read_only_env(name))
    }

    fn delete(&self, name: &str) -> Result<()> {
        Err(read_only_env(name))
    }
}

fn read_only_env(name: &str) -> StoryjobsError {
    StoryjobsError::CredentialError(format!(
        "the env store cannot change {name}; export it in your shell or set \
         `store = \"file\"` under [credentials] in the config"
    ))
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialProvider {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: &str) -> Self {
        if let Ok(mut values) = self.values.lock() {
            values.insert(name.to_string(), value.to_string());
        }
        self
    }

    fn values(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| StoryjobsError::CredentialError("memory store lock poisoned".into()))
    }
}

impl CredentialProvider for MemoryCredentialProvider {
    fn get(&self, name: &str) -> Option<String> {
        self.values().ok()?.get(name).cloned()
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return self.delete(name);
        }
        self.values()?.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.values()?.remove(name);
        Ok(())
    }
}

/// Render a secret for display: first and last four characters only.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "••••".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}••••{tail}")
}
