// src/types.rs

use serde::Deserialize;

/// Where the engine API key is read from and written to.
///
/// - `Env`: the process environment (read-only; `set`/`delete` only affect
///   this process's view).
/// - `File`: a TOML file owned by the user (`[credentials].file`).
/// - `Memory`: kept in memory only, lost on restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStoreKind {
    Env,
    File,
    Memory,
}

impl Default for CredentialStoreKind {
    fn default() -> Self {
        CredentialStoreKind::Env
    }
}

/// Name of the credential handed to the engine, and of the environment
/// variable it is injected as.
pub const API_KEY_NAME: &str = "OPENAI_API_KEY";

/// Locale forced on the engine when the environment does not set one.
pub const DEFAULT_LOCALE: &str = "en_US.UTF-8";

/// File name the smoke test renders into, inside the output directory.
pub const SMOKE_OUTPUT_FILE: &str = "smoke_test.mp4";
