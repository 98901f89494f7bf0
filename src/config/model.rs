// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::CredentialStoreKind;

/// Configuration exactly as read from the TOML file, before validation.
///
/// ```toml
/// [engine]
/// path = "~/Downloads/App/appstories/scripts/run_engine.sh"
///
/// [output]
/// directory = "~/Downloads/App/appstories/releases"
///
/// [scheduler]
/// max_concurrent_jobs = 1
///
/// [credentials]
/// store = "file"
/// file = "~/.config/storyjobs/credentials.toml"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub credentials: CredentialsSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub output: OutputSection,
    pub scheduler: SchedulerSection,
    pub credentials: CredentialsSection,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineSection {
    /// Path to the engine launcher script. The engine's project root is
    /// assumed to be two levels above it.
    #[serde(default)]
    pub path: Option<String>,
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputSection {
    /// Directory the engine writes rendered files into.
    #[serde(default)]
    pub directory: Option<String>,
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSection {
    /// Upper bound on engine processes running at once.
    ///
    /// `1` (default) runs jobs strictly one after another in enqueue order.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

fn default_max_concurrent_jobs() -> usize {
    1
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

/// `[credentials]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsSection {
    #[serde(default)]
    pub store: CredentialStoreKind,

    /// Backing file for `store = "file"`.
    #[serde(default)]
    pub file: Option<String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        engine: EngineSection,
        output: OutputSection,
        scheduler: SchedulerSection,
        credentials: CredentialsSection,
    ) -> Self {
        Self {
            engine,
            output,
            scheduler,
            credentials,
        }
    }

    /// Engine path with whitespace trimmed and `~` expanded; `None` if blank.
    pub fn engine_path(&self) -> Option<PathBuf> {
        non_blank(self.engine.path.as_deref()).map(expand_tilde)
    }

    pub fn output_directory(&self) -> Option<PathBuf> {
        non_blank(self.output.directory.as_deref()).map(expand_tilde)
    }

    pub fn credentials_file(&self) -> Option<PathBuf> {
        non_blank(self.credentials.file.as_deref()).map(expand_tilde)
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.engine, raw.output, raw.scheduler, raw.credentials)
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Expand a leading `~` to `$HOME`. Other paths are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_engine_path_is_unset() {
        let mut cfg = ConfigFile::default();
        cfg.engine.path = Some("   ".to_string());
        assert_eq!(cfg.engine_path(), None);

        cfg.engine.path = Some(" /opt/engine/scripts/run.sh \n".to_string());
        assert_eq!(cfg.engine_path(), Some(PathBuf::from("/opt/engine/scripts/run.sh")));
    }

    #[test]
    fn tilde_expands_only_at_start() {
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(expand_tilde("~/x"), PathBuf::from(home).join("x"));
        }
        assert_eq!(expand_tilde("/a/~/b"), PathBuf::from("/a/~/b"));
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
    }

    #[test]
    fn defaults_are_serial_and_env_backed() {
        let cfg = ConfigFile::default();
        assert_eq!(cfg.scheduler.max_concurrent_jobs, 1);
        assert_eq!(cfg.credentials.store, CredentialStoreKind::Env);
        assert!(cfg.engine_path().is_none());
    }
}
