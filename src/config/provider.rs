// src/config/provider.rs

//! Read-only view of settings handed to the job core.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::model::ConfigFile;
use crate::credentials::{
    CredentialProvider, EnvCredentialProvider, FileCredentialProvider, MemoryCredentialProvider,
};
use crate::errors::{Result, StoryjobsError};
use crate::fs::FileSystem;
use crate::types::{API_KEY_NAME, CredentialStoreKind};

/// Settings the job core reads at dispatch time.
///
/// Implementations may change between calls (the user edits settings while
/// the process runs); the core takes a [`ConfigSnapshot`] per job.
pub trait ConfigProvider: Send + Sync + Debug {
    fn engine_path(&self) -> Option<String>;
    fn output_directory(&self) -> Option<String>;
    fn credential(&self, name: &str) -> Option<String>;
}

/// Point-in-time copy of everything the command builder needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub engine_path: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub api_key: Option<String>,
}

impl ConfigSnapshot {
    pub fn capture(provider: &dyn ConfigProvider) -> Self {
        let clean = |s: Option<String>| {
            s.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            engine_path: clean(provider.engine_path())
                .map(|p| crate::config::model::expand_tilde(&p)),
            output_directory: clean(provider.output_directory())
                .map(|p| crate::config::model::expand_tilde(&p)),
            api_key: provider.credential(API_KEY_NAME).filter(|k| !k.is_empty()),
        }
    }
}

/// Loaded config file plus the credential store it selects.
#[derive(Debug, Clone)]
pub struct AppConfig {
    file: ConfigFile,
    credentials: Arc<dyn CredentialProvider>,
}

impl AppConfig {
    pub fn new(file: ConfigFile, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { file, credentials }
    }

    /// Build the credential store named in `[credentials]`.
    pub fn from_config(file: ConfigFile, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let credentials: Arc<dyn CredentialProvider> = match file.credentials.store {
            CredentialStoreKind::Env => Arc::new(EnvCredentialProvider::new()),
            CredentialStoreKind::Memory => Arc::new(MemoryCredentialProvider::new()),
            CredentialStoreKind::File => {
                let path = file.credentials_file().ok_or_else(|| {
                    StoryjobsError::ConfigError(
                        "[credentials].store = \"file\" requires [credentials].file".to_string(),
                    )
                })?;
                Arc::new(FileCredentialProvider::new(fs, path))
            }
        };
        Ok(Self::new(file, credentials))
    }

    pub fn file(&self) -> &ConfigFile {
        &self.file
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }
}

impl ConfigProvider for AppConfig {
    fn engine_path(&self) -> Option<String> {
        self.file.engine.path.clone()
    }

    fn output_directory(&self) -> Option<String> {
        self.file.output.directory.clone()
    }

    fn credential(&self, name: &str) -> Option<String> {
        self.credentials.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn snapshot_trims_and_drops_blank_values() {
        let mut file = ConfigFile::default();
        file.engine.path = Some("  /opt/app/scripts/run.sh ".to_string());
        file.output.directory = Some("   ".to_string());
        let creds = MemoryCredentialProvider::new().with(API_KEY_NAME, "");
        let cfg = AppConfig::new(file, Arc::new(creds));

        let snap = ConfigSnapshot::capture(&cfg);
        assert_eq!(snap.engine_path, Some(PathBuf::from("/opt/app/scripts/run.sh")));
        assert_eq!(snap.output_directory, None);
        assert_eq!(snap.api_key, None);
    }

    #[test]
    fn file_store_selected_from_config() {
        let mut file = ConfigFile::default();
        file.credentials.store = CredentialStoreKind::File;
        file.credentials.file = Some("/creds.toml".to_string());

        let fs = MockFileSystem::new();
        let cfg = AppConfig::from_config(file, Arc::new(fs)).unwrap();
        cfg.credentials().set(API_KEY_NAME, "sk-live").unwrap();
        assert_eq!(cfg.credential(API_KEY_NAME).as_deref(), Some("sk-live"));
    }
}
