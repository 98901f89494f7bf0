// src/credentials/file.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::CredentialProvider;
use crate::errors::{Result, StoryjobsError};
use crate::fs::FileSystem;

/// Credentials kept as `name = "value"` pairs in a TOML file that only its
/// owner can read.
#[derive(Debug)]
pub struct FileCredentialProvider {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileCredentialProvider {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.fs.exists(&self.path) {
            return Ok(BTreeMap::new());
        }
        let contents = self.fs.read_to_string(&self.path)?;
        let values: BTreeMap<String, String> = toml::from_str(&contents)?;
        Ok(values)
    }

    fn store(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let contents = toml::to_string(values)?;
        self.fs.write(&self.path, contents.as_bytes())?;
        self.fs.make_private(&self.path).map_err(|e| {
            StoryjobsError::CredentialError(format!(
                "could not restrict permissions of {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| {
            StoryjobsError::CredentialError(format!(
                "credential file lock poisoned for {}",
                self.path.display()
            ))
        })?;
        let mut values = self.load()?;
        f(&mut values);
        self.store(&values)
    }
}

impl CredentialProvider for FileCredentialProvider {
    fn get(&self, name: &str) -> Option<String> {
        match self.load() {
            Ok(mut values) => values.remove(name).filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read credential file");
                None
            }
        }
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return self.delete(name);
        }
        debug!(name, path = %self.path.display(), "storing credential");
        self.update(|values| {
            values.insert(name.to_string(), value.to_string());
        })
    }

    fn delete(&self, name: &str) -> Result<()> {
        debug!(name, path = %self.path.display(), "deleting credential");
        self.update(|values| {
            values.remove(name);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn round_trips_through_the_file() {
        let fs = MockFileSystem::new();
        let store = FileCredentialProvider::new(Arc::new(fs.clone()), "/home/u/.config/creds.toml");

        assert_eq!(store.get("OPENAI_API_KEY"), None);
        store.set("OPENAI_API_KEY", " sk-123 ").unwrap();
        assert_eq!(store.get("OPENAI_API_KEY").as_deref(), Some("sk-123"));

        let raw = String::from_utf8(fs.contents("/home/u/.config/creds.toml").unwrap()).unwrap();
        assert!(raw.contains("OPENAI_API_KEY"));

        store.set("OPENAI_API_KEY", "").unwrap();
        assert_eq!(store.get("OPENAI_API_KEY"), None);
    }

    #[test]
    fn corrupt_file_reads_as_missing() {
        let fs = MockFileSystem::new();
        fs.add_file("/creds.toml", "not = [valid");
        let store = FileCredentialProvider::new(Arc::new(fs), "/creds.toml");
        assert_eq!(store.get("OPENAI_API_KEY"), None);
        assert!(store.set("OPENAI_API_KEY", "x").is_err());
    }
}
