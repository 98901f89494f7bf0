// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, executable: bool },
    Dir,
}

/// In-memory filesystem for tests.
///
/// Paths are stored as given; `canonicalize` returns them unchanged, so tests
/// should use absolute paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    /// Paths whose permissions cannot be changed.
    locked: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert_file(path.as_ref(), content.into(), false);
    }

    pub fn add_executable(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.insert_file(path.as_ref(), content.into(), true);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        Self::ensure_dirs(&mut entries, path.as_ref());
    }

    /// Make `make_executable` fail for this path, as if we didn't own it.
    pub fn lock_permissions(&self, path: impl AsRef<Path>) {
        self.locked.lock().unwrap().insert(path.as_ref().to_path_buf());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.entries.lock().unwrap().get(path.as_ref()) {
            Some(MockEntry::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    fn insert_file(&self, path: &Path, content: Vec<u8>, executable: bool) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_dirs(&mut entries, parent);
        }
        entries.insert(path.to_path_buf(), MockEntry::File { content, executable });
    }

    fn ensure_dirs(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MockEntry::File { content, .. }) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let executable = matches!(
            self.entries.lock().unwrap().get(path),
            Some(MockEntry::File { executable: true, .. })
        );
        self.insert_file(path, contents.to_vec(), executable);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(
            self.entries.lock().unwrap().get(path),
            Some(MockEntry::File { .. })
        )
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MockEntry::Dir))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if self.exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("File not found: {:?}", path))
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if self.is_file(path) {
            return Err(anyhow!("Is a file: {:?}", path));
        }
        self.add_dir(path);
        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        matches!(
            self.entries.lock().unwrap().get(path),
            Some(MockEntry::File { executable: true, .. })
        )
    }

    fn make_executable(&self, path: &Path) -> Result<()> {
        if self.locked.lock().unwrap().contains(path) {
            return Err(anyhow!("Operation not permitted: {:?}", path));
        }
        let mut entries = self.entries.lock().unwrap();
        match entries.get_mut(path) {
            Some(MockEntry::File { executable, .. }) => {
                *executable = true;
                Ok(())
            }
            Some(MockEntry::Dir) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn make_private(&self, path: &Path) -> Result<()> {
        if self.is_file(path) {
            Ok(())
        } else {
            Err(anyhow!("File not found: {:?}", path))
        }
    }
}
