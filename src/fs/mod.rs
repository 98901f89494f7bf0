// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

pub mod mock;

/// Abstract filesystem interface.
///
/// Everything the command builder and the credential file store touch on
/// disk goes through this trait.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Whether any execute bit is set on the file.
    fn is_executable(&self, path: &Path) -> bool;

    /// Add the execute bits (`chmod +x`).
    fn make_executable(&self, path: &Path) -> Result<()>;

    /// Restrict the file to its owner (`chmod 600`).
    fn make_private(&self, path: &Path) -> Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
            }
        }
        let mut file = fs::File::create(path).with_context(|| format!("creating file {:?}", path))?;
        file.write_all(contents).with_context(|| format!("writing to file {:?}", path))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("canonicalizing {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[cfg(unix)]
    fn make_executable(&self, path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)
            .with_context(|| format!("reading permissions of {:?}", path))?
            .permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(path, perms).with_context(|| format!("chmod +x {:?}", path))
    }

    #[cfg(not(unix))]
    fn make_executable(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn make_private(&self, path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("chmod 600 {:?}", path))
    }

    #[cfg(not(unix))]
    fn make_private(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// View of another filesystem that reads through and drops every write.
///
/// Dry runs resolve commands through this so that repairing the execute bit
/// or creating the output directory only happens when a job really runs.
#[derive(Debug, Clone)]
pub struct DryRunFileSystem {
    inner: Arc<dyn FileSystem>,
}

impl DryRunFileSystem {
    pub fn new(inner: Arc<dyn FileSystem>) -> Self {
        Self { inner }
    }
}

impl FileSystem for DryRunFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.inner.read_to_string(path)
    }

    fn write(&self, path: &Path, _contents: &[u8]) -> Result<()> {
        debug!(path = %path.display(), "dry-run: skipping write");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        self.inner.canonicalize(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "dry-run: skipping create_dir_all");
        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        self.inner.is_executable(path)
    }

    fn make_executable(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "dry-run: skipping chmod +x");
        Ok(())
    }

    fn make_private(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "dry-run: skipping chmod 600");
        Ok(())
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn make_executable_sets_exec_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

        let real = RealFileSystem;
        assert!(!real.is_executable(&script));
        real.make_executable(&script).unwrap();
        assert!(real.is_executable(&script));
    }

    #[test]
    fn write_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c.toml");

        RealFileSystem.write(&nested, b"x = 1").unwrap();
        assert_eq!(RealFileSystem.read_to_string(&nested).unwrap(), "x = 1");
    }
}
