//! Cross-process lock around one source directory's ledger.
//!
//! Every invocation for a directory takes the exclusive lock before loading
//! the ledger and holds it until the transfer decision (and the transfer, if
//! any) has finished. Overlapping invocations therefore queue instead of
//! losing ledger updates or running the transfer twice.
//!
//! The lock file lives in the OS temp directory, keyed by a digest of the
//! source directory, so it never ends up in the tree being copied or removed.
//! Lock files of directories that still exist are kept for the next
//! invocation; once a transfer has removed the source directory its lock file
//! is deleted with [`DirectoryLock::discard_if_orphaned`].

use fd_lock::{RwLock, RwLockWriteGuard};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while acquiring a directory lock.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("Failed to open lock file: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to acquire lock: {path}")]
    Acquire {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Returns the lock file path used for `dir`.
pub fn lock_path_for(dir: &Path) -> PathBuf {
    let canonical = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
    let hex = format!("{:x}", digest);
    std::env::temp_dir().join(format!("rawsync-{}.lock", &hex[..16]))
}

/// Advisory exclusive lock for a source directory.
#[derive(Debug)]
pub struct DirectoryLock {
    lock: RwLock<File>,
    path: PathBuf,
}

impl DirectoryLock {
    /// Opens (creating if needed) the lock file for `dir`. Does not lock yet.
    pub fn for_directory(dir: &Path) -> Result<Self, LockError> {
        Self::open(lock_path_for(dir))
    }

    /// Opens (creating if needed) the lock file at `path`.
    pub fn open(path: PathBuf) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::Open {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self {
            lock: RwLock::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks until the exclusive lock is held. Released when the guard drops.
    pub fn acquire(&mut self) -> Result<RwLockWriteGuard<'_, File>, LockError> {
        let path = self.path.clone();
        self.lock
            .write()
            .map_err(|e| LockError::Acquire { path, source: e })
    }

    /// Takes the lock if it is free. `Ok(None)` means another holder has it.
    pub fn try_acquire(&mut self) -> Result<Option<RwLockWriteGuard<'_, File>>, LockError> {
        let path = self.path.clone();
        match self.lock.try_write() {
            Ok(guard) => Ok(Some(guard)),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(LockError::Acquire { path, source: e }),
        }
    }

    /// Closes the lock and deletes its file when `dir` no longer exists.
    ///
    /// Call only after the guard has been dropped. Returns whether the file
    /// was removed.
    pub fn discard_if_orphaned(self, dir: &Path) -> bool {
        if dir.exists() {
            return false;
        }

        let Self { lock, path } = self;
        drop(lock);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(lock = %path.display(), "Removed lock file of deleted directory");
                true
            }
            Err(e) => {
                tracing::warn!(lock = %path.display(), error = %e, "Failed to remove lock file");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_is_stable_and_outside_dir() {
        let dir = TempDir::new().unwrap();
        let a = lock_path_for(dir.path());
        let b = lock_path_for(dir.path());
        assert_eq!(a, b);
        assert!(!a.starts_with(dir.path()));
        assert!(a.file_name().unwrap().to_string_lossy().starts_with("rawsync-"));
    }

    #[test]
    fn test_distinct_dirs_get_distinct_locks() {
        let one = TempDir::new().unwrap();
        let two = TempDir::new().unwrap();
        assert_ne!(lock_path_for(one.path()), lock_path_for(two.path()));
    }

    #[test]
    fn test_second_holder_is_refused() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dir.lock");

        let mut first = DirectoryLock::open(path.clone()).unwrap();
        let mut second = DirectoryLock::open(path).unwrap();

        let guard = first.acquire().unwrap();
        assert!(second.try_acquire().unwrap().is_none());
        drop(guard);
        assert!(second.try_acquire().unwrap().is_some());
    }

    #[test]
    fn test_discard_keeps_lock_of_existing_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dir.lock");
        let lock = DirectoryLock::open(path.clone()).unwrap();

        assert!(!lock.discard_if_orphaned(temp.path()));
        assert!(path.exists());
    }

    #[test]
    fn test_discard_removes_lock_of_deleted_dir() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("run");
        std::fs::create_dir(&source).unwrap();
        let path = temp.path().join("run.lock");

        let mut lock = DirectoryLock::open(path.clone()).unwrap();
        drop(lock.acquire().unwrap());
        std::fs::remove_dir(&source).unwrap();

        assert!(lock.discard_if_orphaned(&source));
        assert!(!path.exists());
    }
}
