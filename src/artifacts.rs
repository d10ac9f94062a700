//! Transient audio artifact storage
//!
//! Synthesized replies and staged uploads are written as uniquely-named
//! files in a store-owned temporary directory. Every created artifact is
//! released exactly once: explicitly via [`ArtifactStore::release`], or
//! when the store is dropped at process teardown (the directory goes with
//! it).

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

use crate::{Error, Result};

/// Handle to one stored artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    id: String,
    path: PathBuf,
}

impl ArtifactHandle {
    /// Unique artifact identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Store for transient audio artifacts
pub struct ArtifactStore {
    dir: TempDir,
}

impl ArtifactStore {
    /// Create a store backed by a fresh temporary directory
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new() -> Result<Self> {
        let dir = TempDir::with_prefix("parley-")
            .map_err(|e| Error::Artifact(format!("failed to create artifact dir: {e}")))?;
        tracing::debug!(path = %dir.path().display(), "artifact store ready");
        Ok(Self { dir })
    }

    /// Write `bytes` as a new uniquely-named artifact
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn create(&self, bytes: &[u8], suffix: &str) -> Result<ArtifactHandle> {
        let id = Uuid::new_v4().to_string();
        let path = self.dir.path().join(format!("{id}{suffix}"));

        std::fs::write(&path, bytes)
            .map_err(|e| Error::Artifact(format!("failed to write artifact: {e}")))?;

        tracing::debug!(artifact = %id, bytes = bytes.len(), "artifact created");
        Ok(ArtifactHandle { id, path })
    }

    /// Read an artifact's bytes back
    ///
    /// # Errors
    ///
    /// Returns error if the artifact no longer exists or cannot be read
    pub fn read(&self, handle: &ArtifactHandle) -> Result<Vec<u8>> {
        std::fs::read(&handle.path)
            .map_err(|e| Error::Artifact(format!("failed to read artifact {}: {e}", handle.id)))
    }

    /// Number of artifact files currently on disk
    ///
    /// # Errors
    ///
    /// Returns error if the store directory cannot be listed
    pub fn live_count(&self) -> Result<usize> {
        let entries = std::fs::read_dir(self.dir.path())
            .map_err(|e| Error::Artifact(format!("failed to list artifact dir: {e}")))?;
        Ok(entries.count())
    }

    /// Delete an artifact's backing file
    ///
    /// A missing or already-deleted target is a no-op, so releasing the
    /// same handle twice is harmless.
    pub fn release(&self, handle: &ArtifactHandle) {
        match std::fs::remove_file(&handle.path) {
            Ok(()) => tracing::debug!(artifact = %handle.id, "artifact released"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(artifact = %handle.id, error = %e, "artifact release failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_read_roundtrip() {
        let store = ArtifactStore::new().unwrap();
        let handle = store.create(b"audio bytes", ".wav").unwrap();

        assert!(handle.path().exists());
        assert_eq!(store.read(&handle).unwrap(), b"audio bytes");
    }

    #[test]
    fn created_artifacts_are_uniquely_named() {
        let store = ArtifactStore::new().unwrap();
        let a = store.create(b"a", ".wav").unwrap();
        let b = store.create(b"b", ".wav").unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn release_removes_file() {
        let store = ArtifactStore::new().unwrap();
        let handle = store.create(b"x", ".wav").unwrap();

        store.release(&handle);
        assert!(!handle.path().exists());
    }

    #[test]
    fn release_is_idempotent() {
        let store = ArtifactStore::new().unwrap();
        let handle = store.create(b"x", ".wav").unwrap();

        store.release(&handle);
        store.release(&handle);
        assert!(!handle.path().exists());
    }

    #[test]
    fn read_after_release_fails() {
        let store = ArtifactStore::new().unwrap();
        let handle = store.create(b"x", ".wav").unwrap();

        store.release(&handle);
        assert!(store.read(&handle).is_err());
    }

    #[test]
    fn dropping_store_removes_remaining_artifacts() {
        let store = ArtifactStore::new().unwrap();
        let handle = store.create(b"leftover", ".wav").unwrap();
        let path = handle.path().to_path_buf();

        drop(store);
        assert!(!path.exists());
    }
}
