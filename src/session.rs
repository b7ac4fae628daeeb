// MIT License - Copyright (c) 2026 Peter Wright
// Persisted session token

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{NxError, Result};

/// Single owner of the panel session token.
///
/// The token lives in memory for the process lifetime and in a one-line file
/// so that restarts can reuse it. Once a value has been loaded or set, the
/// in-memory copy is authoritative and the file is not read again.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    cached: Mutex<Option<String>>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current token, loading it from disk on first use.
    ///
    /// A missing file yields an empty token, cached like any other. Any other
    /// read failure is returned as [`NxError::SessionStorage`].
    pub async fn get(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                debug!("Loaded persisted session from {}", self.path.display());
                content.trim_end().to_string()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No persisted session at {}", self.path.display());
                String::new()
            }
            Err(source) => {
                return Err(NxError::SessionStorage {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        *cached = Some(token.clone());
        Ok(token)
    }

    /// Replace the token in memory and on disk.
    ///
    /// The file is written next to its final location and renamed over it.
    /// The in-memory value only changes once the durable copy is in place.
    pub async fn set(&self, token: &str) -> Result<()> {
        let mut cached = self.cached.lock().await;

        let tmp = self.tmp_path();
        let storage_err = |source| NxError::SessionStorage {
            path: self.path.clone(),
            source,
        };
        tokio::fs::write(&tmp, token).await.map_err(storage_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(storage_err)?;

        *cached = Some(token.to_string());
        Ok(())
    }

    /// Drop the in-memory copy; the next `get` reads the file again.
    pub async fn clear(&self) {
        *self.cached.lock().await = None;
    }

    /// Forget the token and delete the persisted copy.
    pub async fn remove(&self) -> Result<()> {
        let mut cached = self.cached.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(NxError::SessionStorage {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        *cached = None;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session"));
        assert_eq!(store.get().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_file_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        let store = SessionStore::new(&path);
        assert_eq!(store.get().await.unwrap(), "");

        // Written by someone else after the first load: not picked up
        std::fs::write(&path, "LATE").unwrap();
        assert_eq!(store.get().await.unwrap(), "");

        store.clear().await;
        assert_eq!(store.get().await.unwrap(), "LATE");
    }

    #[tokio::test]
    async fn test_set_persists_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        let store = SessionStore::new(&path);
        store.set("ABCDEF0123456789").await.unwrap();

        assert_eq!(store.get().await.unwrap(), "ABCDEF0123456789");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ABCDEF0123456789");
        assert!(!dir.path().join("session.tmp").exists());

        let reopened = SessionStore::new(&path);
        assert_eq!(reopened.get().await.unwrap(), "ABCDEF0123456789");
    }

    #[tokio::test]
    async fn test_cache_is_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        std::fs::write(&path, "first\n").unwrap();

        let store = SessionStore::new(&path);
        assert_eq!(store.get().await.unwrap(), "first");

        std::fs::write(&path, "second").unwrap();
        assert_eq!(store.get().await.unwrap(), "first");

        store.clear().await;
        assert_eq!(store.get().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session"));
        store.set("old").await.unwrap();
        store.set("").await.unwrap();
        assert_eq!(store.get().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("missing").join("session"));
        let err = store.set("token").await.unwrap_err();
        assert!(matches!(err, NxError::SessionStorage { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file.
        let store = SessionStore::new(dir.path());
        let err = store.get().await.unwrap_err();
        assert!(matches!(err, NxError::SessionStorage { .. }));
    }

    #[tokio::test]
    async fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        let store = SessionStore::new(&path);
        store.set("token").await.unwrap();
        store.remove().await.unwrap();
        assert!(!path.exists());
        assert_eq!(store.get().await.unwrap(), "");
        store.remove().await.unwrap();
    }
}
