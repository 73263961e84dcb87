//! Durable key-value storage backends.
//!
//! The backend is the injected port behind the conversation store: a file
//! per key on disk in production, a `HashMap` in tests.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Backend-agnostic durable key-value storage.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, overwriting any prior value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value under `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one file per key under a base directory.
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{key}.json"))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::WriteRejected {
                key: key.to_string(),
                source: e,
            })?;
        fs::write(self.path_for(key), value)
            .await
            .map_err(|e| StorageError::WriteRejected {
                key: key.to_string(),
                source: e,
            })
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Remove {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}

/// In-memory storage for tests and embedded use.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());

        assert_eq!(backend.get("conversation").await.unwrap(), None);

        backend.set("conversation", "[1,2]").await.unwrap();
        assert_eq!(
            backend.get("conversation").await.unwrap().as_deref(),
            Some("[1,2]")
        );

        backend.remove("conversation").await.unwrap();
        assert_eq!(backend.get("conversation").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_backend_remove_absent_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());
        backend.remove("never-written").await.unwrap();
    }

    #[tokio::test]
    async fn memory_backend_overwrites() {
        let backend = MemoryBackend::new();
        backend.set("k", "a").await.unwrap();
        backend.set("k", "b").await.unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("b"));
    }
}
