use crate::domain::backend::TokenStorage;
use crate::domain::error::StoreError;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

/// Process-local storage. Used by tests and by hosts that do not want
/// sessions to survive a restart.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    #[instrument(skip(self, value), fields(key = key))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        trace!("Acquiring write lock for storage");
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        debug!(key = key, "Value persisted to memory storage");
        Ok(())
    }

    #[instrument(skip(self), fields(key = key))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!("Acquiring read lock for storage");
        let entries = self.entries.read().await;
        let value = entries.get(key).cloned();
        trace!(key = key, found = value.is_some(), "Storage lookup");
        Ok(value)
    }

    #[instrument(skip(self), fields(key = key))]
    async fn remove(&self, key: &str) -> Result<()> {
        trace!("Acquiring write lock for storage");
        let mut entries = self.entries.write().await;
        let removed = entries.remove(key).is_some();
        debug!(key = key, removed = removed, "Key removed from memory storage");
        Ok(())
    }
}

/// Durable storage backed by a single JSON document on disk.
///
/// Every write re-reads and rewrites the whole document; concurrent writers
/// are last-write-wins, matching browser local-storage semantics.
#[derive(Clone)]
pub struct FileStorage {
    path: PathBuf,
    lock: Arc<RwLock<()>>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(RwLock::new(())),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::Storage(format!(
                    "corrupt storage file {}: {e}",
                    self.path.display()
                ))
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(StoreError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))
            .into()),
        }
    }

    async fn store(&self, entries: &HashMap<String, String>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| StoreError::Storage(format!("failed to encode storage: {e}")))?;
        tokio::fs::write(&self.path, bytes).await.map_err(|e| {
            StoreError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for FileStorage {
    #[instrument(skip(self, value), fields(key = key))]
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries).await?;
        debug!(key = key, path = %self.path.display(), "Value persisted to file storage");
        Ok(())
    }

    #[instrument(skip(self), fields(key = key))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.read().await;
        let entries = self.load().await?;
        Ok(entries.get(key).cloned())
    }

    #[instrument(skip(self), fields(key = key))]
    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.store(&entries).await?;
            debug!(key = key, "Key removed from file storage");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::{TOKEN_EXPIRATION_KEY, TOKEN_KEY, USER_ID_KEY};

    #[tokio::test]
    async fn test_memory_storage_set_then_get() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "tok-1").await.unwrap();

        let value = storage.get(TOKEN_KEY).await.unwrap();
        assert_eq!(value.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_memory_storage_get_missing_key_returns_none() {
        let storage = MemoryStorage::new();
        assert!(storage.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_storage_set_overwrites() {
        let storage = MemoryStorage::new();
        storage.set(USER_ID_KEY, "u1").await.unwrap();
        storage.set(USER_ID_KEY, "u2").await.unwrap();

        assert_eq!(storage.get(USER_ID_KEY).await.unwrap().as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_memory_storage_remove() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "tok").await.unwrap();
        storage.remove(TOKEN_KEY).await.unwrap();

        assert!(storage.get(TOKEN_KEY).await.unwrap().is_none());
        // Removing again is fine
        storage.remove(TOKEN_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_storage_concurrent_writes() {
        let storage = MemoryStorage::new();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage.set(&format!("key-{}", i), &format!("value-{}", i)).await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        for i in 0..10 {
            let value = storage.get(&format!("key-{}", i)).await.unwrap();
            assert_eq!(value, Some(format!("value-{}", i)));
        }
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        storage.set(TOKEN_KEY, "tok").await.unwrap();
        storage.set(USER_ID_KEY, "u1").await.unwrap();

        assert_eq!(storage.get(TOKEN_KEY).await.unwrap().as_deref(), Some("tok"));
        assert_eq!(storage.get(USER_ID_KEY).await.unwrap().as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_file_storage_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));

        assert!(storage.get(TOKEN_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let storage = FileStorage::new(&path);
        storage.set(TOKEN_EXPIRATION_KEY, "12345").await.unwrap();
        drop(storage);

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.get(TOKEN_EXPIRATION_KEY).await.unwrap().as_deref(),
            Some("12345")
        );
    }

    #[tokio::test]
    async fn test_file_storage_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let storage = FileStorage::new(&path);
        storage.set(TOKEN_KEY, "tok").await.unwrap();
        storage.remove(TOKEN_KEY).await.unwrap();

        let reopened = FileStorage::new(&path);
        assert!(reopened.get(TOKEN_KEY).await.unwrap().is_none());
    }
}
