//! File-backed key-value store.

use super::atomic_json::{AtomicJsonError, AtomicJsonFile};
use async_trait::async_trait;
use regent_core::error::{RegentError, Result};
use regent_core::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

type StorageMap = BTreeMap<String, String>;

/// All keys in one JSON object file.
///
/// A file that fails to parse is treated as empty: reads see no keys and the
/// next write replaces it. Blocking file I/O runs on the blocking pool.
#[derive(Clone)]
pub struct FileKeyValueStore {
    file: Arc<AtomicJsonFile<StorageMap>>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path)),
        }
    }

    async fn read_map(&self) -> Result<StorageMap> {
        let file = Arc::clone(&self.file);
        let loaded = tokio::task::spawn_blocking(move || file.load())
            .await
            .map_err(|e| RegentError::internal(format!("Storage task failed: {}", e)))?;

        match loaded {
            Ok(map) => Ok(map.unwrap_or_default()),
            Err(AtomicJsonError::JsonError(err)) => {
                tracing::warn!(
                    "[FileKeyValueStore] {} is corrupt, treating as empty: {}",
                    self.file.path().display(),
                    err
                );
                Ok(StorageMap::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn write_map<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut StorageMap) + Send + 'static,
    {
        let file = Arc::clone(&self.file);
        let result = tokio::task::spawn_blocking(move || {
            let path = file.path().display().to_string();
            file.update(
                StorageMap::new(),
                |err| match err {
                    AtomicJsonError::JsonError(e) => {
                        tracing::warn!("[FileKeyValueStore] Overwriting corrupt {}: {}", path, e);
                        Some(StorageMap::new())
                    }
                    _ => None,
                },
                |map| {
                    f(map);
                    Ok(())
                },
            )
        })
        .await
        .map_err(|e| RegentError::internal(format!("Storage task failed: {}", e)))?;

        result.map_err(Into::into)
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.write_map(move |map| {
            map.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.write_map(move |map| {
            map.remove(&key);
        })
        .await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.write_map(move |map| {
            for key in &keys {
                map.remove(key);
            }
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read_map().await?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");

        let store = FileKeyValueStore::new(path.clone());
        store.set("regent_session_id", "s-42".to_string()).await.unwrap();

        let reopened = FileKeyValueStore::new(path);
        assert_eq!(
            reopened.get("regent_session_id").await.unwrap().as_deref(),
            Some("s-42")
        );
    }

    #[tokio::test]
    async fn test_remove_many_leaves_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().join("storage.json"));

        store.set("a", "1".into()).await.unwrap();
        store.set("b", "2".into()).await.unwrap();
        store.set("c", "3".into()).await.unwrap();
        store.remove_many(&["a", "c", "missing"]).await.unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty_and_is_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.json");
        std::fs::write(&path, "{{{{").unwrap();

        let store = FileKeyValueStore::new(path);
        assert!(store.get("anything").await.unwrap().is_none());
        assert!(store.keys().await.unwrap().is_empty());

        store.set("k", "v".into()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
