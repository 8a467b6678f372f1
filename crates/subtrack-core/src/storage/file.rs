//! Local file storage backend
//!
//! Stores the general category as a flat key-value JSON file in the user's
//! data directory. Writes are atomic (temp file + rename).

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{validate_key, KeyValueStore};
use crate::error::{Result, StoreError};

/// Local file storage backend
pub struct FileStore {
    /// Directory for storage files
    storage_dir: PathBuf,
    /// In-memory cache of the storage
    cache: Arc<RwLock<StoreCache>>,
}

/// In-memory representation of stored data
#[derive(Debug, Default)]
struct StoreCache {
    /// Map of key -> value
    entries: HashMap<String, String>,
    /// Whether the cache has been modified since last save
    dirty: bool,
}

/// File format for persistent storage
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// Create a file store in the default data directory and load existing data
    pub async fn open() -> Result<Self> {
        let storage_dir = Self::default_storage_dir()?;
        Self::open_dir(storage_dir).await
    }

    /// Create a file store in a custom directory (for testing)
    pub async fn open_dir(storage_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_dir)?;

        let store = Self {
            storage_dir,
            cache: Arc::new(RwLock::new(StoreCache::default())),
        };
        store.load().await?;

        debug!("File storage initialized at: {:?}", store.storage_dir);
        Ok(store)
    }

    /// Get the default storage directory
    fn default_storage_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "subtrack-app", "subtrack")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                StoreError::BackendError("Could not determine data directory".to_string())
            })
    }

    /// Get the path to the storage file
    fn storage_file_path(&self) -> PathBuf {
        self.storage_dir.join("store.json")
    }

    /// Get the storage directory path
    pub fn storage_dir(&self) -> &PathBuf {
        &self.storage_dir
    }

    /// Load storage from disk
    async fn load(&self) -> Result<()> {
        let path = self.storage_file_path();

        if !path.exists() {
            debug!("No existing storage file found");
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&path).await?;
        let file: StoreFile = serde_json::from_str(&contents)?;

        let mut cache = self.cache.write().await;
        cache.entries = file.entries;
        cache.dirty = false;

        debug!("Loaded {} entries from storage", cache.entries.len());
        Ok(())
    }

    /// Save storage to disk
    async fn save(&self) -> Result<()> {
        let cache = self.cache.read().await;

        if !cache.dirty {
            return Ok(());
        }

        let file = StoreFile {
            version: 1,
            entries: cache.entries.clone(),
        };

        let contents = serde_json::to_string_pretty(&file)?;
        let path = self.storage_file_path();

        // Write atomically using a temp file
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!("Saved {} entries to storage", cache.entries.len());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;

        let cache = self.cache.read().await;
        Ok(cache.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        let mut cache = self.cache.write().await;
        cache.entries.insert(key.to_string(), value.to_string());
        cache.dirty = true;
        drop(cache);

        self.save().await?;

        debug!("Stored key: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        let mut cache = self.cache.write().await;

        if cache.entries.remove(key).is_some() {
            cache.dirty = true;
            drop(cache);
            self.save().await?;
            debug!("Deleted key: {}", key);
        }

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.entries.clear();
        cache.dirty = true;
        drop(cache);

        self.save().await?;
        debug!("Cleared all entries");
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let cache = self.cache.read().await;
        Ok(cache.entries.keys().cloned().collect())
    }

    fn is_secure(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "Local File Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open_dir(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (store, _dir) = test_store().await;

        store.set("test-key", "test-value").await.unwrap();

        let retrieved = store.get("test-key").await.unwrap();
        assert_eq!(retrieved, Some("test-value".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let (store, _dir) = test_store().await;

        let retrieved = store.get("nonexistent").await.unwrap();
        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let (store, _dir) = test_store().await;

        store.set("test-key", "first").await.unwrap();
        store.set("test-key", "second").await.unwrap();

        let retrieved = store.get("test-key").await.unwrap();
        assert_eq!(retrieved, Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_remove() {
        let (store, _dir) = test_store().await;

        store.set("test-key", "test-value").await.unwrap();
        store.remove("test-key").await.unwrap();

        let retrieved = store.get("test-key").await.unwrap();
        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_remove_absent_is_ok() {
        let (store, _dir) = test_store().await;

        store.remove("never-set").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_keys() {
        let (store, _dir) = test_store().await;

        store.set("pref:theme", "dark").await.unwrap();
        store.set("pref:currency", "USD").await.unwrap();

        let mut keys = store.list_keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["pref:currency", "pref:theme"]);
    }

    #[tokio::test]
    async fn test_clear() {
        let (store, _dir) = test_store().await;

        store.set("key1", "value1").await.unwrap();
        store.set("key2", "value2").await.unwrap();

        store.clear().await.unwrap();

        let keys = store.list_keys().await.unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let (store, _dir) = test_store().await;

        assert!(matches!(
            store.set("", "value").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get("").await, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();

        // Create store and persist data
        {
            let store = FileStore::open_dir(temp_dir.path().to_path_buf())
                .await
                .unwrap();
            store.set("persistent-key", "persistent-value").await.unwrap();
        }

        // Create new store instance and verify data persists
        {
            let store = FileStore::open_dir(temp_dir.path().to_path_buf())
                .await
                .unwrap();

            let retrieved = store.get("persistent-key").await.unwrap();
            assert_eq!(retrieved, Some("persistent-value".to_string()));
        }
    }
}
