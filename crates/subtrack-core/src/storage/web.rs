//! Web storage backend
//!
//! Browser-hosted builds have no OS store; the host environment exposes a
//! synchronous key-value store instead (the DOM `Storage` API). [`WebStorage`]
//! is that seam: the embedding layer supplies the real binding, and
//! [`MemoryWebStorage`] serves as the non-browser fallback and test double.
//!
//! [`WebLocalStore`] adapts a [`WebStorage`] to the async [`KeyValueStore`]
//! interface with the general-category failure policy: preferences are
//! non-critical, so underlying store failures (quota exceeded, storage
//! disabled) degrade to absent/success/empty instead of surfacing. Caller
//! bugs like an empty key are still reported.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use super::{validate_key, KeyValueStore};
use crate::error::Result;

/// Key prefix separating this app's entries from others sharing the store
const NAMESPACE_PREFIX: &str = "subtrack.";

/// Synchronous key-value store provided by the host environment
///
/// Shaped like the browser `Storage` API. Implementations report failures
/// (quota exceeded, storage disabled) as errors; the policy for handling
/// them belongs to the adapting layer.
pub trait WebStorage: Send + Sync {
    /// Get the value for `key`, or `None` if absent
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Set `key` to `value`
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` if present
    fn remove_item(&self, key: &str) -> Result<()>;

    /// List every key in the store, including foreign ones
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory [`WebStorage`] implementation
///
/// Used when no host store binding is supplied, and as a swappable fake in
/// tests. Contents do not survive the process.
#[derive(Default)]
pub struct MemoryWebStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryWebStorage {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WebStorage for MemoryWebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }
}

/// Web backend for the general category
///
/// Entries are namespaced under an app prefix so clearing never touches
/// foreign entries in a shared store.
pub struct WebLocalStore {
    raw: Arc<dyn WebStorage>,
    prefix: String,
}

impl WebLocalStore {
    /// Create a store over the given host storage binding
    pub fn new(raw: Arc<dyn WebStorage>) -> Self {
        Self {
            raw,
            prefix: NAMESPACE_PREFIX.to_string(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// List the namespaced keys currently in the raw store
    fn namespaced_keys(&self) -> Result<Vec<String>> {
        let keys = self.raw.keys()?;
        Ok(keys
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect())
    }
}

#[async_trait]
impl KeyValueStore for WebLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;

        match self.raw.get_item(&self.full_key(key)) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("Web storage read failed, treating {} as absent: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;

        if let Err(e) = self.raw.set_item(&self.full_key(key), value) {
            warn!("Web storage write failed, dropping {}: {}", key, e);
        } else {
            debug!("Stored key: {}", key);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;

        if let Err(e) = self.raw.remove_item(&self.full_key(key)) {
            warn!("Web storage remove failed for {}: {}", key, e);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match self.namespaced_keys() {
            Ok(keys) => {
                for key in keys {
                    if let Err(e) = self.raw.remove_item(&key) {
                        warn!("Web storage remove failed for {}: {}", key, e);
                    }
                }
            }
            Err(e) => warn!("Web storage clear failed: {}", e),
        }
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        match self.namespaced_keys() {
            Ok(keys) => Ok(keys
                .into_iter()
                .map(|k| k[self.prefix.len()..].to_string())
                .collect()),
            Err(e) => {
                warn!("Web storage key listing failed: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn is_secure(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "Web Local Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    /// Web storage that fails every operation, as a quota-exhausted or
    /// storage-disabled browser would
    struct FailingWebStorage;

    impl WebStorage for FailingWebStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(StoreError::BackendError("storage disabled".to_string()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(StoreError::BackendError("quota exceeded".to_string()))
        }

        fn remove_item(&self, _key: &str) -> Result<()> {
            Err(StoreError::BackendError("storage disabled".to_string()))
        }

        fn keys(&self) -> Result<Vec<String>> {
            Err(StoreError::BackendError("storage disabled".to_string()))
        }
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = WebLocalStore::new(Arc::new(MemoryWebStorage::new()));

        store.set("theme", "dark").await.unwrap();

        let retrieved = store.get("theme").await.unwrap();
        assert_eq!(retrieved, Some("dark".to_string()));
    }

    #[tokio::test]
    async fn test_remove_then_get_absent() {
        let store = WebLocalStore::new(Arc::new(MemoryWebStorage::new()));

        store.set("theme", "dark").await.unwrap();
        store.remove("theme").await.unwrap();

        assert_eq!(store.get("theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_spares_foreign_entries() {
        let raw = Arc::new(MemoryWebStorage::new());
        raw.set_item("other-app.token", "keep-me").unwrap();

        let store = WebLocalStore::new(raw.clone());
        store.set("theme", "dark").await.unwrap();
        store.set("currency", "USD").await.unwrap();

        store.clear().await.unwrap();

        assert!(store.list_keys().await.unwrap().is_empty());
        assert_eq!(
            raw.get_item("other-app.token").unwrap(),
            Some("keep-me".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_keys_strips_namespace() {
        let store = WebLocalStore::new(Arc::new(MemoryWebStorage::new()));

        store.set("theme", "dark").await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec!["theme"]);
    }

    #[tokio::test]
    async fn test_failures_are_absorbed() {
        let store = WebLocalStore::new(Arc::new(FailingWebStorage));

        // Writes resolve to success without effect
        store.set("theme", "dark").await.unwrap();
        store.remove("theme").await.unwrap();
        store.clear().await.unwrap();

        // Reads degrade to absent/empty
        assert_eq!(store.get("theme").await.unwrap(), None);
        assert!(store.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_key_still_rejected() {
        let store = WebLocalStore::new(Arc::new(FailingWebStorage));

        assert!(matches!(
            store.set("", "value").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
