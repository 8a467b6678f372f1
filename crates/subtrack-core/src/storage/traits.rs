//! Storage trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Trait for key-value storage backends
///
/// Keys and values are opaque strings; callers serialize structured data
/// before storing it. Absent keys are `Ok(None)`, never errors, and removing
/// an absent key succeeds.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value stored under `key`, or `None` if absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Persist `value` under `key`, overwriting any prior value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the entry for `key`; a no-op if the key is absent
    async fn remove(&self, key: &str) -> Result<()>;

    /// Delete every entry this store manages
    async fn clear(&self) -> Result<()>;

    /// List all currently stored keys; order is unspecified
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Whether this backend is backed by a real secure mechanism
    fn is_secure(&self) -> bool;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}
