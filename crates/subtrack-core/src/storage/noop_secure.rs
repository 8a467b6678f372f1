//! Secure-category stand-in for platforms without a secure store
//!
//! Browser-hosted builds have no OS keychain, and writing secrets to plain
//! web storage would fake a security guarantee the platform cannot give.
//! This backend therefore never persists: reads are absent, writes succeed
//! without effect, and callers can detect the situation through
//! [`Storage::secure_available`](super::Storage::secure_available).

use async_trait::async_trait;
use tracing::debug;

use super::{validate_key, KeyValueStore};
use crate::error::Result;

/// Secure backend that never persists anything
pub struct NoopSecureStore;

#[async_trait]
impl KeyValueStore for NoopSecureStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(None)
    }

    async fn set(&self, key: &str, _value: &str) -> Result<()> {
        validate_key(key)?;
        debug!("No secure store on this platform, dropping write for {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn is_secure(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "No Secure Storage"
    }
}
