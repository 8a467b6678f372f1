//! Platform-adaptive key-value storage
//!
//! Two storage categories with different failure policies sit behind one
//! async interface:
//! - secure: credentials and session tokens (OS keychain on native, a
//!   never-persisting stand-in on web)
//! - general: preferences and cache (local file on native, host web store
//!   on web)
//!
//! Backends are bound once per process by [`Storage::for_platform`] and never
//! re-selected. On native platforms both categories report backend failures
//! to the caller; on web the general category absorbs them and the secure
//! category refuses to persist at all.

mod file;
mod keychain;
mod noop_secure;
mod traits;
mod web;

pub use file::FileStore;
pub use keychain::KeychainStore;
pub use noop_secure::NoopSecureStore;
pub use traits::KeyValueStore;
pub use web::{MemoryWebStorage, WebLocalStore, WebStorage};

use std::sync::Arc;
use tracing::info;

use crate::error::{Result, StoreError};
use crate::platform::Platform;

/// Reject keys the contract forbids
///
/// An empty key is a caller bug, reported on every platform - including the
/// web general backend, which absorbs store failures but not misuse.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

/// Platform-adaptive storage adapter
///
/// Holds one backend per category, bound at construction. Consumers reach
/// the categories through [`secure`](Storage::secure) and
/// [`general`](Storage::general); all calls to the same category hit the
/// same backend for the life of the process.
///
/// Concurrent calls are not serialized: two overlapping writes to the same
/// key race and the last one to complete wins. Callers needing atomicity
/// serialize themselves.
pub struct Storage {
    secure: Arc<dyn KeyValueStore>,
    general: Arc<dyn KeyValueStore>,
    platform: Platform,
}

impl Storage {
    /// Bind backends for the detected platform
    ///
    /// On [`Platform::Web`] this falls back to an in-memory web store;
    /// browser embedders that have a real host binding should construct
    /// through [`Storage::web`] instead.
    pub async fn for_platform(platform: Platform) -> Result<Self> {
        match platform {
            Platform::Native => Self::native().await,
            Platform::Web => Ok(Self::web(Arc::new(MemoryWebStorage::new()))),
        }
    }

    /// Bind the native backends: OS keychain and local file store
    pub async fn native() -> Result<Self> {
        let secure = KeychainStore::new();
        let general = FileStore::open().await?;

        let storage = Self {
            secure: Arc::new(secure),
            general: Arc::new(general),
            platform: Platform::Native,
        };
        storage.log_binding();
        Ok(storage)
    }

    /// Bind the web backends over a host-provided synchronous store
    pub fn web(raw: Arc<dyn WebStorage>) -> Self {
        let storage = Self {
            secure: Arc::new(NoopSecureStore),
            general: Arc::new(WebLocalStore::new(raw)),
            platform: Platform::Web,
        };
        storage.log_binding();
        storage
    }

    /// Construct from explicit backends (dependency injection for tests)
    pub fn with_stores(
        secure: Arc<dyn KeyValueStore>,
        general: Arc<dyn KeyValueStore>,
        platform: Platform,
    ) -> Self {
        Self {
            secure,
            general,
            platform,
        }
    }

    fn log_binding(&self) {
        info!(
            "Storage bound: secure={}, general={}",
            self.secure.backend_name(),
            self.general.backend_name()
        );
    }

    /// The secure category (credentials, session tokens)
    pub fn secure(&self) -> &dyn KeyValueStore {
        self.secure.as_ref()
    }

    /// The general category (preferences, cache)
    pub fn general(&self) -> &dyn KeyValueStore {
        self.general.as_ref()
    }

    /// Shared handle to the secure backend
    pub fn secure_store(&self) -> Arc<dyn KeyValueStore> {
        self.secure.clone()
    }

    /// Shared handle to the general backend
    pub fn general_store(&self) -> Arc<dyn KeyValueStore> {
        self.general.clone()
    }

    /// Whether secure persistence is backed by a real secure mechanism
    ///
    /// False on web and on native hosts whose keychain probe failed. Callers
    /// should treat users as unauthenticated rather than downgrade secrets
    /// to an insecure backend.
    pub fn secure_available(&self) -> bool {
        self.secure.is_secure()
    }

    /// The platform the backends were bound for
    pub fn platform(&self) -> Platform {
        self.platform
    }
}
