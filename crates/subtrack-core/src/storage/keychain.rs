//! OS keychain storage backend
//!
//! Uses the system keychain for the secure category:
//! - macOS: Keychain
//! - Windows: Credential Manager (DPAPI)
//! - Linux: Secret Service (GNOME Keyring, KWallet)
//!
//! OS keychains cannot enumerate their entries, so this backend keeps an
//! index of stored keys under a reserved entry to support `list_keys` and
//! `clear`.

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use super::{validate_key, KeyValueStore};
use crate::error::{Result, StoreError};

/// Service name used for keychain entries
const SERVICE_NAME: &str = "subtrack";

/// Reserved entry holding the JSON list of stored keys
const INDEX_KEY: &str = "__keys__";

/// OS keychain storage backend
pub struct KeychainStore {
    /// Service name for keychain entries (namespacing)
    service: String,
    /// Whether the keychain is available
    available: bool,
}

impl KeychainStore {
    /// Create a new keychain store using the default service name
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Create a new keychain store with a custom service name
    pub fn with_service(service: &str) -> Self {
        let available = Self::test_availability(service);

        if available {
            debug!("Keychain storage is available");
        } else {
            warn!("Keychain storage is not available on this host");
        }

        Self {
            service: service.to_string(),
            available,
        }
    }

    /// Test if the keychain is available
    fn test_availability(service: &str) -> bool {
        let test_entry = Entry::new(service, "__test_availability__");
        match test_entry {
            Ok(entry) => {
                // Try to set and delete a test value
                let result = entry.set_password("test");
                if result.is_ok() {
                    let _ = entry.delete_password();
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        }
    }

    /// Get a keyring entry for a key
    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).map_err(|e| StoreError::KeychainError(e.to_string()))
    }

    /// Check if the keychain is backed by a real secure mechanism
    pub fn is_available(&self) -> bool {
        self.available
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::SecureUnavailable)
        }
    }

    /// Reject keys that would collide with the reserved index entry
    fn check_key(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        if key == INDEX_KEY {
            return Err(StoreError::InvalidKey(format!("{} is reserved", key)));
        }
        Ok(())
    }

    /// Read the key index; an absent index means no keys are stored
    fn read_index(&self) -> Result<Vec<String>> {
        let entry = self.entry(INDEX_KEY)?;
        match entry.get_password() {
            Ok(json) => {
                let keys: Vec<String> = serde_json::from_str(&json)?;
                Ok(keys)
            }
            Err(keyring::Error::NoEntry) => Ok(Vec::new()),
            Err(e) => Err(StoreError::KeychainError(e.to_string())),
        }
    }

    /// Write the key index, removing the entry when it becomes empty
    fn write_index(&self, keys: &[String]) -> Result<()> {
        let entry = self.entry(INDEX_KEY)?;
        if keys.is_empty() {
            match entry.delete_password() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(StoreError::KeychainError(e.to_string())),
            }
        } else {
            let json = serde_json::to_string(keys)?;
            entry
                .set_password(&json)
                .map_err(|e| StoreError::KeychainError(e.to_string()))
        }
    }

    fn index_add(&self, key: &str) -> Result<()> {
        let mut keys = self.read_index()?;
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
            self.write_index(&keys)?;
        }
        Ok(())
    }

    fn index_remove(&self, key: &str) -> Result<()> {
        let mut keys = self.read_index()?;
        let before = keys.len();
        keys.retain(|k| k != key);
        if keys.len() != before {
            self.write_index(&keys)?;
        }
        Ok(())
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for KeychainStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_key(key)?;
        self.ensure_available()?;

        let entry = self.entry(key)?;

        match entry.get_password() {
            Ok(value) => {
                debug!("Retrieved key from keychain: {}", key);
                Ok(Some(value))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("Key not found in keychain: {}", key);
                Ok(None)
            }
            Err(e) => Err(StoreError::KeychainError(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_key(key)?;
        self.ensure_available()?;

        let entry = self.entry(key)?;
        entry
            .set_password(value)
            .map_err(|e| StoreError::KeychainError(e.to_string()))?;

        self.index_add(key)?;

        debug!("Stored key in keychain: {}", key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_key(key)?;
        self.ensure_available()?;

        let entry = self.entry(key)?;

        match entry.delete_password() {
            Ok(()) => {
                self.index_remove(key)?;
                debug!("Deleted key from keychain: {}", key);
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                // Key doesn't exist, that's fine
                self.index_remove(key)?;
                Ok(())
            }
            Err(e) => Err(StoreError::KeychainError(e.to_string())),
        }
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_available()?;

        let keys = self.read_index()?;
        for key in &keys {
            let entry = self.entry(key)?;
            match entry.delete_password() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(StoreError::KeychainError(e.to_string())),
            }
        }
        self.write_index(&[])?;

        debug!("Cleared {} keychain entries", keys.len());
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        self.ensure_available()?;
        self.read_index()
    }

    fn is_secure(&self) -> bool {
        // OS keychains use OS-level protection (DPAPI on Windows, Secure
        // Enclave-backed Keychain on macOS, Secret Service on Linux)
        self.available
    }

    fn backend_name(&self) -> &'static str {
        #[cfg(target_os = "macos")]
        return "macOS Keychain";

        #[cfg(target_os = "windows")]
        return "Windows Credential Manager";

        #[cfg(target_os = "linux")]
        return "Linux Secret Service";

        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        return "System Keychain";
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keychain_availability() {
        let storage = KeychainStore::with_service("subtrack-test");
        // Just check that we can query availability without panicking
        let _ = storage.is_available();
    }

    #[tokio::test]
    async fn test_unavailable_keychain_reports_errors() {
        let storage = KeychainStore::with_service("subtrack-test");
        if storage.is_available() {
            // Host has a real keychain; the unavailable path can't be exercised here
            return;
        }

        assert!(matches!(
            storage.get("token").await,
            Err(StoreError::SecureUnavailable)
        ));
        assert!(matches!(
            storage.set("token", "v").await,
            Err(StoreError::SecureUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_reserved_index_key_rejected() {
        let storage = KeychainStore::with_service("subtrack-test");
        assert!(matches!(
            storage.get(INDEX_KEY).await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
