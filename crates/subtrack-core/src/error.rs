//! Error types for subtrack-core

use thiserror::Error;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage error types
///
/// A missing key is not an error anywhere in this crate - lookups return
/// `Ok(None)` for keys that were never set or have been removed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Secure storage is not available on this platform")]
    SecureUnavailable,

    #[error("Keychain error: {0}")]
    KeychainError(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
