//! # subtrack-core
//!
//! Core functionality for the Subtrack subscription tracker including:
//! - Platform-adaptive key-value storage (OS keychain, local file, web store)
//!   with category-specific failure policies
//! - Auth session persistence over the secure category
//! - User preference persistence over the general category
//! - Skeleton display timing for loading screens

pub mod error;
pub mod loading;
pub mod platform;
pub mod preferences;
pub mod session;
pub mod storage;

pub use error::{Result, StoreError};
pub use loading::{GateState, LoadingGate, DEFAULT_MIN_LOADING_TIME};
pub use platform::Platform;
pub use preferences::{Preferences, PreferencesStore, ReminderSettings, ReportDay, ThemeMode};
pub use session::{Session, SessionStore};
pub use storage::{
    FileStore, KeyValueStore, KeychainStore, MemoryWebStorage, NoopSecureStore, Storage,
    WebLocalStore, WebStorage,
};
