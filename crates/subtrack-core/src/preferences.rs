//! User preference persistence
//!
//! Stores non-sensitive user preferences in the general storage category as
//! a single JSON value. Preferences are non-critical: loading falls back to
//! defaults whenever nothing usable is stored.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::{KeyValueStore, Storage};

/// Storage key for the persisted preferences
const PREFERENCES_KEY: &str = "preferences";

/// Color theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Follow the OS color scheme
    #[default]
    System,
    Light,
    Dark,
}

/// Day the weekly spending report goes out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportDay {
    #[default]
    Monday,
    Friday,
}

/// Renewal reminder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderSettings {
    /// Days before a subscription renews to send the reminder
    pub renewal_lead_days: u8,
    /// Day of week for the summary report
    pub weekly_report_day: ReportDay,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            renewal_lead_days: 3,
            weekly_report_day: ReportDay::Monday,
        }
    }
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Preferences format version
    pub version: u32,
    /// Color theme selection
    pub theme_mode: ThemeMode,
    /// ISO 4217 display currency
    pub currency: String,
    /// Renewal reminder configuration
    pub reminders: ReminderSettings,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: 1,
            theme_mode: ThemeMode::System,
            currency: "USD".to_string(),
            reminders: ReminderSettings::default(),
        }
    }
}

/// Preference persistence over the general storage category
pub struct PreferencesStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferencesStore {
    /// Create a preferences store over the storage adapter's general category
    pub fn new(storage: &Storage) -> Self {
        Self {
            store: storage.general_store(),
        }
    }

    /// Create a preferences store over an explicit backend (for tests)
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load preferences, using defaults when none are stored
    pub async fn load(&self) -> Result<Preferences> {
        match self.store.get(PREFERENCES_KEY).await? {
            Some(json) => {
                let prefs = serde_json::from_str(&json)?;
                debug!("Loaded preferences");
                Ok(prefs)
            }
            None => {
                debug!("No stored preferences, using defaults");
                Ok(Preferences::default())
            }
        }
    }

    /// Load preferences, absorbing every failure into defaults
    ///
    /// Fails open: preferences are non-critical, so a corrupt value or a
    /// failing backend must never take a screen down.
    pub async fn load_or_default(&self) -> Preferences {
        match self.load().await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("Failed to load preferences, using defaults: {}", e);
                Preferences::default()
            }
        }
    }

    /// Persist preferences
    pub async fn save(&self, prefs: &Preferences) -> Result<()> {
        let json = serde_json::to_string(prefs)?;
        self.store.set(PREFERENCES_KEY, &json).await?;
        debug!("Saved preferences");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;
    use tempfile::TempDir;

    async fn file_backed_prefs() -> (PreferencesStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open_dir(temp_dir.path().to_path_buf())
            .await
            .unwrap();
        (PreferencesStore::with_store(Arc::new(store)), temp_dir)
    }

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let (prefs, _dir) = file_backed_prefs().await;

        let loaded = prefs.load().await.unwrap();
        assert_eq!(loaded, Preferences::default());
        assert_eq!(loaded.theme_mode, ThemeMode::System);
        assert_eq!(loaded.currency, "USD");
        assert_eq!(loaded.reminders.renewal_lead_days, 3);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (prefs, _dir) = file_backed_prefs().await;

        let mut p = Preferences::default();
        p.theme_mode = ThemeMode::Dark;
        p.currency = "EUR".to_string();
        p.reminders.renewal_lead_days = 7;
        p.reminders.weekly_report_day = ReportDay::Friday;
        prefs.save(&p).await.unwrap();

        let loaded = prefs.load().await.unwrap();
        assert_eq!(loaded, p);
    }

    #[tokio::test]
    async fn test_corrupt_value_falls_back_to_defaults() {
        let (prefs, _dir) = file_backed_prefs().await;

        prefs
            .store
            .set(PREFERENCES_KEY, "not-json{")
            .await
            .unwrap();

        assert!(prefs.load().await.is_err());
        assert_eq!(prefs.load_or_default().await, Preferences::default());
    }

    #[tokio::test]
    async fn test_missing_fields_take_defaults() {
        let (prefs, _dir) = file_backed_prefs().await;

        prefs
            .store
            .set(PREFERENCES_KEY, r#"{"themeMode":"dark"}"#)
            .await
            .unwrap();

        let loaded = prefs.load().await.unwrap();
        assert_eq!(loaded.theme_mode, ThemeMode::Dark);
        assert_eq!(loaded.currency, "USD");
    }
}
