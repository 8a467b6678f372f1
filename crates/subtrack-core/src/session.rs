//! Auth session persistence
//!
//! Stores the signed-in user's session tokens in the secure storage
//! category. On platforms without a real secure store the category never
//! persists, so users simply re-authenticate - tokens are never downgraded
//! to plain storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::error::Result;
use crate::storage::{KeyValueStore, Storage};

/// Storage key for the persisted session
const SESSION_KEY: &str = "auth.session";

/// Persisted auth session
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token for API calls
    pub access_token: String,
    /// Token used to obtain a fresh access token
    pub refresh_token: Option<String>,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.access_token.zeroize();
        if let Some(token) = self.refresh_token.as_mut() {
            token.zeroize();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session persistence over the secure storage category
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Create a session store over the storage adapter's secure category
    pub fn new(storage: &Storage) -> Self {
        Self {
            store: storage.secure_store(),
        }
    }

    /// Create a session store over an explicit backend (for tests)
    pub fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persist a session
    pub async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.store.set(SESSION_KEY, &json).await?;
        debug!("Saved session expiring at {}", session.expires_at);
        Ok(())
    }

    /// Load the persisted session, if any
    ///
    /// An expired session is removed and reported as absent. Backend
    /// failures are surfaced; a failing secure store means the caller must
    /// treat the user as unauthenticated rather than guess.
    pub async fn load(&self) -> Result<Option<Session>> {
        let json = match self.store.get(SESSION_KEY).await? {
            Some(json) => json,
            None => return Ok(None),
        };

        let session: Session = serde_json::from_str(&json)?;

        if session.is_expired() {
            debug!("Session expired, removing");
            self.clear().await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Remove the persisted session
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(SESSION_KEY).await
    }

    /// Whether a live session exists
    ///
    /// Fails closed: any storage failure reads as unauthenticated.
    pub async fn is_authenticated(&self) -> bool {
        match self.load().await {
            Ok(session) => session.is_some(),
            Err(e) => {
                warn!("Session load failed, treating as unauthenticated: {}", e);
                false
            }
        }
    }
}
