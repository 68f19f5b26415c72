use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ClientError;
use crate::store::TokenStore;

/// Whether a credential is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// In-memory mirror of the persisted bearer credential.
///
/// Reads go to the in-memory copy. Every change is written to the store
/// first and then mirrored, under a mutex so concurrent logins/logouts
/// cannot leave the two copies disagreeing.
pub struct Session {
    key: String,
    store: Arc<dyn TokenStore>,
    token: RwLock<Option<String>>,
    write_lock: Mutex<()>,
}

impl Session {
    /// Reads the stored credential once. A store that fails to answer is
    /// treated as holding nothing.
    pub async fn load(store: Arc<dyn TokenStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let token = match store.get(&key).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("failed to read stored credential: {}", e);
                None
            }
        };
        debug!(authenticated = token.is_some(), "session loaded");
        Self {
            key,
            store,
            token: RwLock::new(token),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.token().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub async fn set(&self, token: &str) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().await;
        self.store.set(&self.key, token).await?;
        self.replace(Some(token.to_string()));
        Ok(())
    }

    /// Always drops the in-memory credential; a store failure is reported
    /// after the fact.
    pub async fn clear(&self) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().await;
        self.replace(None);
        self.store.remove(&self.key).await
    }

    fn replace(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}
