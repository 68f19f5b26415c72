use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::{RegisterRequest, User};

/// Application-level view of who is logged in.
///
/// Caches the current [`User`] on top of an [`ApiClient`] and owns the
/// policy the client leaves to its callers: a stored credential that the
/// backend no longer accepts is cleared here.
pub struct AuthSession {
    client: Arc<ApiClient>,
    user: RwLock<Option<User>>,
}

impl AuthSession {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            user: RwLock::new(None),
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn current_user(&self) -> Option<User> {
        match self.user.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Resolves the stored credential into a user. Any failure clears it,
    /// since a session that is rejected or unreachable counts as logged out.
    pub async fn check_auth(&self) -> Option<User> {
        if !self.client.is_authenticated() {
            self.set_user(None);
            return None;
        }

        match self.client.get_current_user().await {
            Ok(user) => {
                self.set_user(Some(user.clone()));
                Some(user)
            }
            Err(e) => {
                warn!("could not resolve stored credential, clearing session: {}", e);
                if let Err(e) = self.client.clear_auth().await {
                    warn!("failed to clear credential store: {}", e);
                }
                self.set_user(None);
                None
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        self.client.login(email, password).await?;
        let user = self.client.get_current_user().await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Registers and then logs in with the same email and password.
    pub async fn register(&self, data: &RegisterRequest) -> Result<User, ClientError> {
        let created = self.client.register(data).await?;
        info!("registered user {}", created.id);
        self.login(&data.email, &data.password).await
    }

    /// Always ends with no credential and no cached user.
    pub async fn logout(&self) {
        if let Err(e) = self.client.logout().await {
            warn!("logout error: {}", e);
        }
        if let Err(e) = self.client.clear_auth().await {
            warn!("failed to clear credential store: {}", e);
        }
        self.set_user(None);
    }

    fn set_user(&self, user: Option<User>) {
        match self.user.write() {
            Ok(mut guard) => *guard = user,
            Err(poisoned) => *poisoned.into_inner() = user,
        }
    }
}
