use tracing::{info, warn};

use super::ApiClient;
use crate::error::ClientError;
use crate::models::{LoginRequest, RegisterRequest, TokenResponse, User};

impl ApiClient {
    /// Exchanges credentials for a bearer token and holds it for all later
    /// calls. Nothing is stored when the backend rejects the login or
    /// answers with an empty token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let token: TokenResponse = self.post("/auth/login", &body).await?;
        if token.access_token.is_empty() {
            return Err(ClientError::Decode("login response has an empty access_token".to_string()));
        }
        self.session.set(&token.access_token).await?;
        info!("logged in as {}", email);
        Ok(())
    }

    /// Creates an account. Does not log in; callers that want a session
    /// call [`ApiClient::login`] afterwards.
    pub async fn register(&self, data: &RegisterRequest) -> Result<User, ClientError> {
        self.post("/auth/register", data).await
    }

    /// Best-effort server-side logout followed by an unconditional local
    /// clear. Only a failure to clear the credential store is returned.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Err(e) = self.post_empty::<serde_json::Value>("/auth/logout").await {
            warn!("logout request failed, clearing local session anyway: {}", e);
        }
        self.clear_auth().await?;
        info!("logged out");
        Ok(())
    }

    /// Fails with a 401-class [`crate::ApiError`] when the credential is
    /// missing or no longer accepted.
    pub async fn get_current_user(&self) -> Result<User, ClientError> {
        self.get("/auth/me").await
    }
}
