//! Session-aware client for the learning platform REST API.
//!
//! Every call goes through [`ApiClient::authenticated_request`] (or the
//! multipart upload path), which attaches the held bearer credential,
//! applies the configured timeout and maps failures into [`ClientError`].
//! Nothing is retried.

mod assignments;
mod auth;
mod courses;
mod submissions;

use std::future::Future;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError};
use crate::session::{Session, SessionState};
use crate::store::TokenStore;

pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
    shutdown: CancellationToken,
}

impl ApiClient {
    /// Builds the transport and loads any stored credential. Does not touch
    /// the network.
    pub async fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build http client: {}", e)))?;
        let session = Session::load(store, config.token_key.clone()).await;

        Ok(Self {
            http,
            base_url: config.base_url,
            session,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// True iff a credential is held in memory.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Drops the credential from memory and from the store. Idempotent.
    pub async fn clear_auth(&self) -> Result<(), ClientError> {
        self.session.clear().await
    }

    /// Cancels every outstanding request. Later requests fail with
    /// [`ClientError::Cancelled`].
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Sends a JSON request to `base_url + path` and decodes the JSON reply.
    pub async fn authenticated_request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let cancel = self.shutdown.child_token();
        self.authenticated_request_with(method, path, body, &cancel).await
    }

    /// Like [`ApiClient::authenticated_request`], aborting with
    /// [`ClientError::Cancelled`] once `cancel` fires.
    pub async fn authenticated_request_with<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request_id = Uuid::new_v4();
        debug!(%request_id, %method, path, "sending request");

        let mut request = self
            .authorized(self.http.request(method, self.url(path)))
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        self.cancellable(cancel, async {
            let response = request.send().await?;
            read_response(request_id, response).await
        })
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn cancellable<T, F>(&self, cancel: &CancellationToken, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ClientError::Cancelled),
            _ = self.shutdown.cancelled() => Err(ClientError::Cancelled),
            result = fut => result,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.authenticated_request::<T, ()>(Method::GET, path, None).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.authenticated_request(Method::POST, path, Some(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.authenticated_request::<T, ()>(Method::POST, path, None).await
    }

    async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.authenticated_request(Method::PUT, path, Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.authenticated_request::<T, ()>(Method::DELETE, path, None).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish()
    }
}

/// Maps a non-success status to [`ApiError`] and otherwise decodes the body.
/// An empty success body decodes as JSON `null`.
async fn read_response<T: DeserializeOwned>(
    request_id: Uuid,
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        let err = ApiError::from_body(status, &body);
        debug!(%request_id, %status, message = %err.message, "request failed");
        return Err(err.into());
    }

    let body = response.bytes().await?;
    debug!(%request_id, %status, bytes = body.len(), "request succeeded");
    let body: &[u8] = if body.is_empty() { b"null" } else { &body };
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}
