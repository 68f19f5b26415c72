use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message used when a failed response carries no readable error body.
pub const GENERIC_ERROR_MESSAGE: &str = "Network error";

/// A non-success response from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Build the error from a raw response body.
    ///
    /// A JSON object with a `detail` string yields that string; a structured
    /// `detail` (validation errors) yields its JSON text. Any other JSON,
    /// including bare strings, arrays and `null`, yields `HTTP <code>`. A body
    /// that is not JSON at all yields [`GENERIC_ERROR_MESSAGE`].
    pub fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<Value>(body) {
            Ok(value) => match value.get("detail") {
                Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
                Some(detail @ (Value::Array(_) | Value::Object(_))) => detail.to_string(),
                _ => format!("HTTP {}", status.as_u16()),
            },
            Err(_) => GENERIC_ERROR_MESSAGE.to_string(),
        };
        Self { status, message }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of an [`ApiError`], if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api(err) => Some(err.status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api(err) if err.is_unauthorized())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err)
        }
    }
}

impl From<sqlx::Error> for ClientError {
    fn from(err: sqlx::Error) -> Self {
        ClientError::Store(err.to_string())
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
