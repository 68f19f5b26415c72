use std::env;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOKEN_KEY: &str = "access_token";
pub const DEFAULT_SESSION_DB: &str = "sqlite://lms-session.db?mode=rwc";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Key the credential is stored under in the token store.
    pub token_key: String,
    /// SQLite URL of the durable credential store.
    pub session_db: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            session_db: DEFAULT_SESSION_DB.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    /// Reads the configuration from the process environment, after loading
    /// a `.env` file if one is present.
    pub fn new_from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("LMS_API_URL")
            .filter(|v| !v.trim().is_empty())
            .map(normalize_base_url)
            .unwrap_or(defaults.base_url);

        let timeout = match lookup("LMS_API_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    ClientError::Config(format!("LMS_API_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                if secs == 0 {
                    return Err(ClientError::Config(
                        "LMS_API_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.timeout,
        };

        let token_key = lookup("LMS_TOKEN_KEY")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.token_key);
        let session_db = lookup("LMS_SESSION_DB")
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.session_db);

        Ok(Self {
            base_url,
            timeout,
            token_key,
            session_db,
        })
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
