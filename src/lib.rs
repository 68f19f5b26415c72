pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod store;

pub use auth::AuthSession;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, ClientError};
pub use session::{Session, SessionState};
pub use store::{MemoryTokenStore, SqliteTokenStore, TokenStore};
