//! Persistent key-value storage for the bearer credential.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::ClientError;

pub use memory::MemoryTokenStore;
pub use sqlite::SqliteTokenStore;

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), ClientError>;
}
