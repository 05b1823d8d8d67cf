//! Key-value store port
//!
//! Defines the narrow interface the session layer persists through.

use async_trait::async_trait;
use bling_domain::StorageKey;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Durable string-keyed storage.
///
/// Implementations are expected to serialize access themselves; callers
/// never hold a lock across calls.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. Returns `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the value cannot be persisted.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes a value. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Reads a value by typed key.
    async fn get_key(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        self.get(key.as_str()).await
    }

    /// Writes a value by typed key.
    async fn set_key(&self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        self.set(key.as_str(), value).await
    }

    /// Removes a value by typed key.
    async fn remove_key(&self, key: StorageKey) -> Result<(), StoreError> {
        self.remove(key.as_str()).await
    }
}
