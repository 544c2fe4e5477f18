//! KeyValueStore port - Small persisted client-side settings.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Persisted string key-value storage.
///
/// Callers encode structured values themselves (JSON).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never set.
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), DomainError>;
}
