//! Backend-agnostic key-value store trait.
//!
//! The controller never touches ambient storage directly; everything it
//! persists (organization-id cache, step markers, session credentials)
//! goes through this interface so the logic is testable without a real
//! backend.

use async_trait::async_trait;

use crate::error::StoreError;

/// Async key-value store of JSON values.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get the value for `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Set `key` to `value`, overwriting any existing value.
    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether a value was present.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// Convenience: get a value and treat it as a string, tolerating missing
/// or non-string entries as absent.
pub async fn get_string(store: &dyn KvStore, key: &str) -> Result<Option<String>, StoreError> {
    let value = store.get(key).await?;
    Ok(value.and_then(|v| v.as_str().map(str::to_string)))
}

/// Convenience: set a string value.
pub async fn set_string(store: &dyn KvStore, key: &str, value: &str) -> Result<(), StoreError> {
    store.set(key, &serde_json::Value::String(value.to_string())).await
}
