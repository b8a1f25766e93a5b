//! libsql backend — durable `KvStore` over a local database file.
//!
//! Markers and the organization-id cache survive reloads; the wizard's
//! transient state does not live here.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database, params};
use tracing::info;

use crate::error::StoreError;
use crate::store::kv::KvStore;
use crate::store::migrations;

/// libsql-backed key-value store.
///
/// Holds a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("Failed to create store directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Store opened");
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait]
impl KvStore for LibSqlStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT value FROM kv_entries WHERE key = ?1", params![key])
            .await
            .map_err(|e| StoreError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let raw: String = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("get: {e}")))?;
                // Malformed entries are treated as absent, not fatal.
                Ok(serde_json::from_str(&raw).ok())
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn()
            .execute(
                "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key, raw, now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("set: {e}")))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let count = self
            .conn()
            .execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
            .await
            .map_err(|e| StoreError::Query(format!("remove: {e}")))?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::{get_string, set_string};

    #[tokio::test]
    async fn roundtrip_in_memory() {
        let store = LibSqlStore::new_memory().await.unwrap();

        assert_eq!(store.get("missing").await.unwrap(), None);
        store
            .set("org", &serde_json::json!({"id": "org_1"}))
            .await
            .unwrap();
        assert_eq!(
            store.get("org").await.unwrap(),
            Some(serde_json::json!({"id": "org_1"}))
        );
        assert!(store.remove("org").await.unwrap());
        assert!(!store.remove("org").await.unwrap());
    }

    #[tokio::test]
    async fn string_helpers() {
        let store = LibSqlStore::new_memory().await.unwrap();
        set_string(&store, "k", "hello").await.unwrap();
        assert_eq!(get_string(&store, "k").await.unwrap().as_deref(), Some("hello"));
        // Non-string values read as absent through the string helper.
        store.set("n", &serde_json::json!(42)).await.unwrap();
        assert_eq!(get_string(&store, "n").await.unwrap(), None);
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let store = LibSqlStore::new_local(&path).await.unwrap();
            store.set("k", &serde_json::json!("v")).await.unwrap();
        }

        let store = LibSqlStore::new_local(&path).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(serde_json::json!("v")));
    }
}
