//! Durable [`KvStore`] on a single SQLite table.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{KvStore, StoreError, StoreResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

/// JSON values keyed by their absolute store key. Prefix matches are literal.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self::init(Connection::open(path)?)?;
        info!(path = %path.display(), "SQLite store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        let _rows_affected: usize = conn.execute(SCHEMA, [])?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Runs `op` on the blocking pool with the connection locked.
    async fn with_connection<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Backend("SQLite connection lock poisoned".to_string()))?;
            op(&conn).map_err(StoreError::from)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("spawn_blocking panicked: {e}")))?
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn put(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        let key = key.to_string();
        let value = serde_json::to_string(&value)?;
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        let key = key.to_string();
        let raw: Option<String> = self
            .with_connection(move |conn| {
                conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
                    .optional()
            })
            .await?;
        let value = raw.map(|raw| serde_json::from_str::<serde_json::Value>(&raw)).transpose()?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let key = key.to_string();
        self.with_connection(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key]).map(|_| ())
        })
        .await
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, serde_json::Value)>> {
        let prefix = prefix.to_string();
        let rows: Vec<(String, String)> = self
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT key, value FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
                )?;
                let rows = stmt.query_map(params![prefix], |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect::<rusqlite::Result<Vec<(String, String)>>>()
            })
            .await?;

        rows.into_iter()
            .map(|(key, raw)| -> StoreResult<(String, serde_json::Value)> {
                Ok((key, serde_json::from_str(&raw)?))
            })
            .collect()
    }

    async fn flush_prefix(&self, prefix: &str) -> StoreResult<()> {
        let prefix = prefix.to_string();
        self.with_connection(move |conn| {
            conn.execute("DELETE FROM kv WHERE substr(key, 1, length(?1)) = ?1", params![prefix])
                .map(|_| ())
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ams.db");

        let store = SqliteStore::open(&path).unwrap();
        store.put("root:services:1", json!({"id": "1"})).await.unwrap();
        store.put("root:services:1", json!({"id": "1", "v": 2})).await.unwrap();
        store.put("root:services:2", json!({"id": "2"})).await.unwrap();
        store.delete("root:services:2").await.unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get("root:services:1").await.unwrap(), Some(json!({"id": "1", "v": 2})));
        assert_eq!(reopened.get("root:services:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_prefix_match_is_literal() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.put("a%:2", json!(2)).await.unwrap();
        store.put("a%:1", json!(1)).await.unwrap();
        store.put("ab:3", json!(3)).await.unwrap();
        store.put("a_:4", json!(4)).await.unwrap();

        let scanned = store.scan_prefix("a%:").await.unwrap();
        assert_eq!(scanned, vec![("a%:1".to_string(), json!(1)), ("a%:2".to_string(), json!(2))]);

        store.flush_prefix("a%:").await.unwrap();
        assert!(store.scan_prefix("a%:").await.unwrap().is_empty());
        assert_eq!(store.get("ab:3").await.unwrap(), Some(json!(3)));
        assert_eq!(store.get("a_:4").await.unwrap(), Some(json!(4)));
    }
}
