//! Key-value persistence abstraction.
//!
//! Values are JSON documents. Every key handed to a [`KvStore`] is absolute;
//! [`StoreKeys`] builds them below the per-sandbox, per-MEP key root.

mod memory;
mod sqlite;
mod writer;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use writer::StoreWriter;

use async_trait::async_trait;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn put(&self, key: &str, value: serde_json::Value) -> StoreResult<()>;
    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>>;
    async fn delete(&self, key: &str) -> StoreResult<()>;
    /// All entries whose key starts with `prefix`, sorted by key.
    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, serde_json::Value)>>;
    /// Removes every entry whose key starts with `prefix`.
    async fn flush_prefix(&self, prefix: &str) -> StoreResult<()>;
}

/// Builds store keys for one service instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    root: String,
}

impl StoreKeys {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn service(&self, service_id: &str) -> String {
        format!("{}services:{service_id}", self.root)
    }

    pub fn services_prefix(&self) -> String {
        format!("{}services:", self.root)
    }

    pub fn subscription(&self, subscription_id: &str) -> String {
        format!("{}subscriptions:{subscription_id}", self.root)
    }

    pub fn subscriptions_prefix(&self) -> String {
        format!("{}subscriptions:", self.root)
    }

    pub fn device_location(&self, address: &str) -> String {
        format!("{}devloc:{address}", self.root)
    }

    pub fn tracked(&self, service_id: &str, address: &str) -> String {
        format!("{}tracked:{service_id}:{address}", self.root)
    }

    pub fn tracked_prefix(&self) -> String {
        format!("{}tracked:", self.root)
    }
}

/// A store mutation produced while the state lock is held and submitted to the
/// [`StoreWriter`] before the lock is released.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    Put { key: String, value: serde_json::Value },
    Delete { key: String },
}

impl StoreWrite {
    pub fn put<T: serde::Serialize>(key: String, value: &T) -> StoreResult<Self> {
        Ok(Self::Put { key, value: serde_json::to_value(value)? })
    }

    pub const fn delete(key: String) -> Self {
        Self::Delete { key }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }

    /// Applies the write, logging instead of failing: cache writes are best effort.
    pub async fn apply(self, store: &dyn KvStore) {
        let key = self.key().to_string();
        let result = match self {
            Self::Put { key, value } => store.put(&key, value).await,
            Self::Delete { key } => store.delete(&key).await,
        };
        if let Err(e) = result {
            tracing::warn!(key = %key, "Store write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = StoreKeys::new("data:sbox:s1:ams:mep:global:");
        assert_eq!(keys.service("3"), "data:sbox:s1:ams:mep:global:services:3");
        assert_eq!(keys.device_location("10.0.0.1"), "data:sbox:s1:ams:mep:global:devloc:10.0.0.1");
        assert_eq!(keys.tracked("3", "10.0.0.1"), "data:sbox:s1:ams:mep:global:tracked:3:10.0.0.1");
        assert!(keys.subscription("1").starts_with(&keys.subscriptions_prefix()));
    }
}
