//! In-process [`KvStore`] backed by a concurrent map.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{KvStore, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: serde_json::Value) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, serde_json::Value)>> {
        let mut found: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    async fn flush_prefix(&self, prefix: &str) -> StoreResult<()> {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
