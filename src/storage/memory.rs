//! In-memory storage backend.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::storage::{KvEntry, KvStore};

/// `BTreeMap`-backed store; lists in key order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<Vec<String>, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn owned(key: &[&str]) -> Vec<String> {
        key.iter().map(|part| part.to_string()).collect()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<Vec<String>, Value>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::store("memory store lock poisoned"))
    }
}

#[async_trait]
impl KvStore for MemoryStorage {
    async fn get(&self, key: &[&str]) -> Result<Option<Value>> {
        Ok(self.lock()?.get(&Self::owned(key)).cloned())
    }

    async fn set(&self, key: &[&str], value: &Value) -> Result<()> {
        self.lock()?.insert(Self::owned(key), value.clone());
        Ok(())
    }

    async fn list(&self, prefix: &[&str]) -> Result<Vec<KvEntry>> {
        let prefix = Self::owned(prefix);
        Ok(self
            .lock()?
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, value)| KvEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_prefix_listing() {
        let store = MemoryStorage::new();
        store.set(&["news", "b"], &json!(2)).await.unwrap();
        store.set(&["news", "a"], &json!(1)).await.unwrap();
        store.set(&["newsletter"], &json!(3)).await.unwrap();

        let entries = store.list(&["news"]).await.unwrap();
        let keys: Vec<_> = entries.iter().map(|e| e.key.join("/")).collect();
        assert_eq!(keys, vec!["news/a", "news/b"]);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryStorage::new();
        assert!(store.get(&["nope"]).await.unwrap().is_none());
    }
}
