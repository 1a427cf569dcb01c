//! Typed view over a [`KvStore`] for announcements and the aggregate table.

use crate::error::{AppError, Result};
use crate::models::{SeasonRegulationTable, StoredAnnouncement};
use crate::storage::{KvStore, NEWS_PREFIX, TABLE_KEY};

/// Records which announcement URLs were already processed.
#[derive(Clone, Copy)]
pub struct DedupStore<'a> {
    store: &'a dyn KvStore,
}

impl<'a> DedupStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// True iff an announcement is stored for `url`.
    pub async fn is_known(&self, url: &str) -> Result<bool> {
        Ok(self.store.get(&[NEWS_PREFIX, url]).await?.is_some())
    }

    /// Write the announcement under its URL.
    pub async fn save(&self, announcement: &StoredAnnouncement) -> Result<()> {
        let value = serde_json::to_value(announcement)?;
        self.store
            .set(&[NEWS_PREFIX, announcement.url.as_str()], &value)
            .await
    }

    /// All stored announcements, in store enumeration order.
    pub async fn list_all(&self) -> Result<Vec<StoredAnnouncement>> {
        self.store
            .list(&[NEWS_PREFIX])
            .await?
            .into_iter()
            .map(|entry| {
                serde_json::from_value(entry.value).map_err(|e| {
                    AppError::store(format!("entry {}: {e}", entry.key.join("/")))
                })
            })
            .collect()
    }

    pub async fn get_table(&self) -> Result<Option<SeasonRegulationTable>> {
        match self.store.get(&[TABLE_KEY]).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn set_table(&self, table: &SeasonRegulationTable) -> Result<()> {
        let value = serde_json::to_value(table)?;
        self.store.set(&[TABLE_KEY], &value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::Utc;

    fn announcement(url: &str, season: u32, regulation: char) -> StoredAnnouncement {
        StoredAnnouncement {
            url: url.to_string(),
            title: format!("シーズン{season}"),
            season,
            regulation,
            fetched_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_marks_known() {
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);
        let url = "https://example.com/page/1.html";

        assert!(!store.is_known(url).await.unwrap());
        store.save(&announcement(url, 1, 'A')).await.unwrap();
        assert!(store.is_known(url).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_all_decodes_entries() {
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);
        store.save(&announcement("https://e.com/1", 1, 'A')).await.unwrap();
        store.save(&announcement("https://e.com/2", 2, 'B')).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|a| a.season == 2 && a.regulation == 'B'));
    }

    #[tokio::test]
    async fn test_list_all_rejects_corrupt_entry() {
        let backend = MemoryStorage::new();
        backend
            .set(&[NEWS_PREFIX, "https://e.com/x"], &serde_json::json!("garbage"))
            .await
            .unwrap();

        let store = DedupStore::new(&backend);
        assert!(matches!(store.list_all().await, Err(AppError::Store(_))));
    }

    #[tokio::test]
    async fn test_table_round_trip() {
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);
        assert!(store.get_table().await.unwrap().is_none());

        let table: SeasonRegulationTable = [(36, 'J'), (1, 'A')].into_iter().collect();
        store.set_table(&table).await.unwrap();
        assert_eq!(store.get_table().await.unwrap(), Some(table));
    }
}
