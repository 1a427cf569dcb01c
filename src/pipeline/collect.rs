// src/pipeline/collect.rs

//! Announcement collection pass.

use std::time::Duration;

use crate::error::Result;
use crate::models::{Config, RunReport};
use crate::pipeline::AggregateBuilder;
use crate::services::{AnnouncementFilter, DetailExtractor, FeedClient};
use crate::storage::DedupStore;
use crate::utils::http::PageFetcher;

/// Drives list retrieval, filtering, extraction and persistence.
pub struct CollectionPipeline<'a> {
    config: &'a Config,
    fetcher: &'a dyn PageFetcher,
    store: DedupStore<'a>,
}

impl<'a> CollectionPipeline<'a> {
    pub fn new(config: &'a Config, fetcher: &'a dyn PageFetcher, store: DedupStore<'a>) -> Self {
        Self {
            config,
            fetcher,
            store,
        }
    }

    /// Run one pass.
    ///
    /// A failed list fetch aborts the pass with an error. An empty list ends
    /// it with zero counters and leaves the table untouched. Per-item
    /// failures are counted and the loop continues.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::default();
        let feed = &self.config.feed;

        let filter = AnnouncementFilter::new(feed)?;
        let extractor = DetailExtractor::new(feed, self.fetcher)?;

        report
            .events
            .info(format!("Fetching announcement list from {}", feed.list_url));
        let items = match FeedClient::new(feed, self.fetcher).fetch_list().await {
            Ok(items) => items,
            Err(e) => {
                log::error!("{}", e);
                return Err(e);
            }
        };

        if items.is_empty() {
            report
                .events
                .warn("Announcement list is empty; skipping this pass");
            return Ok(report);
        }

        let total = items.len();
        let candidates = filter.filter(items);
        report.events.info(format!(
            "{} of {} announcements are ranked-battle season notices",
            candidates.len(),
            total
        ));

        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);
        let mut fetched_before = false;

        for item in &candidates {
            let url = match extractor.announcement_url(item) {
                Ok(url) => url,
                Err(e) => {
                    report.failed_count += 1;
                    report
                        .events
                        .warn(format!("Skipping '{}': bad link {}: {}", item.title, item.link, e));
                    continue;
                }
            };

            if self.store.is_known(&url).await? {
                report.duplicate_count += 1;
                log::debug!("Already stored: {}", url);
                continue;
            }

            if fetched_before && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            fetched_before = true;

            match extractor.extract(item).await {
                Ok(Some(announcement)) => {
                    self.store.save(&announcement).await?;
                    report.new_count += 1;
                    report.events.info(format!(
                        "Saved season {} (regulation {}): {}",
                        announcement.season, announcement.regulation, announcement.title
                    ));
                }
                Ok(None) => {
                    report.invalid_count += 1;
                    report.events.warn(format!(
                        "Season or regulation not found: {} ({})",
                        item.title, url
                    ));
                }
                Err(e) => {
                    report.failed_count += 1;
                    report.events.error(e.to_string());
                }
            }
        }

        let table = AggregateBuilder::new(self.store).rebuild().await?;
        report.table_size = table.len();

        report.events.info(format!(
            "Done: {} new, {} already stored, {} without season/regulation, {} failed; table has {} season(s)",
            report.new_count,
            report.duplicate_count,
            report.invalid_count,
            report.failed_count,
            report.table_size
        ));

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::{KvStore, MemoryStorage, TABLE_KEY};
    use crate::utils::http::testing::StaticFetcher;

    const LIST_URL: &str = "https://sv-news.pokemon.co.jp/ja/json/list.json";
    const BASE: &str = "https://sv-news.pokemon.co.jp/ja/";

    fn config() -> Config {
        let mut config = Config::default();
        config.crawler.request_delay_ms = 0;
        config
    }

    fn list_json(items: &[(&str, &str, &str)]) -> String {
        let data: Vec<_> = items
            .iter()
            .map(|(id, kind, title)| {
                serde_json::json!({
                    "id": id,
                    "reg": "ja",
                    "title": title,
                    "kind": kind,
                    "kindTxt": if *kind == "2" { "ランクバトル" } else { "お知らせ" },
                    "banner": "",
                    "isImportant": "0",
                    "stAt": "1700000000",
                    "newAt": "1700000000",
                    "link": format!("page/{id}.html"),
                })
            })
            .collect();
        serde_json::json!({ "hash": "h", "data": data }).to_string()
    }

    fn detail(text: &str) -> String {
        format!("<html><body><div class=\"body\"><p>{text}</p></div></body></html>")
    }

    fn page_url(id: &str) -> String {
        format!("{BASE}page/{id}.html")
    }

    #[tokio::test]
    async fn test_end_to_end_single_item() {
        let config = config();
        let fetcher = StaticFetcher::new()
            .with_page(
                LIST_URL,
                &list_json(&[("40", "2", "2026年1月シーズン（シーズン40）開催中！")]),
            )
            .with_page(
                &page_url("40"),
                &detail("今シーズンはレギュレーションＪで開催します。シーズン40の期間は…"),
            );
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);

        let report = CollectionPipeline::new(&config, &fetcher, store)
            .run()
            .await
            .unwrap();

        assert_eq!(report.new_count, 1);
        assert_eq!(report.table_size, 1);

        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].url, page_url("40"));
        assert_eq!(stored[0].season, 40);
        assert_eq!(stored[0].regulation, 'J');

        let table = store.get_table().await.unwrap().unwrap();
        assert_eq!(table.to_json_bytes().unwrap(), br#"{"40":"J"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let config = config();
        let fetcher = StaticFetcher::new()
            .with_page(
                LIST_URL,
                &list_json(&[
                    ("10", "2", "2023年8月シーズン（シーズン10）開催中！"),
                    ("9", "2", "2023年7月シーズン（シーズン9）開催中！"),
                    ("5", "1", "メンテナンスのお知らせ"),
                ]),
            )
            .with_page(&page_url("10"), &detail("シーズン10 レギュレーションＥ"))
            .with_page(&page_url("9"), &detail("シーズン9 レギュレーションD"));
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);
        let pipeline = CollectionPipeline::new(&config, &fetcher, store);

        let first = pipeline.run().await.unwrap();
        assert_eq!(first.new_count, 2);
        assert_eq!(first.duplicate_count, 0);
        let table_after_first = backend.get(&[TABLE_KEY]).await.unwrap();

        let second = pipeline.run().await.unwrap();
        assert_eq!(second.new_count, 0);
        assert_eq!(second.duplicate_count, 2);
        assert_eq!(backend.get(&[TABLE_KEY]).await.unwrap(), table_after_first);

        // Only the list was requested on the second pass
        let detail_requests = fetcher
            .requests()
            .iter()
            .filter(|url| url.as_str() != LIST_URL)
            .count();
        assert_eq!(detail_requests, 2);
    }

    #[tokio::test]
    async fn test_item_failures_do_not_abort() {
        let config = config();
        let fetcher = StaticFetcher::new()
            .with_page(
                LIST_URL,
                &list_json(&[
                    ("1", "2", "2022年12月シーズン（シーズン1）開催中！"),
                    ("2", "2", "2023年1月シーズン（シーズン2）開催中！"),
                    ("3", "2", "2023年2月シーズン（シーズン3）開催中！"),
                ]),
            )
            // page 1 missing entirely
            .with_page(&page_url("2"), &detail("シーズン2 のルールは後日発表します"))
            .with_page(&page_url("3"), &detail("シーズン3 レギュレーションＢ"));
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);

        let report = CollectionPipeline::new(&config, &fetcher, store)
            .run()
            .await
            .unwrap();

        assert_eq!(report.failed_count, 1);
        assert_eq!(report.invalid_count, 1);
        assert_eq!(report.new_count, 1);
        assert!(report.events.lines().iter().any(|line| line.starts_with("[ERROR]")));

        // Failed and invalid items are retried on the next pass
        assert!(!store.is_known(&page_url("1")).await.unwrap());
        assert!(!store.is_known(&page_url("2")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delay_only_between_detail_fetches() {
        let mut config = config();
        config.crawler.request_delay_ms = 150;
        let delay = Duration::from_millis(150);

        let fetcher = StaticFetcher::new()
            .with_page(
                LIST_URL,
                &list_json(&[
                    ("1", "2", "2022年12月シーズン（シーズン1）開催中！"),
                    ("2", "2", "2023年1月シーズン（シーズン2）開催中！"),
                    ("3", "2", "2023年2月シーズン（シーズン3）開催中！"),
                    ("4", "2", "2023年3月シーズン（シーズン4）開催中！"),
                ]),
            )
            .with_page(&page_url("2"), &detail("シーズン2 レギュレーションA"))
            .with_page(&page_url("4"), &detail("シーズン4 レギュレーションB"));
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);
        for id in ["1", "3"] {
            store
                .save(&crate::models::StoredAnnouncement {
                    url: page_url(id),
                    title: format!("シーズン{id}"),
                    season: id.parse().unwrap(),
                    regulation: 'A',
                    fetched_at: chrono::Utc::now(),
                })
                .await
                .unwrap();
        }

        let report = CollectionPipeline::new(&config, &fetcher, store)
            .run()
            .await
            .unwrap();
        assert_eq!(report.new_count, 2);
        assert_eq!(report.duplicate_count, 2);

        let requests = fetcher.timed_requests();
        let urls: Vec<_> = requests.iter().map(|(url, _)| url.clone()).collect();
        assert_eq!(urls, vec![LIST_URL.to_string(), page_url("2"), page_url("4")]);

        // No pause before the first detail fetch, even after a known item
        assert!(requests[1].1 - requests[0].1 < delay);
        // Exactly one pause between fetches; the known item adds none
        let gap = requests[2].1 - requests[1].1;
        assert!(gap >= delay);
        assert!(gap < delay * 2);
    }

    #[tokio::test]
    async fn test_list_failure_aborts_pass() {
        let config = config();
        let fetcher = StaticFetcher::new();
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);

        let result = CollectionPipeline::new(&config, &fetcher, store).run().await;
        assert!(matches!(result, Err(AppError::ListFetch { .. })));
        assert!(backend.get(&[TABLE_KEY]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_list_leaves_table_untouched() {
        let config = config();
        let fetcher = StaticFetcher::new().with_page(LIST_URL, r#"{"hash":"h","data":[]}"#);
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);

        let report = CollectionPipeline::new(&config, &fetcher, store)
            .run()
            .await
            .unwrap();

        assert_eq!(report.new_count + report.duplicate_count + report.invalid_count, 0);
        assert!(backend.get(&[TABLE_KEY]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_table_rebuilt_without_new_items() {
        let config = config();
        let fetcher = StaticFetcher::new().with_page(
            LIST_URL,
            &list_json(&[("7", "1", "メンテナンスのお知らせ")]),
        );
        let backend = MemoryStorage::new();
        let store = DedupStore::new(&backend);

        let report = CollectionPipeline::new(&config, &fetcher, store)
            .run()
            .await
            .unwrap();

        assert_eq!(report.new_count, 0);
        assert_eq!(
            store.get_table().await.unwrap(),
            Some(crate::models::SeasonRegulationTable::new())
        );
    }
}
