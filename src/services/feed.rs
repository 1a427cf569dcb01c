// src/services/feed.rs

//! Announcement list client.

use crate::error::{AppError, Result};
use crate::models::{AnnouncementListItem, FeedConfig, NewsList};
use crate::utils::http::PageFetcher;

/// Fetches and decodes the announcement list resource.
pub struct FeedClient<'a> {
    config: &'a FeedConfig,
    fetcher: &'a dyn PageFetcher,
}

impl<'a> FeedClient<'a> {
    pub fn new(config: &'a FeedConfig, fetcher: &'a dyn PageFetcher) -> Self {
        Self { config, fetcher }
    }

    /// Fetch the list in feed order.
    ///
    /// Bad status, network and decode failures all become
    /// [`AppError::ListFetch`].
    pub async fn fetch_list(&self) -> Result<Vec<AnnouncementListItem>> {
        let url = &self.config.list_url;
        let body = self
            .fetcher
            .fetch_text(url)
            .await
            .map_err(|e| AppError::list_fetch(url, e))?;

        let list: NewsList =
            serde_json::from_str(&body).map_err(|e| AppError::list_fetch(url, e))?;

        log::debug!(
            "Fetched {} list items (hash {})",
            list.data.len(),
            list.hash
        );
        Ok(list.data)
    }
}
