// src/services/detail.rs

//! Detail page extraction.
//!
//! Fetches an announcement page, takes the text of its content region and
//! pulls out the season number and the regulation letter:
//!
//! - `シーズン` followed by ASCII digits gives the season.
//! - `レギュレーション` followed by one uppercase letter, half-width (`J`) or
//!   full-width (`Ｊ`), gives the regulation. Full-width letters are shifted
//!   down by `0xFEE0` into ASCII.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{AnnouncementListItem, FeedConfig, StoredAnnouncement};
use crate::utils::http::PageFetcher;
use crate::utils::resolve;

/// Offset between full-width and ASCII forms of the same character.
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"シーズン([0-9]+)").expect("valid season pattern"));

static REGULATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"レギュレーション([A-ZＡ-Ｚ])").expect("valid regulation pattern"));

/// Season number from page text. Seasons start at 1.
pub fn extract_season(text: &str) -> Option<u32> {
    SEASON_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|season| *season > 0)
}

/// Half-width regulation letter from page text.
pub fn extract_regulation(text: &str) -> Option<char> {
    let letter = REGULATION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())?;
    normalize_letter(letter)
}

/// Map `Ａ`..`Ｚ` to `A`..`Z`; keep `A`..`Z`; reject everything else.
fn normalize_letter(letter: char) -> Option<char> {
    match letter {
        'A'..='Z' => Some(letter),
        'Ａ'..='Ｚ' => char::from_u32(letter as u32 - FULL_WIDTH_OFFSET),
        _ => None,
    }
}

/// Fetches detail pages and builds [`StoredAnnouncement`]s.
pub struct DetailExtractor<'a> {
    config: &'a FeedConfig,
    fetcher: &'a dyn PageFetcher,
    content_selector: Selector,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(config: &'a FeedConfig, fetcher: &'a dyn PageFetcher) -> Result<Self> {
        let content_selector = Self::parse_selector(&config.content_selector)?;
        Ok(Self {
            config,
            fetcher,
            content_selector,
        })
    }

    /// Absolute URL of an item's detail page.
    pub fn announcement_url(&self, item: &AnnouncementListItem) -> Result<String> {
        resolve(&self.config.base_url, &item.link)
    }

    /// Fetch and parse one announcement.
    ///
    /// `Ok(None)` means the page was fetched but the content region, the
    /// season or the regulation is missing. Fetch failures are
    /// [`AppError::DetailFetch`].
    pub async fn extract(&self, item: &AnnouncementListItem) -> Result<Option<StoredAnnouncement>> {
        let url = self.announcement_url(item)?;
        let html = self
            .fetcher
            .fetch_text(&url)
            .await
            .map_err(|e| AppError::detail_fetch(&url, e))?;

        let Some((season, regulation)) = self.parse_page(&html) else {
            log::debug!("No season/regulation found in {}", url);
            return Ok(None);
        };

        Ok(Some(StoredAnnouncement {
            url,
            title: item.title.clone(),
            season,
            regulation,
            fetched_at: Utc::now(),
        }))
    }

    /// Season and regulation from a full HTML document.
    pub fn parse_page(&self, html: &str) -> Option<(u32, char)> {
        let text = self.content_text(html)?;
        Some((extract_season(&text)?, extract_regulation(&text)?))
    }

    /// Rendered text of the first content region.
    fn content_text(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.content_selector)
            .next()
            .map(|element| element.text().collect())
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
