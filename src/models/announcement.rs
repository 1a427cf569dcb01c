//! Announcement data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The list resource envelope: a content hash and the items.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewsList {
    #[serde(default)]
    pub hash: String,

    #[serde(default)]
    pub data: Vec<AnnouncementListItem>,
}

/// One entry of the announcement list, as published by the feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementListItem {
    /// Feed identifier
    pub id: String,

    /// Region code
    #[serde(default)]
    pub reg: String,

    /// Announcement title
    pub title: String,

    /// Category code (e.g. "2" for ranked battles)
    pub kind: String,

    /// Category label
    #[serde(default)]
    pub kind_txt: String,

    #[serde(default)]
    pub banner: String,

    #[serde(default)]
    pub is_important: String,

    /// Publication timestamp (unix seconds as text)
    #[serde(default)]
    pub st_at: String,

    #[serde(default)]
    pub new_at: String,

    /// Link relative to the site base
    pub link: String,
}

/// An announcement whose season and regulation were extracted.
///
/// Keyed by `url` in the store; written once and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnnouncement {
    /// Absolute URL of the detail page
    pub url: String,

    /// Title as published
    pub title: String,

    /// Season number
    pub season: u32,

    /// Half-width uppercase regulation letter
    pub regulation: char,

    /// When the detail page was extracted
    pub fetched_at: DateTime<Utc>,
}

impl StoredAnnouncement {
    /// One-line display form used by listings.
    pub fn summary(&self) -> String {
        format!(
            "Season {} / Regulation {} - {} ({})",
            self.season, self.regulation, self.title, self.url
        )
    }
}
