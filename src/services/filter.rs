//! Ranked-battle announcement selection.

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{AnnouncementListItem, FeedConfig};

/// Full-title shape of a season announcement, e.g.
/// `2023年7月シーズン（シーズン9）開催中！`.
const SEASON_TITLE_PATTERN: &str = r"^[0-9]{4}年[0-9]{1,2}月シーズン（シーズン[0-9]+）開催中！$";

/// Selects ranked-battle season announcements from the feed.
pub struct AnnouncementFilter {
    category_code: String,
    category_label: String,
    title_regex: Regex,
}

impl AnnouncementFilter {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let title_regex = Regex::new(SEASON_TITLE_PATTERN)
            .map_err(|e| AppError::validation(format!("title pattern: {e}")))?;
        Ok(Self {
            category_code: config.category_code.clone(),
            category_label: config.category_label.clone(),
            title_regex,
        })
    }

    /// Whether a single item is a season announcement.
    pub fn matches(&self, item: &AnnouncementListItem) -> bool {
        item.kind == self.category_code
            && item.kind_txt == self.category_label
            && self.title_regex.is_match(&item.title)
    }

    /// Matching items, in feed order.
    pub fn filter(&self, items: Vec<AnnouncementListItem>) -> Vec<AnnouncementListItem> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: &str, kind_txt: &str, title: &str) -> AnnouncementListItem {
        AnnouncementListItem {
            id: "1".to_string(),
            title: title.to_string(),
            kind: kind.to_string(),
            kind_txt: kind_txt.to_string(),
            link: "page/1.html".to_string(),
            ..AnnouncementListItem::default()
        }
    }

    fn filter() -> AnnouncementFilter {
        AnnouncementFilter::new(&FeedConfig::default()).unwrap()
    }

    #[test]
    fn test_accepts_season_title() {
        assert!(filter().matches(&item("2", "ランクバトル", "2023年7月シーズン（シーズン9）開催中！")));
        assert!(filter().matches(&item("2", "ランクバトル", "2026年12月シーズン（シーズン40）開催中！")));
    }

    #[test]
    fn test_rejects_extra_wording() {
        let f = filter();
        assert!(!f.matches(&item("2", "ランクバトル", "2023年7月シーズン（シーズン9）開催中！！")));
        assert!(!f.matches(&item("2", "ランクバトル", "【更新】2023年7月シーズン（シーズン9）開催中！")));
    }

    #[test]
    fn test_rejects_other_categories() {
        let f = filter();
        let title = "2023年7月シーズン（シーズン9）開催中！";
        assert!(!f.matches(&item("1", "ランクバトル", title)));
        assert!(!f.matches(&item("2", "お知らせ", title)));
    }

    #[test]
    fn test_rejects_full_width_digits() {
        assert!(!filter().matches(&item("2", "ランクバトル", "２０２３年7月シーズン（シーズン9）開催中！")));
    }

    #[test]
    fn test_filter_keeps_feed_order() {
        let items = vec![
            item("2", "ランクバトル", "2023年8月シーズン（シーズン10）開催中！"),
            item("2", "ランクバトル", "ランクバトルのルール変更について"),
            item("2", "ランクバトル", "2023年7月シーズン（シーズン9）開催中！"),
        ];

        let kept = filter().filter(items);
        assert_eq!(kept.len(), 2);
        assert!(kept[0].title.contains("シーズン10"));
        assert!(kept[1].title.contains("シーズン9"));
    }
}
