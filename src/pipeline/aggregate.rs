//! Season to regulation table derivation.

use crate::error::Result;
use crate::models::{SeasonRegulationTable, StoredAnnouncement};
use crate::storage::DedupStore;

/// Fold announcements into a table.
///
/// Announcements are ordered by `(fetched_at, url)` first, so when two of
/// them claim the same season the one fetched last wins regardless of the
/// store's enumeration order.
pub fn derive_table(mut announcements: Vec<StoredAnnouncement>) -> SeasonRegulationTable {
    announcements.sort_by(|a, b| {
        a.fetched_at
            .cmp(&b.fetched_at)
            .then_with(|| a.url.cmp(&b.url))
    });

    let mut table = SeasonRegulationTable::new();
    for announcement in &announcements {
        if let Some(previous) = table.insert(announcement.season, announcement.regulation) {
            if previous != announcement.regulation {
                log::warn!(
                    "Season {} has conflicting regulations {} and {}; keeping {} from {}",
                    announcement.season,
                    previous,
                    announcement.regulation,
                    announcement.regulation,
                    announcement.url
                );
            }
        }
    }
    table
}

/// Rebuilds the persisted table from every stored announcement.
pub struct AggregateBuilder<'a> {
    store: DedupStore<'a>,
}

impl<'a> AggregateBuilder<'a> {
    pub fn new(store: DedupStore<'a>) -> Self {
        Self { store }
    }

    /// Derive the table from the store and overwrite the persisted copy.
    pub async fn rebuild(&self) -> Result<SeasonRegulationTable> {
        let announcements = self.store.list_all().await?;
        let count = announcements.len();
        let table = derive_table(announcements);

        self.store.set_table(&table).await?;
        log::debug!(
            "Rebuilt table: {} season(s) from {} announcement(s)",
            table.len(),
            count
        );
        Ok(table)
    }
}
