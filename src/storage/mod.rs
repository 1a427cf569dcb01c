//! Storage abstractions for announcement persistence.
//!
//! The crawler consumes a generic key-value store: values are JSON, keys are
//! composite (a list of parts) and listing is scoped by key prefix.
//!
//! ## Key Layout
//!
//! ```text
//! ["news", <absolute url>]      # StoredAnnouncement, written once
//! ["season_regulation_map"]     # SeasonRegulationTable, rebuilt every pass
//! ```

pub mod dedup;
pub mod local;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// Re-export for convenience
pub use dedup::DedupStore;
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Key prefix for stored announcements.
pub const NEWS_PREFIX: &str = "news";

/// Key of the aggregate table.
pub const TABLE_KEY: &str = "season_regulation_map";

/// A key together with its value, as returned by prefix listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KvEntry {
    pub key: Vec<String>,
    pub value: Value,
}

/// Trait for key-value storage backends.
///
/// Single-key writes are atomic; nothing else is guaranteed.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &[&str]) -> Result<Option<Value>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &[&str], value: &Value) -> Result<()>;

    /// Enumerate all entries whose key starts with `prefix`.
    ///
    /// Enumeration order is backend-defined.
    async fn list(&self, prefix: &[&str]) -> Result<Vec<KvEntry>>;
}
