// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod announcement;
mod config;
mod report;
mod table;

// Re-export all public types
pub use announcement::{AnnouncementListItem, NewsList, StoredAnnouncement};
pub use config::{Config, CrawlerConfig, FeedConfig, LoggingConfig, PublishConfig};
pub use report::{DeployReport, RunLog, RunReport};
pub use table::SeasonRegulationTable;
