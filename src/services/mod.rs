//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Announcement list retrieval (`FeedClient`)
//! - Season announcement selection (`AnnouncementFilter`)
//! - Detail page extraction (`DetailExtractor`)
//! - Table publishing (`NetlifyPublisher`)

mod detail;
mod feed;
mod filter;
pub mod publish;

pub use detail::{DetailExtractor, extract_regulation, extract_season};
pub use feed::FeedClient;
pub use filter::AnnouncementFilter;
pub use publish::{NetlifyPublisher, PublishCredentials, PublishOutcome, Publisher};
