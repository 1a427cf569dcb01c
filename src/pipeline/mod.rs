//! Pipeline entry points for crawler operations.
//!
//! - `run_scrape`: Collect new season announcements and rebuild the table
//! - `run_list`: Stored announcements by season
//! - `run_json`: The current season to regulation table
//! - `run_deploy`: Publish the table to static hosting

pub mod aggregate;
pub mod collect;
pub mod operations;

pub use aggregate::{AggregateBuilder, derive_table};
pub use collect::CollectionPipeline;
pub use operations::{run_deploy, run_json, run_list, run_scrape};
