// src/pipeline/operations.rs

//! The four public operations: scrape, list, json and deploy.
//!
//! Each takes an explicitly opened store handle and returns a structured
//! result; rendering is left to the caller (CLI or Lambda handler).

use crate::error::{AppError, Result};
use crate::models::{Config, DeployReport, RunLog, RunReport, SeasonRegulationTable, StoredAnnouncement};
use crate::pipeline::CollectionPipeline;
use crate::services::Publisher;
use crate::storage::{DedupStore, KvStore};
use crate::utils::http::PageFetcher;

/// Run a collection pass.
pub async fn run_scrape(
    config: &Config,
    fetcher: &dyn PageFetcher,
    store: &dyn KvStore,
) -> Result<RunReport> {
    CollectionPipeline::new(config, fetcher, DedupStore::new(store))
        .run()
        .await
}

/// Every stored announcement, by season then URL.
pub async fn run_list(store: &dyn KvStore) -> Result<Vec<StoredAnnouncement>> {
    let mut announcements = DedupStore::new(store).list_all().await?;
    announcements.sort_by(|a, b| a.season.cmp(&b.season).then_with(|| a.url.cmp(&b.url)));
    Ok(announcements)
}

/// The current table. Fails if no pass has built one yet.
pub async fn run_json(store: &dyn KvStore) -> Result<SeasonRegulationTable> {
    DedupStore::new(store).get_table().await?.ok_or_else(|| {
        AppError::config("No season/regulation table found. Run 'scrape' first.")
    })
}

/// Publish the current table.
pub async fn run_deploy(
    config: &Config,
    store: &dyn KvStore,
    publisher: &dyn Publisher,
) -> Result<DeployReport> {
    let mut events = RunLog::new();

    let table = run_json(store).await?;
    let bytes = table.to_json_bytes()?;
    events.info(format!(
        "Publishing {} season(s) to {} ({} bytes)",
        table.len(),
        config.publish.file_path,
        bytes.len()
    ));

    let outcome = match publisher.publish(&config.publish.file_path, &bytes).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("{}", e);
            return Err(e);
        }
    };

    if outcome.uploaded {
        events.info(format!("Uploaded table (deploy {})", outcome.deploy_id));
    } else {
        events.info(format!(
            "Table unchanged, nothing uploaded (deploy {})",
            outcome.deploy_id
        ));
    }

    Ok(DeployReport {
        deploy_id: outcome.deploy_id,
        digest: outcome.digest,
        uploaded: outcome.uploaded,
        events,
    })
}
