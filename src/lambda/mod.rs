// src/lambda/mod.rs

//! AWS Lambda handler for the crawler.
//!
//! Routes an invocation payload `{"operation": "..."}` to one of the public
//! operations and answers with a JSON body:
//!
//! - `index`: list the available operations
//! - `scrape`: run a collection pass, returns `logs`
//! - `list`: stored announcements, returns `count` and `data`
//! - `json`: the season to regulation table, returns `data`
//! - `deploy`: publish the table, returns `logs`
//!
//! ## Environment Variables
//!
//! - `STORAGE_DIR`: store root. Must be persistent storage shared across
//!   invocations (e.g. an EFS mount). The fallback `/tmp/rankbattle` is
//!   per-container scratch space: every cold start sees an empty store and
//!   re-fetches every announcement.
//! - `CRAWL_TIMEOUT_SECS`: HTTP request timeout
//! - `REQUEST_DELAY_MS`: Delay between detail page requests
//! - `NETLIFY_SITE_ID`, `NETLIFY_AUTH_TOKEN`: publish credentials
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use std::path::{Path, PathBuf};

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{run_deploy, run_json, run_list, run_scrape};
use crate::services::{NetlifyPublisher, PublishCredentials};
use crate::storage::LocalStorage;
use crate::utils::http::{HttpFetcher, create_async_client};

/// Store root used when `STORAGE_DIR` is unset. Not persistent.
const FALLBACK_STORAGE_DIR: &str = "/tmp/rankbattle";

/// Operation selected by the invocation payload.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Index,
    Scrape,
    List,
    Json,
    Deploy,
}

/// Lambda invocation payload.
#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    #[serde(default)]
    pub operation: Operation,
}

/// Lambda response payload.
#[derive(Debug, Serialize, Default)]
pub struct OperationResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl OperationResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(
    event: LambdaEvent<OperationRequest>,
) -> std::result::Result<OperationResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();
    info!("Starting operation {:?}", request.operation);

    let storage_dir = storage_dir(std::env::var("STORAGE_DIR").ok());

    let mut response = match dispatch(request.operation, &storage_dir).await {
        Ok(response) => response,
        Err(e) => {
            error!("Operation {:?} failed: {}", request.operation, e);
            OperationResponse::failure(e.to_string())
        }
    };

    response.execution_time_ms = start.elapsed().as_millis() as u64;
    Ok(response)
}

/// Store root from the `STORAGE_DIR` value, falling back to scratch space.
fn storage_dir(configured: Option<String>) -> PathBuf {
    match configured.filter(|dir| !dir.trim().is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => {
            warn!(
                "STORAGE_DIR is not set; using {} which does not survive cold starts",
                FALLBACK_STORAGE_DIR
            );
            PathBuf::from(FALLBACK_STORAGE_DIR)
        }
    }
}

/// Run one operation against the store at `storage_dir`.
pub async fn dispatch(operation: Operation, storage_dir: &Path) -> Result<OperationResponse> {
    if operation == Operation::Index {
        return Ok(index());
    }

    let config = load_lambda_config(storage_dir);
    let storage = LocalStorage::open(storage_dir).await?;

    let response = match operation {
        Operation::Index => index(),
        Operation::Scrape => {
            let fetcher = HttpFetcher::from_config(&config.crawler)?;
            let report = run_scrape(&config, &fetcher, &storage).await?;
            OperationResponse {
                success: true,
                message: Some("Scrape completed".to_string()),
                logs: Some(report.events.into_lines()),
                ..Default::default()
            }
        }
        Operation::List => {
            let announcements = run_list(&storage).await?;
            OperationResponse {
                success: true,
                count: Some(announcements.len()),
                data: Some(serde_json::to_value(&announcements)?),
                ..Default::default()
            }
        }
        Operation::Json => {
            let table = run_json(&storage).await?;
            OperationResponse {
                success: true,
                data: Some(serde_json::to_value(&table)?),
                ..Default::default()
            }
        }
        Operation::Deploy => {
            let credentials = PublishCredentials::from_env()?;
            let client = create_async_client(&config.crawler)?;
            let publisher = NetlifyPublisher::new(client, &config.publish, credentials);
            let report = run_deploy(&config, &storage, &publisher).await?;
            OperationResponse {
                success: true,
                message: Some(format!("Deploy {} completed", report.deploy_id)),
                logs: Some(report.events.into_lines()),
                ..Default::default()
            }
        }
    };

    Ok(response)
}

fn index() -> OperationResponse {
    OperationResponse {
        success: true,
        message: Some("Ranked battle season notice collector".to_string()),
        data: Some(serde_json::json!({
            "scrape": "Collect new season announcements and rebuild the table",
            "list": "Stored announcements",
            "json": "Season to regulation table",
            "deploy": "Publish the table",
        })),
        ..Default::default()
    }
}

/// Configuration from the store directory, with environment overrides.
fn load_lambda_config(storage_dir: &Path) -> Config {
    let mut config = Config::load_or_default(storage_dir.join("config.toml"));

    if let Ok(timeout) = std::env::var("CRAWL_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse() {
            config.crawler.timeout_secs = secs;
        }
    }

    if let Ok(delay) = std::env::var("REQUEST_DELAY_MS") {
        if let Ok(ms) = delay.parse() {
            config.crawler.request_delay_ms = ms;
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeasonRegulationTable;
    use crate::storage::DedupStore;
    use tempfile::TempDir;

    #[test]
    fn test_request_defaults_to_index() {
        let req: OperationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.operation, Operation::Index);
    }

    #[test]
    fn test_request_operation_names() {
        let req: OperationRequest = serde_json::from_str(r#"{"operation": "deploy"}"#).unwrap();
        assert_eq!(req.operation, Operation::Deploy);
        assert!(serde_json::from_str::<OperationRequest>(r#"{"operation": "nuke"}"#).is_err());
    }

    #[test]
    fn test_storage_dir_prefers_configured_path() {
        assert_eq!(
            storage_dir(Some("/mnt/efs/rankbattle".to_string())),
            PathBuf::from("/mnt/efs/rankbattle")
        );
        assert_eq!(storage_dir(None), PathBuf::from(FALLBACK_STORAGE_DIR));
        assert_eq!(storage_dir(Some("  ".to_string())), PathBuf::from(FALLBACK_STORAGE_DIR));
    }

    #[tokio::test]
    async fn test_json_before_scrape_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(dispatch(Operation::Json, tmp.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_json_returns_table() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::open(tmp.path()).await.unwrap();
        let table: SeasonRegulationTable = [(40, 'J'), (9, 'D')].into_iter().collect();
        DedupStore::new(&storage).set_table(&table).await.unwrap();

        let response = dispatch(Operation::Json, tmp.path()).await.unwrap();
        assert!(response.success);
        assert_eq!(
            serde_json::to_string(&response.data.unwrap()).unwrap(),
            r#"{"9":"D","40":"J"}"#
        );
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let tmp = TempDir::new().unwrap();
        let response = dispatch(Operation::List, tmp.path()).await.unwrap();
        assert_eq!(response.count, Some(0));
    }
}
