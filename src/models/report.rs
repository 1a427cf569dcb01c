//! Structured results returned by pipeline operations.

use serde::Serialize;

/// Human-readable events recorded during an operation.
///
/// Every entry is also forwarded to the `log` facade; the collected lines
/// travel back to the caller inside the operation's result.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RunLog(Vec<String>);

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{}", message);
        self.0.push(message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.0.push(format!("[WARN] {}", message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.0.push(format!("[ERROR] {}", message));
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn into_lines(self) -> Vec<String> {
        self.0
    }
}

/// Counters for a collection pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Announcements stored for the first time
    pub new_count: usize,
    /// Announcements skipped because their URL was already stored
    pub duplicate_count: usize,
    /// Pages fetched but missing the season or regulation
    pub invalid_count: usize,
    /// Pages that could not be fetched
    pub failed_count: usize,
    /// Seasons in the rebuilt table (0 when the pass was abandoned)
    pub table_size: usize,
    pub events: RunLog,
}

/// Outcome of publishing the table.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub deploy_id: String,
    /// SHA-1 hex digest of the published bytes
    pub digest: String,
    /// Whether the bytes had to be uploaded
    pub uploaded: bool,
    pub events: RunLog,
}
