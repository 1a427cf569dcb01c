//! Local filesystem storage implementation.
//!
//! Every key is one JSON file below the root directory.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml                   # Crawler Configuration
//! ├── season_regulation_map.json    # Aggregate table
//! └── news/
//!     └── h-<sha256 of url>.json    # One announcement per file
//! ```
//!
//! Key parts made only of `[A-Za-z0-9_-]` become path segments verbatim;
//! anything else (URLs) is replaced by `h-` plus its SHA-256 hex digest.
//! Each file stores `{ "key": [...], "value": ... }` so listing can return
//! the original keys.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{KvEntry, KvStore};

/// Local filesystem storage backend.
///
/// Opened explicitly with [`LocalStorage::open`] and released on drop.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Open (creating if needed) a store rooted at the given directory.
    pub async fn open(root_dir: impl Into<PathBuf>) -> Result<Self> {
        let root_dir = root_dir.into();
        tokio::fs::create_dir_all(&root_dir).await?;
        log::debug!("Opened store at {}", root_dir.display());
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Encode one key part as a file-system safe segment.
    fn encode_part(part: &str) -> String {
        let plain = !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if plain && !part.starts_with("h-") {
            part.to_string()
        } else {
            format!("h-{}", hex::encode(Sha256::digest(part.as_bytes())))
        }
    }

    /// Directory that holds every key under `prefix`.
    fn dir_path(&self, prefix: &[&str]) -> PathBuf {
        prefix
            .iter()
            .fold(self.root_dir.clone(), |path, part| {
                path.join(Self::encode_part(part))
            })
    }

    /// Get the full path for a key.
    fn path(&self, key: &[&str]) -> Result<PathBuf> {
        let (last, parents) = key
            .split_last()
            .ok_or_else(|| AppError::store("empty key"))?;
        Ok(self
            .dir_path(parents)
            .join(format!("{}.json", Self::encode_part(last))))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_entry(&self, path: &Path) -> Result<Option<KvEntry>> {
        match self.read_bytes(path).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| AppError::store(format!("{}: {e}", path.display()))),
            None => Ok(None),
        }
    }

    /// Collect entry files below `dir`, depth first, in file-name order.
    async fn collect_files(&self, dir: PathBuf, files: &mut Vec<PathBuf>) -> Result<()> {
        let mut pending = vec![dir];

        while let Some(dir) = pending.pop() {
            let mut reader = match tokio::fs::read_dir(&dir).await {
                Ok(reader) => reader,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(AppError::Io(e)),
            };

            let mut children = Vec::new();
            while let Some(entry) = reader.next_entry().await? {
                children.push(entry.path());
            }
            children.sort();

            for child in children.into_iter().rev() {
                if tokio::fs::metadata(&child).await?.is_dir() {
                    pending.push(child);
                } else if child.extension().is_some_and(|ext| ext == "json") {
                    files.push(child);
                }
            }
        }

        files.sort();
        Ok(())
    }
}

#[async_trait]
impl KvStore for LocalStorage {
    async fn get(&self, key: &[&str]) -> Result<Option<Value>> {
        let path = self.path(key)?;
        Ok(self.read_entry(&path).await?.map(|entry| entry.value))
    }

    async fn set(&self, key: &[&str], value: &Value) -> Result<()> {
        let path = self.path(key)?;
        let entry = KvEntry {
            key: key.iter().map(|part| part.to_string()).collect(),
            value: value.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&entry)?;
        self.write_bytes(&path, &bytes).await
    }

    async fn list(&self, prefix: &[&str]) -> Result<Vec<KvEntry>> {
        let mut files = Vec::new();
        self.collect_files(self.dir_path(prefix), &mut files).await?;

        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            if let Some(entry) = self.read_entry(&file).await? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
