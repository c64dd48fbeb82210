//! File-backed forecast store.
//!
//! Keeps every record in one JSON document mapping location to record.
//! Mutations rewrite the document through a temporary file in the same
//! directory followed by a rename, so a failed write leaves the previous
//! document in place. Records with non-finite values are rejected.

use super::ForecastStore;
use crate::error::{ForecastError, Result};
use crate::models::ForecastRecord;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

type Document = BTreeMap<String, ForecastRecord>;

#[derive(Debug)]
pub struct FileForecastStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileForecastStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => {
                return Err(ForecastError::store(
                    format!("Failed to read {}", self.path.display()),
                    e,
                ));
            }
        };

        if text.trim().is_empty() {
            return Ok(Document::new());
        }

        serde_json::from_str(&text).map_err(|e| {
            ForecastError::store(format!("Corrupt forecast file {}", self.path.display()), e)
        })
    }

    async fn save(&self, document: Document) -> Result<()> {
        let path = self.path.clone();
        let records = document.len();

        tokio::task::spawn_blocking(move || write_atomically(&path, &document))
            .await
            .map_err(|e| {
                ForecastError::store_message(format!("Forecast write task failed: {}", e))
            })??;

        debug!("Wrote {} forecast records to {}", records, self.path.display());
        Ok(())
    }
}

fn write_atomically(path: &Path, document: &Document) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| {
        ForecastError::store(format!("Failed to create {}", parent.display()), e)
    })?;

    let mut temp = NamedTempFile::new_in(&parent)
        .map_err(|e| ForecastError::store("Failed to create temporary forecast file", e))?;
    serde_json::to_writer_pretty(temp.as_file_mut(), document)
        .map_err(|e| ForecastError::store("Failed to serialize forecasts", e))?;
    temp.as_file_mut()
        .flush()
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| ForecastError::store("Failed to flush forecast file", e))?;
    temp.persist(path).map_err(|e| {
        ForecastError::store(format!("Failed to replace {}", path.display()), e.error)
    })?;
    Ok(())
}

impl ForecastStore for FileForecastStore {
    async fn upsert(&self, record: ForecastRecord) -> Result<()> {
        // JSON has no representation for NaN or infinity.
        if !record.is_finite() {
            return Err(ForecastError::store_message(format!(
                "Refusing to store non-finite forecast for {}",
                record.location
            )));
        }

        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        document.insert(record.location.clone(), record);
        self.save(document).await
    }

    async fn find(&self, location: &str) -> Result<Option<ForecastRecord>> {
        let mut document = self.load().await?;
        Ok(document.remove(location))
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        let before = document.len();
        document.retain(|_, record| record.computed_at >= cutoff);
        let removed = before - document.len();

        // Nothing to rewrite; also keeps a missing file missing.
        if removed > 0 {
            self.save(document).await?;
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.load().await?.len())
    }
}
