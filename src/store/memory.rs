//! In-memory forecast store.
//!
//! Uses `DashMap` so lookups and upserts for different locations proceed
//! without a global lock.

use super::ForecastStore;
use crate::error::Result;
use crate::models::ForecastRecord;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe forecast map keyed by location. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryForecastStore {
    records: Arc<DashMap<String, ForecastRecord>>,
}

impl MemoryForecastStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot of all records, sorted by location
    pub fn records(&self) -> Vec<ForecastRecord> {
        let mut records: Vec<_> = self.records.iter().map(|e| e.value().clone()).collect();
        records.sort_by(|a, b| a.location.cmp(&b.location));
        records
    }
}

impl ForecastStore for MemoryForecastStore {
    async fn upsert(&self, record: ForecastRecord) -> Result<()> {
        self.records.insert(record.location.clone(), record);
        Ok(())
    }

    async fn find(&self, location: &str) -> Result<Option<ForecastRecord>> {
        Ok(self.records.get(location).map(|entry| entry.value().clone()))
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        self.records.retain(|_, record| {
            let keep = record.computed_at >= cutoff;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
