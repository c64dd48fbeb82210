//! Forecast persistence.
//!
//! One record per location, keyed by the location identifier. Implementations
//! must make `upsert` a single replace-or-insert so concurrent writers for the
//! same key resolve as last-write-wins, and must treat `delete_older_than` as
//! a strict `<` cutoff.
//!
//! - [`MemoryForecastStore`]: concurrent in-process map
//! - [`FileForecastStore`]: JSON document on disk, replaced atomically

pub mod file;
pub mod memory;

#[cfg(test)]
pub mod tests;

pub use file::FileForecastStore;
pub use memory::MemoryForecastStore;

use crate::error::Result;
use crate::models::ForecastRecord;
use chrono::{DateTime, Utc};
use std::future::Future;

/// Storage port for forecast records.
///
/// Absence is a normal outcome of `find`, never an error.
pub trait ForecastStore: Send + Sync {
    /// Insert the record, replacing any record stored under the same location.
    fn upsert(&self, record: ForecastRecord) -> impl Future<Output = Result<()>> + Send;

    /// Point lookup by location.
    fn find(&self, location: &str) -> impl Future<Output = Result<Option<ForecastRecord>>> + Send;

    /// Delete every record computed strictly before `cutoff`.
    ///
    /// Returns the number of records deleted.
    fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<usize>> + Send;

    /// Number of stored records.
    fn count(&self) -> impl Future<Output = Result<usize>> + Send;
}
