//! Tests for the forecast store implementations
//!
//! Both stores are driven through the same `ForecastStore` contract checks,
//! plus backend-specific tests for persistence behaviour.


use crate::models::{ConfidenceInterval, Estimate, ForecastRecord, ModelConfig};
use crate::store::ForecastStore;
use chrono::{DateTime, Duration, Utc};

/// Build a record for `location` computed at `computed_at`
pub fn record_at(location: &str, wait: f64, computed_at: DateTime<Utc>) -> ForecastRecord {
    let estimate = Estimate::new(wait, 1.0 - wait / 100.0, ConfidenceInterval::around(wait, 5.0));
    ForecastRecord::new(location, &ModelConfig::default(), &estimate, computed_at)
}

/// Upsert replaces by key and never duplicates
pub async fn check_upsert_replaces<S: ForecastStore>(store: &S) {
    let now = Utc::now();
    store.upsert(record_at("loc:a", 10.0, now)).await.unwrap();
    store
        .upsert(record_at("loc:a", 20.0, now + Duration::seconds(1)))
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    let found = store.find("loc:a").await.unwrap().unwrap();
    assert_eq!(found.estimated_wait_minutes, 20.0);
    assert_eq!(found.computed_at, now + Duration::seconds(1));
}

/// Missing keys are `None`, not errors
pub async fn check_find_missing<S: ForecastStore>(store: &S) {
    assert!(store.find("loc:missing").await.unwrap().is_none());
}

/// Records exactly at the cutoff survive; strictly older ones are removed
pub async fn check_delete_boundary<S: ForecastStore>(store: &S) {
    let cutoff = Utc::now();
    store
        .upsert(record_at("loc:old", 10.0, cutoff - Duration::milliseconds(1)))
        .await
        .unwrap();
    store.upsert(record_at("loc:edge", 10.0, cutoff)).await.unwrap();
    store
        .upsert(record_at("loc:new", 10.0, cutoff + Duration::milliseconds(1)))
        .await
        .unwrap();

    assert_eq!(store.delete_older_than(cutoff).await.unwrap(), 1);
    assert!(store.find("loc:old").await.unwrap().is_none());
    assert!(store.find("loc:edge").await.unwrap().is_some());
    assert!(store.find("loc:new").await.unwrap().is_some());

    // Second pass with the same cutoff has nothing left to do
    assert_eq!(store.delete_older_than(cutoff).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 2);
}
