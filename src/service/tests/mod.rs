//! Tests for the forecast service
//!
//! Uses scripted estimators and stores so each outcome of the compute path
//! can be driven directly.


use crate::clock::{Clock, ManualClock};
use crate::config::ForecasterConfig;
use crate::error::{ForecastError, Result};
use crate::estimation::Estimator;
use crate::models::{ConfidenceInterval, Estimate, Estimation, ForecastRecord};
use crate::service::ForecastService;
use crate::store::{ForecastStore, MemoryForecastStore};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const MODEL_ID: &str = "m1";

/// Estimator answering from a fixed table; unknown locations get 15 minutes
#[derive(Debug, Default)]
pub struct ScriptedEstimator {
    outcomes: HashMap<String, Outcome>,
    calls: AtomicUsize,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Wait(f64),
    Probability(f64),
    NoData,
    Fail,
}

impl ScriptedEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: &str, outcome: Outcome) -> Self {
        self.outcomes.insert(location.to_string(), outcome);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Estimator for ScriptedEstimator {
    async fn estimate(&self, location: &str) -> Result<Estimation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .outcomes
            .get(location)
            .cloned()
            .unwrap_or(Outcome::Wait(15.0));

        match outcome {
            Outcome::Wait(minutes) => Ok(Estimation::Estimate(Estimate::new(
                minutes,
                1.0 - minutes / 100.0,
                ConfidenceInterval::around(minutes, 5.0),
            ))),
            // Deliberately out-of-range probability; the record must clamp it
            Outcome::Probability(p) => Ok(Estimation::Estimate(Estimate {
                estimated_wait_minutes: 10.0,
                entry_probability: p,
                confidence_interval: ConfidenceInterval::around(10.0, 5.0),
            })),
            Outcome::NoData => Ok(Estimation::InsufficientData),
            Outcome::Fail => Err(ForecastError::estimation_failed(location, "provider down")),
        }
    }
}

/// Store whose writes always fail
#[derive(Debug, Default)]
pub struct ReadOnlyStore {
    inner: MemoryForecastStore,
}

impl ReadOnlyStore {
    pub fn seeded(record: ForecastRecord) -> Self {
        let inner = MemoryForecastStore::new();
        futures::executor::block_on(inner.upsert(record)).unwrap();
        Self { inner }
    }
}

impl ForecastStore for ReadOnlyStore {
    async fn upsert(&self, _record: ForecastRecord) -> Result<()> {
        Err(ForecastError::store_message("connection refused"))
    }

    async fn find(&self, location: &str) -> Result<Option<ForecastRecord>> {
        self.inner.find(location).await
    }

    async fn delete_older_than(&self, _cutoff: DateTime<Utc>) -> Result<usize> {
        Err(ForecastError::store_message("connection refused"))
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}

pub fn config() -> ForecasterConfig {
    ForecasterConfig::default().with_model_id(MODEL_ID)
}

/// Service over a memory store on a manual clock
pub fn service_with(
    estimator: ScriptedEstimator,
) -> (
    ForecastService<ScriptedEstimator, MemoryForecastStore, ManualClock>,
    ManualClock,
) {
    let clock = ManualClock::new(start_time());
    let service = ForecastService::new(estimator, MemoryForecastStore::new(), &config())
        .with_clock(clock.clone());
    (service, clock)
}
