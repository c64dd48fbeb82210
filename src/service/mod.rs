//! Forecast service: estimation plus persistence.
//!
//! The service owns the active model identity and the retention window, and
//! is the only component that reads or writes forecast records. Each call is
//! independent; no state is kept between calls beyond what the store holds.

#[cfg(test)]
pub mod tests;

use crate::clock::{Clock, SystemClock};
use crate::config::ForecasterConfig;
use crate::error::{ForecastError, Result};
use crate::estimation::Estimator;
use crate::models::{Estimation, Forecast, ForecastRecord, ModelConfig, SweepStats};
use crate::store::ForecastStore;
use chrono::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub struct ForecastService<E, S, C = SystemClock> {
    estimator: E,
    store: S,
    clock: C,
    model: ModelConfig,
    retention: Duration,
}

impl<E: Estimator, S: ForecastStore> ForecastService<E, S, SystemClock> {
    /// Create a service on the wall clock using the configured model identity
    pub fn new(estimator: E, store: S, config: &ForecasterConfig) -> Self {
        Self {
            estimator,
            store,
            clock: SystemClock,
            model: config.model.clone(),
            retention: config.retention_window(),
        }
    }
}

impl<E: Estimator, S: ForecastStore, C: Clock> ForecastService<E, S, C> {
    /// Swap the time source
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ForecastService<E, S, C2> {
        ForecastService {
            estimator: self.estimator,
            store: self.store,
            clock,
            model: self.model,
            retention: self.retention,
        }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Estimate a location's forecast and store it, replacing any previous one.
    ///
    /// Surrounding whitespace in `location` is ignored.
    ///
    /// A `model_id` that differs from the active model is logged and ignored;
    /// the stored record always carries the active model identity. The store
    /// is only written when estimation produces a result.
    pub async fn compute(&self, location: &str, model_id: &str) -> Result<Forecast> {
        let location = validate_location(location)?;

        if model_id != self.model.model_id {
            warn!(
                "Requested model '{}' for {} does not match active model '{}'; using '{}'",
                model_id, location, self.model.model_id, self.model.model_id
            );
        }

        let estimate = match self.estimator.estimate(location).await {
            Ok(Estimation::Estimate(estimate)) => estimate,
            Ok(Estimation::InsufficientData) => {
                info!("Insufficient data to forecast {}", location);
                return Err(ForecastError::insufficient_data(location));
            }
            Err(e) => {
                error!("Estimation failed for {}: {}", location, e);
                return Err(match e {
                    ForecastError::EstimationFailed { .. } => e,
                    other => ForecastError::estimation_failed(location, other.to_string()),
                });
            }
        };

        if !estimate.is_finite() {
            error!("Rejecting non-finite estimate for {}: {:?}", location, estimate);
            return Err(ForecastError::estimation_failed(
                location,
                "estimate is not a finite number",
            ));
        }

        let previous = self.store.find(location).await.inspect_err(|e| {
            error!("Failed to read previous forecast for {}: {}", location, e);
        })?;

        let mut computed_at = self.clock.now();
        if let Some(previous) = previous {
            let floor = previous.computed_at + Duration::milliseconds(1);
            if computed_at < floor {
                computed_at = floor;
            }
        }

        let record = ForecastRecord::new(location, &self.model, &estimate, computed_at);
        let forecast = record.to_forecast();

        self.store.upsert(record).await.inspect_err(|e| {
            error!("Failed to store forecast for {}: {}", location, e);
        })?;

        debug!(
            "Stored forecast for {}: {:.1} min, p(entry) {:.2}",
            location, forecast.estimate.estimated_wait_minutes, forecast.estimate.entry_probability
        );
        Ok(forecast)
    }

    /// Latest stored forecast for a location, whatever its age.
    pub async fn retrieve(&self, location: &str) -> Result<Forecast> {
        let location = validate_location(location)?;

        match self.store.find(location).await {
            Ok(Some(record)) => Ok(record.to_forecast()),
            Ok(None) => {
                debug!("No forecast stored for {}", location);
                Err(ForecastError::not_found(location))
            }
            Err(e) => {
                error!("Failed to read forecast for {}: {}", location, e);
                Err(e)
            }
        }
    }

    /// Delete forecasts computed before `now - retention`.
    pub async fn sweep(&self) -> Result<SweepStats> {
        let now = self.clock.now();
        let cutoff = now.checked_sub_signed(self.retention).ok_or_else(|| {
            ForecastError::configuration(format!(
                "Retention window of {} hours reaches before the earliest representable time",
                self.retention.num_hours()
            ))
        })?;

        let removed = self
            .store
            .delete_older_than(cutoff)
            .await
            .inspect_err(|e| error!("Forecast sweep failed: {}", e))?;

        info!("Swept {} forecasts computed before {}", removed, cutoff);
        Ok(SweepStats { removed, cutoff })
    }
}

/// Trimmed identifier used as the record key
fn validate_location(location: &str) -> Result<&str> {
    let location = location.trim();
    if location.is_empty() {
        Err(ForecastError::InvalidLocation)
    } else {
        Ok(location)
    }
}
