//! Combination of live observations with a historical baseline.
//!
//! Each live observation shifts weight away from the baseline, up to a cap,
//! so a single stray report cannot override history. Without a baseline the
//! live mean is used as-is; without either there is no estimate.

use super::Estimator;
use super::signals::SignalProvider;
use crate::config::BlendConfig;
use crate::error::{ForecastError, Result};
use crate::models::{
    Baseline, ConfidenceInterval, Estimate, Estimation, LiveReport, clamp_probability,
};
use tracing::{debug, error};

/// Estimator blending live reports and baselines from a signal provider
#[derive(Debug, Clone)]
pub struct BlendingEstimator<P> {
    provider: P,
    blend: BlendConfig,
}

impl<P: SignalProvider> BlendingEstimator<P> {
    pub fn new(provider: P, blend: BlendConfig) -> Self {
        Self { provider, blend }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn blend(&self) -> &BlendConfig {
        &self.blend
    }
}

impl<P: SignalProvider> Estimator for BlendingEstimator<P> {
    async fn estimate(&self, location: &str) -> Result<Estimation> {
        let (reports, baseline) = tokio::try_join!(
            self.provider.live_reports(location),
            self.provider.baseline(location)
        )
        .map_err(|e| {
            error!("Signal lookup failed for {}: {}", location, e);
            ForecastError::estimation_failed(location, e.to_string())
        })?;

        let estimation = combine(&self.blend, &reports, baseline);
        if let Estimation::Estimate(estimate) = &estimation {
            if !estimate.is_finite() {
                error!("Non-finite estimate for {}: {:?}", location, estimate);
                return Err(ForecastError::estimation_failed(
                    location,
                    "estimate is not a finite number",
                ));
            }
        }
        debug!(
            "Estimated {} from {} live reports (baseline: {}): {:?}",
            location,
            reports.len(),
            baseline.is_some(),
            estimation
        );
        Ok(estimation)
    }
}

/// Wait observation carried by a report, if any
fn observed_wait(blend: &BlendConfig, report: &LiveReport) -> Option<f64> {
    report
        .reported_wait_minutes
        .filter(|minutes| minutes.is_finite())
        .map(|minutes| minutes.max(0.0))
        .or_else(|| {
            report
                .reported_crowd_level
                .map(|level| blend.crowd_level_wait(level))
        })
}

/// Apply the combination rule to already-fetched signals
pub fn combine(
    blend: &BlendConfig,
    reports: &[LiveReport],
    baseline: Option<Baseline>,
) -> Estimation {
    let observations: Vec<f64> = reports
        .iter()
        .filter_map(|report| observed_wait(blend, report))
        .collect();
    let baseline =
        baseline.filter(|b| b.mean_wait_minutes.is_finite() && b.spread_minutes.is_finite());

    if observations.is_empty() && baseline.is_none() {
        return Estimation::InsufficientData;
    }

    // Divide before summing so large observations cannot overflow to infinity.
    let count = observations.len().max(1) as f64;
    let live_mean: f64 = observations.iter().map(|minutes| minutes / count).sum();

    let live_weight = match baseline {
        None => 1.0,
        Some(_) => {
            (observations.len() as f64 * blend.live_weight_per_report).min(blend.max_live_weight)
        }
    };

    let (baseline_mean, baseline_spread) = baseline
        .map(|b| (b.mean_wait_minutes.max(0.0), b.spread_minutes.abs()))
        .unwrap_or((0.0, 0.0));

    let wait = (live_weight * live_mean + (1.0 - live_weight) * baseline_mean).max(0.0);

    let half_width = blend
        .min_half_width_minutes
        .max(blend.relative_half_width * wait)
        + (1.0 - live_weight) * baseline_spread;
    let interval = ConfidenceInterval::around(wait, half_width);

    let probability = clamp_probability(1.0 - wait * blend.probability_penalty_per_minute);

    Estimation::Estimate(Estimate::new(wait, probability, interval))
}
