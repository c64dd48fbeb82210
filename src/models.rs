//! Core data structures for forecasting.
//!
//! Defines the model identity stamped on forecasts, estimation outputs, the
//! persisted forecast record, and the upstream signal types consumed by the
//! estimator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEFAULT_ACCURACY_THRESHOLD, DEFAULT_MODEL_ID};
use crate::error::ForecastError;

/// Descriptive model family tag. Does not select an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Regression,
    Bayesian,
    Neural,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Regression => "regression",
            ModelKind::Bayesian => "bayesian",
            ModelKind::Neural => "neural",
        };
        f.write_str(name)
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regression" => Ok(ModelKind::Regression),
            "bayesian" => Ok(ModelKind::Bayesian),
            "neural" => Ok(ModelKind::Neural),
            other => Err(ForecastError::configuration(format!(
                "Unknown model kind '{}'. Valid kinds: regression, bayesian, neural",
                other
            ))),
        }
    }
}

/// Identity of the active estimation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub model_id: String,
    pub kind: ModelKind,
    pub accuracy_threshold: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            kind: ModelKind::default(),
            accuracy_threshold: DEFAULT_ACCURACY_THRESHOLD,
        }
    }
}

/// Band around a wait estimate, in minutes. `low <= high`, both non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

impl ConfidenceInterval {
    /// Band of `half_width` either side of `center`, clamped at zero
    pub fn around(center: f64, half_width: f64) -> Self {
        let half_width = half_width.abs();
        let low = (center - half_width).max(0.0);
        let high = (center + half_width).max(low);
        Self { low, high }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Successful estimation output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub estimated_wait_minutes: f64,
    pub entry_probability: f64,
    pub confidence_interval: ConfidenceInterval,
}

impl Estimate {
    /// Build an estimate, enforcing the value bounds
    pub fn new(wait_minutes: f64, entry_probability: f64, interval: ConfidenceInterval) -> Self {
        Self {
            estimated_wait_minutes: wait_minutes.max(0.0),
            entry_probability: clamp_probability(entry_probability),
            confidence_interval: interval,
        }
    }

    /// All fields are finite numbers, i.e. representable in JSON
    pub fn is_finite(&self) -> bool {
        self.estimated_wait_minutes.is_finite()
            && self.entry_probability.is_finite()
            && self.confidence_interval.low.is_finite()
            && self.confidence_interval.high.is_finite()
    }
}

/// Outcome of a single estimation call.
///
/// Insufficient data is an expected outcome, distinct from a zero-wait
/// estimate and from an estimation fault (which is an `Err`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimation {
    Estimate(Estimate),
    InsufficientData,
}

/// Persisted forecast for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRecord {
    pub location: String,
    pub model_id: String,
    pub model_kind: ModelKind,
    pub accuracy_threshold: f64,
    pub estimated_wait_minutes: f64,
    pub entry_probability: f64,
    pub confidence_interval: ConfidenceInterval,
    pub computed_at: DateTime<Utc>,
}

impl ForecastRecord {
    /// Stamp an estimate with model metadata and a computation time
    pub fn new(
        location: impl Into<String>,
        model: &ModelConfig,
        estimate: &Estimate,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            location: location.into(),
            model_id: model.model_id.clone(),
            model_kind: model.kind,
            accuracy_threshold: model.accuracy_threshold,
            estimated_wait_minutes: estimate.estimated_wait_minutes.max(0.0),
            entry_probability: clamp_probability(estimate.entry_probability),
            confidence_interval: estimate.confidence_interval,
            computed_at,
        }
    }

    pub fn estimate(&self) -> Estimate {
        Estimate {
            estimated_wait_minutes: self.estimated_wait_minutes,
            entry_probability: self.entry_probability,
            confidence_interval: self.confidence_interval,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.estimate().is_finite()
    }

    pub fn to_forecast(&self) -> Forecast {
        Forecast {
            location: self.location.clone(),
            estimate: self.estimate(),
            computed_at: self.computed_at,
        }
    }
}

/// Retrieved forecast: result fields plus the time of computation
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub location: String,
    pub estimate: Estimate,
    pub computed_at: DateTime<Utc>,
}

/// Result of a retention sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    pub removed: usize,
    pub cutoff: DateTime<Utc>,
}

/// Coarse crowd level reported by users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrowdLevel {
    Low,
    Moderate,
    High,
    Packed,
}

impl CrowdLevel {
    pub fn index(self) -> usize {
        match self {
            CrowdLevel::Low => 0,
            CrowdLevel::Moderate => 1,
            CrowdLevel::High => 2,
            CrowdLevel::Packed => 3,
        }
    }
}

/// Validated user report consumed as a live signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveReport {
    pub location: String,
    #[serde(default)]
    pub reported_wait_minutes: Option<f64>,
    #[serde(default)]
    pub reported_crowd_level: Option<CrowdLevel>,
}

/// Historical or model-based expectation for a location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub mean_wait_minutes: f64,
    pub spread_minutes: f64,
}

/// Clamp into [0, 1]; NaN maps to 0
pub fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_parse_and_display() {
        assert_eq!("Bayesian".parse::<ModelKind>().unwrap(), ModelKind::Bayesian);
        assert_eq!(ModelKind::Neural.to_string(), "neural");
        assert!("forest".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_interval_clamps_at_zero() {
        let interval = ConfidenceInterval::around(3.0, 5.0);
        assert_eq!(interval.low, 0.0);
        assert_eq!(interval.high, 8.0);
        assert!(interval.contains(3.0));
    }

    #[test]
    fn test_estimate_bounds() {
        let estimate = Estimate::new(-2.0, 1.7, ConfidenceInterval::around(0.0, 1.0));
        assert_eq!(estimate.estimated_wait_minutes, 0.0);
        assert_eq!(estimate.entry_probability, 1.0);
        assert_eq!(clamp_probability(f64::NAN), 0.0);
        assert_eq!(clamp_probability(-0.5), 0.0);
    }

    #[test]
    fn test_estimate_finiteness() {
        let finite = Estimate::new(12.0, 0.9, ConfidenceInterval::around(12.0, 5.0));
        assert!(finite.is_finite());

        let unbounded = Estimate::new(f64::INFINITY, 0.0, ConfidenceInterval::around(1.0, 5.0));
        assert!(!unbounded.is_finite());

        let wide = Estimate::new(1.0, 0.9, ConfidenceInterval::around(1.0, f64::INFINITY));
        assert!(!wide.is_finite());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let estimate = Estimate::new(12.0, 0.88, ConfidenceInterval::around(12.0, 5.0));
        let record =
            ForecastRecord::new("loc:cafe", &ModelConfig::default(), &estimate, Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["location"], "loc:cafe");
        assert_eq!(json["modelKind"], "regression");
        assert!(json.get("computedAt").is_some());
        assert!(json.get("estimatedWaitMinutes").is_some());
    }
}
