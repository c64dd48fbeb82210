//! Configuration management and validation.
//!
//! Provides the forecaster configuration: the active model identity, the
//! retention window, the blending heuristics, and where forecasts and user
//! reports live on disk. Loaded from TOML and layered with CLI overrides.

use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_RETENTION_HOURS, FALLBACK_STORE_PATH,
    MAX_RETENTION_HOURS, STORE_FILE_NAME, estimation,
};
use crate::error::{ForecastError, Result};
use crate::models::{CrowdLevel, ModelConfig, ModelKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parameters of the live/baseline combination rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Weight each live observation contributes against the baseline
    pub live_weight_per_report: f64,

    /// Cap on the total live weight while a baseline is available
    pub max_live_weight: f64,

    /// Smallest half-width of the confidence interval (minutes)
    pub min_half_width_minutes: f64,

    /// Half-width as a fraction of the wait estimate
    pub relative_half_width: f64,

    /// Entry probability lost per minute of estimated wait
    pub probability_penalty_per_minute: f64,

    /// Minutes implied by each crowd level: low, moderate, high, packed
    pub crowd_level_minutes: [f64; 4],
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            live_weight_per_report: estimation::LIVE_WEIGHT_PER_REPORT,
            max_live_weight: estimation::MAX_LIVE_WEIGHT,
            min_half_width_minutes: estimation::MIN_HALF_WIDTH_MINUTES,
            relative_half_width: estimation::RELATIVE_HALF_WIDTH,
            probability_penalty_per_minute: estimation::PROBABILITY_PENALTY_PER_MINUTE,
            crowd_level_minutes: estimation::CROWD_LEVEL_MINUTES,
        }
    }
}

impl BlendConfig {
    pub fn crowd_level_wait(&self, level: CrowdLevel) -> f64 {
        self.crowd_level_minutes[level.index()]
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, value: f64| -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ForecastError::configuration(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )))
            }
        };
        unit("live_weight_per_report", self.live_weight_per_report)?;
        unit("max_live_weight", self.max_live_weight)?;

        let non_negative = [
            ("min_half_width_minutes", self.min_half_width_minutes),
            ("relative_half_width", self.relative_half_width),
            (
                "probability_penalty_per_minute",
                self.probability_penalty_per_minute,
            ),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ForecastError::configuration(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        if self.crowd_level_minutes.iter().any(|m| !(*m >= 0.0)) {
            return Err(ForecastError::configuration(
                "crowd_level_minutes entries must be non-negative",
            ));
        }

        Ok(())
    }
}

/// Top-level forecaster configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecasterConfig {
    /// Records older than this many hours are swept
    pub retention_hours: i64,

    /// Forecast store file; defaults to the platform data dir
    pub store_path: Option<PathBuf>,

    /// Validated user report feed (JSON)
    pub reports_path: Option<PathBuf>,

    /// Model identity stamped on every stored forecast
    pub model: ModelConfig,

    /// Combination rule parameters
    pub blend: BlendConfig,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            retention_hours: DEFAULT_RETENTION_HOURS,
            store_path: None,
            reports_path: None,
            model: ModelConfig::default(),
            blend: BlendConfig::default(),
        }
    }
}

impl ForecasterConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| ForecastError::configuration(format!("Invalid config file: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ForecastError::configuration(format!("Failed to render config: {}", e)))
    }

    /// Platform config file location, e.g. ~/.config/queue-forecast/config.toml
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Effective store location
    pub fn resolved_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(STORE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_STORE_PATH))
    }

    /// Retention as a duration; saturates when out of range
    pub fn retention_window(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.retention_hours).unwrap_or(chrono::Duration::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.model_id.trim().is_empty() {
            return Err(ForecastError::configuration("model_id must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.model.accuracy_threshold) {
            return Err(ForecastError::configuration(format!(
                "accuracy_threshold must be between 0 and 1, got {}",
                self.model.accuracy_threshold
            )));
        }
        if self.retention_hours <= 0 || self.retention_hours > MAX_RETENTION_HOURS {
            return Err(ForecastError::configuration(format!(
                "retention_hours must be between 1 and {}, got {}",
                MAX_RETENTION_HOURS, self.retention_hours
            )));
        }
        self.blend.validate()
    }

    /// Set the active model identifier
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model.model_id = model_id.into();
        self
    }

    /// Set the model family tag
    pub fn with_model_kind(mut self, kind: ModelKind) -> Self {
        self.model.kind = kind;
        self
    }

    /// Set the retention window in hours
    pub fn with_retention_hours(mut self, hours: i64) -> Self {
        self.retention_hours = hours;
        self
    }

    /// Set the forecast store location
    pub fn with_store_path(mut self, path: PathBuf) -> Self {
        self.store_path = Some(path);
        self
    }

    /// Set the user report feed location
    pub fn with_reports_path(mut self, path: PathBuf) -> Self {
        self.reports_path = Some(path);
        self
    }

    /// Replace the blend parameters
    pub fn with_blend(mut self, blend: BlendConfig) -> Self {
        self.blend = blend;
        self
    }
}
