//! Queue Forecast Library
//!
//! Per-location queue forecasts built from two kinds of signal: live,
//! validated user reports and a historical or model-based baseline.
//!
//! This library provides:
//! - A blending estimator producing wait time, entry probability, and a
//!   confidence interval, or an explicit insufficient-data outcome
//! - Forecast stores keeping exactly one record per location (in-memory and
//!   file-backed)
//! - A forecast service that computes, retrieves, and sweeps stale forecasts
//! - The JSON request/response contract of the prediction actions
//! - A command-line interface over all of the above

pub mod api;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod estimation;
pub mod models;
pub mod service;
pub mod store;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BlendConfig, ForecasterConfig};
pub use error::{ForecastError, Result};
pub use estimation::{BlendingEstimator, Estimator, PatternSignalProvider, ReportFeed, WithReports};
pub use models::{
    ConfidenceInterval, Estimate, Estimation, Forecast, ForecastRecord, ModelConfig, ModelKind,
    SweepStats,
};
pub use service::ForecastService;
pub use store::{FileForecastStore, ForecastStore, MemoryForecastStore};
