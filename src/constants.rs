//! Application constants for the queue forecaster
//!
//! Default values for the model identity, retention policy, and the
//! estimation heuristics, plus well-known file locations.

// =============================================================================
// Model Identity
// =============================================================================

/// Model identifier stamped on forecasts when no configuration overrides it
pub const DEFAULT_MODEL_ID: &str = "wait-blend-v1";

/// Accuracy threshold recorded alongside each forecast
pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 0.8;

// =============================================================================
// Retention Policy
// =============================================================================

/// Forecast records older than this are removed by a sweep
pub const DEFAULT_RETENTION_HOURS: i64 = 48;

/// Upper bound on the configurable retention window (a century)
pub const MAX_RETENTION_HOURS: i64 = 24 * 365 * 100;

// =============================================================================
// Estimation Heuristics
// =============================================================================

pub mod estimation {
    /// Weight each live report contributes against the historical baseline
    pub const LIVE_WEIGHT_PER_REPORT: f64 = 0.2;

    /// Upper bound on the combined live weight when a baseline exists
    pub const MAX_LIVE_WEIGHT: f64 = 0.8;

    /// Smallest half-width of the confidence interval, in minutes
    pub const MIN_HALF_WIDTH_MINUTES: f64 = 5.0;

    /// Half-width as a fraction of the estimated wait
    pub const RELATIVE_HALF_WIDTH: f64 = 0.25;

    /// Entry probability lost per minute of estimated wait
    pub const PROBABILITY_PENALTY_PER_MINUTE: f64 = 0.01;

    /// Wait minutes implied by each crowd level: low, moderate, high, packed
    pub const CROWD_LEVEL_MINUTES: [f64; 4] = [5.0, 15.0, 30.0, 50.0];

    /// Range of the hash-derived baseline used for unmatched identifiers
    pub const FALLBACK_MIN_WAIT_MINUTES: f64 = 5.0;
    pub const FALLBACK_MAX_WAIT_MINUTES: f64 = 45.0;

    /// Spread attached to hash-derived baselines, as a fraction of the mean
    pub const FALLBACK_SPREAD_RATIO: f64 = 0.3;

    /// Identifier fragments the stub provider treats specially
    pub const NO_DATA_PATTERN: &str = "no-data";
    pub const FAILURE_PATTERN: &str = "fail";
}

// =============================================================================
// File Locations
// =============================================================================

/// Application directory name under the platform config/data dirs
pub const APP_DIR_NAME: &str = "queue-forecast";

/// Config file name looked up in the platform config dir
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Forecast store file name under the platform data dir
pub const STORE_FILE_NAME: &str = "forecasts.json";

/// Fallback store location when no data dir can be determined
pub const FALLBACK_STORE_PATH: &str = "./forecasts.json";
