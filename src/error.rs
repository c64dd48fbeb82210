//! Error handling for forecast operations.
//!
//! Every failure that can cross the public contract is a variant here. The
//! caller-visible kinds (insufficient data, not found) carry fixed messages
//! because the JSON surface forwards them verbatim.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Queue identifier must not be empty")]
    InvalidLocation,

    #[error("Insufficient information to compute a forecast for queue '{location}'.")]
    InsufficientData { location: String },

    #[error("Forecast estimation failed for queue '{location}': {reason}")]
    EstimationFailed { location: String, reason: String },

    #[error("No forecast found for queue '{location}'.")]
    NotFound { location: String },

    #[error("Forecast store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    /// Create an insufficient data error
    pub fn insufficient_data(location: impl Into<String>) -> Self {
        Self::InsufficientData {
            location: location.into(),
        }
    }

    /// Create an estimation failure error
    pub fn estimation_failed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EstimationFailed {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::NotFound {
            location: location.into(),
        }
    }

    /// Create a store error wrapping an underlying cause
    pub fn store(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a store error with no underlying cause
    pub fn store_message(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Expected outcomes are not faults and are logged below warning level.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;
