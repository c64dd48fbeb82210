//! Wait-time estimation.
//!
//! An [`Estimator`] maps a location to an [`Estimation`]: either an estimate
//! or an explicit insufficient-data outcome. Faults in the underlying signal
//! sources surface as `ForecastError::EstimationFailed`, never as either of
//! the two normal outcomes.
//!
//! The shipped estimator is [`BlendingEstimator`], which combines live user
//! reports with a historical baseline obtained from a [`SignalProvider`].

pub mod blend;
pub mod reports;
pub mod signals;

#[cfg(test)]
pub mod tests;

pub use blend::{BlendingEstimator, combine};
pub use reports::{ReportFeed, UserReport, WithReports};
pub use signals::{PatternRule, PatternSignalProvider, SignalBehavior, SignalError, SignalProvider};

use crate::error::Result;
use crate::models::Estimation;
use std::future::Future;

/// Produces an estimate for a location. Stateless with respect to stored forecasts.
pub trait Estimator: Send + Sync {
    fn estimate(&self, location: &str) -> impl Future<Output = Result<Estimation>> + Send;
}
