//! Validated user reports as a live signal source.
//!
//! Reports arrive from the upstream submission workflow with a `validated`
//! flag. Only validated reports are kept; [`WithReports`] layers them over a
//! baseline provider.

use super::signals::{SignalError, SignalProvider};
use crate::error::{ForecastError, Result};
use crate::models::{Baseline, CrowdLevel, LiveReport};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Report as produced by the upstream submission workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReport {
    pub location: String,
    #[serde(default)]
    pub reported_wait_minutes: Option<f64>,
    #[serde(default)]
    pub reported_crowd_level: Option<CrowdLevel>,
    #[serde(default)]
    pub validated: bool,
}

impl From<UserReport> for LiveReport {
    fn from(report: UserReport) -> Self {
        LiveReport {
            location: report.location,
            reported_wait_minutes: report.reported_wait_minutes,
            reported_crowd_level: report.reported_crowd_level,
        }
    }
}

/// Validated reports indexed by location
#[derive(Debug, Clone, Default)]
pub struct ReportFeed {
    by_location: HashMap<String, Vec<LiveReport>>,
}

impl ReportFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only validated reports
    pub fn from_reports(reports: impl IntoIterator<Item = UserReport>) -> Self {
        let mut feed = Self::new();
        let mut skipped = 0usize;
        for report in reports {
            if report.validated {
                feed.push(report.into());
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!("Ignored {} unvalidated reports", skipped);
        }
        feed
    }

    /// Load a JSON array of user reports
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            ForecastError::configuration(format!(
                "Failed to read report feed {}: {}",
                path.display(),
                e
            ))
        })?;
        let reports: Vec<UserReport> = serde_json::from_str(&text)?;
        let feed = Self::from_reports(reports);
        info!(
            "Loaded {} validated reports for {} queues from {}",
            feed.len(),
            feed.by_location.len(),
            path.display()
        );
        Ok(feed)
    }

    pub fn push(&mut self, report: LiveReport) {
        self.by_location
            .entry(report.location.clone())
            .or_default()
            .push(report);
    }

    pub fn reports_for(&self, location: &str) -> &[LiveReport] {
        self.by_location
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_location.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}

/// Live reports from a feed combined with another provider's signals
#[derive(Debug, Clone)]
pub struct WithReports<P> {
    feed: ReportFeed,
    inner: P,
}

impl<P: SignalProvider> WithReports<P> {
    pub fn new(feed: ReportFeed, inner: P) -> Self {
        Self { feed, inner }
    }

    pub fn feed(&self) -> &ReportFeed {
        &self.feed
    }
}

impl<P: SignalProvider> SignalProvider for WithReports<P> {
    async fn live_reports(
        &self,
        location: &str,
    ) -> std::result::Result<Vec<LiveReport>, SignalError> {
        let mut reports = self.inner.live_reports(location).await?;
        reports.extend_from_slice(self.feed.reports_for(location));
        Ok(reports)
    }

    async fn baseline(&self, location: &str) -> std::result::Result<Option<Baseline>, SignalError> {
        self.inner.baseline(location).await
    }
}
