//! Signal sources feeding the estimator.
//!
//! [`PatternSignalProvider`] is a deterministic stand-in for a historical
//! data service: ordered regex rules decide what each identifier yields, and
//! unmatched identifiers get a baseline derived from a stable hash.

use crate::constants::estimation::{
    FAILURE_PATTERN, FALLBACK_MAX_WAIT_MINUTES, FALLBACK_MIN_WAIT_MINUTES, FALLBACK_SPREAD_RATIO,
    NO_DATA_PATTERN,
};
use crate::error::{ForecastError, Result};
use crate::models::{Baseline, LiveReport};
use regex::Regex;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("signal source unavailable for '{location}': {reason}")]
    Unavailable { location: String, reason: String },
}

/// Source of live observations and historical expectations for a location
pub trait SignalProvider: Send + Sync {
    /// Live observations currently known for the location
    fn live_reports(
        &self,
        location: &str,
    ) -> impl Future<Output = std::result::Result<Vec<LiveReport>, SignalError>> + Send;

    /// Historical or model-based expectation, if any exists
    fn baseline(
        &self,
        location: &str,
    ) -> impl Future<Output = std::result::Result<Option<Baseline>, SignalError>> + Send;
}

/// What a matched identifier yields
#[derive(Debug, Clone, PartialEq)]
pub enum SignalBehavior {
    Baseline(Baseline),
    NoData,
    Fail(String),
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pattern: Regex,
    behavior: SignalBehavior,
}

impl PatternRule {
    pub fn new(pattern: &str, behavior: SignalBehavior) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            ForecastError::configuration(format!("Invalid signal pattern '{}': {}", pattern, e))
        })?;
        Ok(Self { pattern, behavior })
    }

    pub fn matches(&self, location: &str) -> bool {
        self.pattern.is_match(location)
    }
}

/// Deterministic baseline provider keyed by identifier patterns
#[derive(Debug, Clone)]
pub struct PatternSignalProvider {
    rules: Vec<PatternRule>,
    latency: Option<Duration>,
}

impl Default for PatternSignalProvider {
    fn default() -> Self {
        let rules = vec![
            PatternRule {
                pattern: Regex::new(&regex::escape(NO_DATA_PATTERN)).expect("static pattern"),
                behavior: SignalBehavior::NoData,
            },
            PatternRule {
                pattern: Regex::new(&regex::escape(FAILURE_PATTERN)).expect("static pattern"),
                behavior: SignalBehavior::Fail("simulated provider outage".to_string()),
            },
        ];
        Self {
            rules,
            latency: None,
        }
    }
}

impl PatternSignalProvider {
    /// Provider with the built-in `no-data` and `fail` rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with no rules; every identifier gets a hashed baseline
    pub fn without_rules() -> Self {
        Self {
            rules: Vec::new(),
            latency: None,
        }
    }

    /// Add a rule. Earlier rules take precedence.
    pub fn with_rule(mut self, pattern: &str, behavior: SignalBehavior) -> Result<Self> {
        self.rules.push(PatternRule::new(pattern, behavior)?);
        Ok(self)
    }

    /// Add a rule ahead of all existing ones
    pub fn with_priority_rule(mut self, pattern: &str, behavior: SignalBehavior) -> Result<Self> {
        self.rules.insert(0, PatternRule::new(pattern, behavior)?);
        Ok(self)
    }

    /// Delay every lookup, standing in for a networked source
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn behavior_for(&self, location: &str) -> SignalBehavior {
        self.rules
            .iter()
            .find(|rule| rule.matches(location))
            .map(|rule| rule.behavior.clone())
            .unwrap_or_else(|| SignalBehavior::Baseline(hashed_baseline(location)))
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl SignalProvider for PatternSignalProvider {
    async fn live_reports(
        &self,
        _location: &str,
    ) -> std::result::Result<Vec<LiveReport>, SignalError> {
        Ok(Vec::new())
    }

    async fn baseline(&self, location: &str) -> std::result::Result<Option<Baseline>, SignalError> {
        self.simulate_latency().await;

        match self.behavior_for(location) {
            SignalBehavior::Baseline(baseline) => {
                debug!(
                    "Baseline for {}: {:.1} min (spread {:.1})",
                    location, baseline.mean_wait_minutes, baseline.spread_minutes
                );
                Ok(Some(baseline))
            }
            SignalBehavior::NoData => Ok(None),
            SignalBehavior::Fail(reason) => Err(SignalError::Unavailable {
                location: location.to_string(),
                reason,
            }),
        }
    }
}

/// Stable baseline for an identifier, independent of process and platform
pub fn hashed_baseline(location: &str) -> Baseline {
    // FNV-1a
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in location.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }

    let fraction = (hash % 10_000) as f64 / 10_000.0;
    let mean = FALLBACK_MIN_WAIT_MINUTES
        + fraction * (FALLBACK_MAX_WAIT_MINUTES - FALLBACK_MIN_WAIT_MINUTES);

    Baseline {
        mean_wait_minutes: mean,
        spread_minutes: mean * FALLBACK_SPREAD_RATIO,
    }
}
