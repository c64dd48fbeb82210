//! Tests for the estimation module

pub mod blend_tests;

use crate::models::{Baseline, CrowdLevel, LiveReport};

pub fn wait_report(location: &str, minutes: f64) -> LiveReport {
    LiveReport {
        location: location.to_string(),
        reported_wait_minutes: Some(minutes),
        reported_crowd_level: None,
    }
}

pub fn crowd_report(location: &str, level: CrowdLevel) -> LiveReport {
    LiveReport {
        location: location.to_string(),
        reported_wait_minutes: None,
        reported_crowd_level: Some(level),
    }
}

pub fn baseline(mean: f64, spread: f64) -> Baseline {
    Baseline {
        mean_wait_minutes: mean,
        spread_minutes: spread,
    }
}
