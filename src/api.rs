//! JSON contract of the prediction actions.
//!
//! Each action takes a typed request and answers with either its success
//! body or `{ "error": "<message>" }`. Failures never surface any other way,
//! so callers check for the `error` field rather than a status code.
//!
//! | Action | Request | Success |
//! |---|---|---|
//! | `/Prediction/runPrediction` | `{ queueID, modelID }` | `{ queueID, estWaitTime, entryProbability, confidenceInterval }` |
//! | `/Prediction/getForecast` | `{ queueID }` | the above plus `lastRun` |
//! | `/Prediction/cleanOldReports` | `{}` | `{}` |

use crate::clock::Clock;
use crate::error::ForecastError;
use crate::estimation::Estimator;
use crate::models::Forecast;
use crate::service::ForecastService;
use crate::store::ForecastStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPredictionRequest {
    #[serde(rename = "queueID")]
    pub queue_id: String,
    #[serde(rename = "modelID")]
    pub model_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetForecastRequest {
    #[serde(rename = "queueID")]
    pub queue_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanOldReportsRequest {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    #[serde(rename = "queueID")]
    pub queue_id: String,
    pub est_wait_time: f64,
    pub entry_probability: f64,
    /// `[low, high]` in minutes
    pub confidence_interval: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    #[serde(rename = "queueID")]
    pub queue_id: String,
    pub est_wait_time: f64,
    pub entry_probability: f64,
    pub confidence_interval: [f64; 2],
    pub last_run: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanOldReportsResponse {}

/// Success body or `{ error }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Error { error: String },
    Ok(T),
}

impl<T> ApiResponse<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, ApiResponse::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ApiResponse::Error { error } => Some(error),
            ApiResponse::Ok(_) => None,
        }
    }
}

impl<T> From<crate::error::Result<T>> for ApiResponse<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(body) => ApiResponse::Ok(body),
            Err(e) => {
                if !e.is_expected() {
                    warn!("Prediction action failed: {}", e);
                }
                ApiResponse::Error {
                    error: e.to_string(),
                }
            }
        }
    }
}

impl From<&Forecast> for PredictionResponse {
    fn from(forecast: &Forecast) -> Self {
        let interval = forecast.estimate.confidence_interval;
        Self {
            queue_id: forecast.location.clone(),
            est_wait_time: forecast.estimate.estimated_wait_minutes,
            entry_probability: forecast.estimate.entry_probability,
            confidence_interval: [interval.low, interval.high],
        }
    }
}

impl From<&Forecast> for ForecastResponse {
    fn from(forecast: &Forecast) -> Self {
        let interval = forecast.estimate.confidence_interval;
        Self {
            queue_id: forecast.location.clone(),
            est_wait_time: forecast.estimate.estimated_wait_minutes,
            entry_probability: forecast.estimate.entry_probability,
            confidence_interval: [interval.low, interval.high],
            last_run: forecast.computed_at,
        }
    }
}

pub async fn run_prediction<E, S, C>(
    service: &ForecastService<E, S, C>,
    request: RunPredictionRequest,
) -> ApiResponse<PredictionResponse>
where
    E: Estimator,
    S: ForecastStore,
    C: Clock,
{
    service
        .compute(&request.queue_id, &request.model_id)
        .await
        .map(|forecast| PredictionResponse::from(&forecast))
        .into()
}

pub async fn get_forecast<E, S, C>(
    service: &ForecastService<E, S, C>,
    request: GetForecastRequest,
) -> ApiResponse<ForecastResponse>
where
    E: Estimator,
    S: ForecastStore,
    C: Clock,
{
    service
        .retrieve(&request.queue_id)
        .await
        .map(|forecast| ForecastResponse::from(&forecast))
        .into()
}

pub async fn clean_old_reports<E, S, C>(
    service: &ForecastService<E, S, C>,
    _request: CleanOldReportsRequest,
) -> ApiResponse<CleanOldReportsResponse>
where
    E: Estimator,
    S: ForecastStore,
    C: Clock,
{
    service
        .sweep()
        .await
        .map(|_| CleanOldReportsResponse {})
        .into()
}

/// The prediction actions addressable by path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RunPrediction,
    GetForecast,
    CleanOldReports,
}

impl Action {
    pub fn path(self) -> &'static str {
        match self {
            Action::RunPrediction => "/Prediction/runPrediction",
            Action::GetForecast => "/Prediction/getForecast",
            Action::CleanOldReports => "/Prediction/cleanOldReports",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Action {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('/');
        let action = trimmed.strip_prefix("Prediction/").unwrap_or(trimmed);
        match action {
            "runPrediction" => Ok(Action::RunPrediction),
            "getForecast" => Ok(Action::GetForecast),
            "cleanOldReports" => Ok(Action::CleanOldReports),
            _ => Err(ForecastError::configuration(format!(
                "Unknown prediction action '{}'",
                s
            ))),
        }
    }
}

/// Run an action against a raw JSON body and return the raw JSON answer
pub async fn dispatch<E, S, C>(
    service: &ForecastService<E, S, C>,
    action: Action,
    body: Value,
) -> Value
where
    E: Estimator,
    S: ForecastStore,
    C: Clock,
{
    debug!("Dispatching {} with body {}", action, body);

    let answer = match action {
        Action::RunPrediction => match serde_json::from_value(body) {
            Ok(request) => serde_json::to_value(run_prediction(service, request).await),
            Err(e) => return malformed(e),
        },
        Action::GetForecast => match serde_json::from_value(body) {
            Ok(request) => serde_json::to_value(get_forecast(service, request).await),
            Err(e) => return malformed(e),
        },
        Action::CleanOldReports => {
            let request = serde_json::from_value(body).unwrap_or_default();
            serde_json::to_value(clean_old_reports(service, request).await)
        }
    };

    answer.unwrap_or_else(|e| error_body(format!("Failed to encode response: {}", e)))
}

fn malformed(e: serde_json::Error) -> Value {
    error_body(format!("Malformed request body: {}", e))
}

fn error_body(message: String) -> Value {
    serde_json::json!({ "error": message })
}
