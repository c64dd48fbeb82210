//! Command implementations for the queue forecaster CLI
//!
//! Sets up logging, layers configuration (file, then CLI overrides), wires
//! the estimator and store into a `ForecastService`, and renders each
//! action's answer either as its JSON body or as a human-readable summary.

use crate::api::{self, Action, ApiResponse, ForecastResponse, PredictionResponse};
use crate::cli::args::{Args, CallArgs, CommonArgs, Commands, GetArgs, OutputFormat, RunArgs};
use crate::config::ForecasterConfig;
use crate::estimation::{BlendingEstimator, PatternSignalProvider, ReportFeed, WithReports};
use crate::service::ForecastService;
use crate::store::FileForecastStore;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use tracing::{debug, info};

/// Service as assembled by the CLI
pub type CliService =
    ForecastService<BlendingEstimator<WithReports<PatternSignalProvider>>, FileForecastStore>;

/// Whether the invoked action produced a success body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub succeeded: bool,
}

impl CommandOutcome {
    fn from_response<T>(response: &ApiResponse<T>) -> Self {
        Self {
            succeeded: !response.is_error(),
        }
    }
}

/// Main command runner
///
/// Dispatches to the handler for the selected subcommand:
/// - `run`: compute and store a forecast
/// - `get`: read the stored forecast
/// - `clean`: sweep expired forecasts
/// - `call`: raw action path + JSON body
/// - `config`: print the effective configuration
pub async fn run(args: Args) -> Result<CommandOutcome> {
    setup_logging(&args.common)?;

    let config = load_configuration(&args.common)?;
    debug!("Effective configuration: {:?}", config);

    let Some(command) = args.command else {
        return Ok(CommandOutcome { succeeded: true });
    };

    if let Commands::Config = command {
        print!("{}", config.to_toml_string()?);
        return Ok(CommandOutcome { succeeded: true });
    }

    let service = build_service(&config).await?;
    let format = args.common.output_format;

    match command {
        Commands::Run(run_args) => run_prediction(&service, run_args, format).await,
        Commands::Get(get_args) => get_forecast(&service, get_args, format).await,
        Commands::Clean => clean(&service, format).await,
        Commands::Call(call_args) => call(&service, call_args).await,
        Commands::Config => Ok(CommandOutcome { succeeded: true }),
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &CommonArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("queue_forecast={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using a layered approach (defaults -> file -> args)
pub fn load_configuration(args: &CommonArgs) -> Result<ForecasterConfig> {
    let config_file = match &args.config_file {
        Some(path) => Some(path.clone()),
        None => ForecasterConfig::default_config_path().filter(|path| path.exists()),
    };

    let mut config = match &config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            ForecasterConfig::load(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?
        }
        None => {
            info!("No config file found, using defaults");
            ForecasterConfig::default()
        }
    };

    if let Some(path) = &args.store_path {
        config = config.with_store_path(path.clone());
    }
    if let Some(path) = &args.reports_path {
        config = config.with_reports_path(path.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Wire the report feed, baseline provider, and file store together
pub async fn build_service(config: &ForecasterConfig) -> Result<CliService> {
    let feed = match &config.reports_path {
        Some(path) => ReportFeed::load(path)
            .await
            .with_context(|| format!("Failed to load reports from {}", path.display()))?,
        None => ReportFeed::new(),
    };

    let provider = WithReports::new(feed, PatternSignalProvider::new());
    let estimator = BlendingEstimator::new(provider, config.blend.clone());

    let store_path = config.resolved_store_path();
    debug!("Forecast store: {}", store_path.display());
    let store = FileForecastStore::new(store_path);

    Ok(ForecastService::new(estimator, store, config))
}

async fn run_prediction(
    service: &CliService,
    args: RunArgs,
    format: OutputFormat,
) -> Result<CommandOutcome> {
    let request = api::RunPredictionRequest {
        queue_id: args.queue_id,
        model_id: args
            .model_id
            .unwrap_or_else(|| service.model().model_id.clone()),
    };
    let response = api::run_prediction(service, request).await;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Human => print_prediction(&response),
    }
    Ok(CommandOutcome::from_response(&response))
}

async fn get_forecast(
    service: &CliService,
    args: GetArgs,
    format: OutputFormat,
) -> Result<CommandOutcome> {
    let request = api::GetForecastRequest {
        queue_id: args.queue_id,
    };
    let response = api::get_forecast(service, request).await;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Human => print_forecast(&response),
    }
    Ok(CommandOutcome::from_response(&response))
}

async fn clean(service: &CliService, format: OutputFormat) -> Result<CommandOutcome> {
    match format {
        OutputFormat::Json => {
            let response =
                api::clean_old_reports(service, api::CleanOldReportsRequest::default()).await;
            print_json(&response)?;
            Ok(CommandOutcome::from_response(&response))
        }
        OutputFormat::Human => match service.sweep().await {
            Ok(stats) => {
                println!(
                    "{} {} stale forecasts (computed before {})",
                    "Removed".bright_green(),
                    stats.removed.to_string().bright_white().bold(),
                    stats.cutoff.to_rfc3339()
                );
                Ok(CommandOutcome { succeeded: true })
            }
            Err(e) => {
                print_error(&e.to_string());
                Ok(CommandOutcome { succeeded: false })
            }
        },
    }
}

async fn call(service: &CliService, args: CallArgs) -> Result<CommandOutcome> {
    let action: Action = args.action.parse()?;
    let body: serde_json::Value =
        serde_json::from_str(&args.body).context("Request body is not valid JSON")?;

    let answer = api::dispatch(service, action, body).await;
    println!("{}", serde_json::to_string_pretty(&answer)?);

    Ok(CommandOutcome {
        succeeded: answer.get("error").is_none(),
    })
}

fn print_json<T: Serialize>(response: &ApiResponse<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

fn print_prediction(response: &ApiResponse<PredictionResponse>) {
    match response {
        ApiResponse::Ok(body) => {
            println!(
                "{} {}",
                "Forecast computed for".bright_green(),
                body.queue_id.bright_white().bold()
            );
            print_estimate(
                body.est_wait_time,
                body.entry_probability,
                body.confidence_interval,
            );
        }
        ApiResponse::Error { error } => print_error(error),
    }
}

fn print_forecast(response: &ApiResponse<ForecastResponse>) {
    match response {
        ApiResponse::Ok(body) => {
            println!(
                "{} {}",
                "Forecast for".bright_green(),
                body.queue_id.bright_white().bold()
            );
            print_estimate(
                body.est_wait_time,
                body.entry_probability,
                body.confidence_interval,
            );
            println!("  {} {}", "Last run:".bright_cyan(), body.last_run.to_rfc3339());
        }
        ApiResponse::Error { error } => print_error(error),
    }
}

fn print_estimate(wait: f64, probability: f64, interval: [f64; 2]) {
    println!("  {} {:.1} min", "Estimated wait:".bright_cyan(), wait);
    println!(
        "  {} {:.0}%",
        "Entry probability:".bright_cyan(),
        probability * 100.0
    );
    println!(
        "  {} {:.1} - {:.1} min",
        "Confidence interval:".bright_cyan(),
        interval[0],
        interval[1]
    );
}

fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".bright_red().bold(), message);
}
