//! Command-line argument definitions for the queue forecaster
//!
//! Defines the CLI interface using the clap derive API. Each prediction
//! action has its own subcommand; `call` accepts a raw action path and JSON
//! body for scripting.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Queue wait forecasts from live reports and historical baselines
#[derive(Debug, Clone, Parser)]
#[command(
    name = "queue-forecast",
    version,
    about = "Compute, inspect, and expire per-queue wait forecasts",
    long_about = "Blends validated user reports with historical baselines into a per-queue \
                  forecast of wait time, entry probability, and a confidence interval. Forecasts \
                  are stored one per queue and expire after the retention window."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Compute and store a forecast for a queue (runPrediction)
    Run(RunArgs),
    /// Show the stored forecast for a queue (getForecast)
    Get(GetArgs),
    /// Delete forecasts older than the retention window (cleanOldReports)
    Clean,
    /// Invoke an action by path with a raw JSON body
    Call(CallArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct CommonArgs {
    /// Configuration file
    ///
    /// If not specified, looks for ~/.config/queue-forecast/config.toml
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Forecast store file (JSON)
    #[arg(long = "store", value_name = "FILE", global = true)]
    pub store_path: Option<PathBuf>,

    /// Validated user report feed (JSON array)
    #[arg(long = "reports", value_name = "FILE", global = true)]
    pub reports_path: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress logging except errors"
    )]
    pub quiet: bool,

    /// Output format for results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        global = true
    )]
    pub output_format: OutputFormat,
}

#[derive(Debug, Clone, Parser)]
pub struct RunArgs {
    /// Queue identifier
    #[arg(long = "queue", value_name = "ID")]
    pub queue_id: String,

    /// Model identifier the caller expects; defaults to the active model
    #[arg(long = "model", value_name = "ID")]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Parser)]
pub struct GetArgs {
    /// Queue identifier
    #[arg(long = "queue", value_name = "ID")]
    pub queue_id: String,
}

#[derive(Debug, Clone, Parser)]
pub struct CallArgs {
    /// Action path, e.g. /Prediction/getForecast
    #[arg(value_name = "ACTION")]
    pub action: String,

    /// JSON request body
    #[arg(value_name = "BODY", default_value = "{}")]
    pub body: String,
}

/// Output format for results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON bodies exactly as the actions return them
    Json,
}

impl CommonArgs {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}
