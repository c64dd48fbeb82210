use clap::Parser;
use queue_forecast::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result,
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow::anyhow!("Interrupted by user"))
            }
        }
    });

    match result {
        Ok(outcome) if outcome.succeeded => process::exit(0),
        // The action's error body has already been printed
        Ok(_) => process::exit(2),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Queue Forecast - per-queue wait forecasts");
    println!("=========================================");
    println!();
    println!("Blends validated user reports with historical baselines into a wait");
    println!("estimate, entry probability, and confidence interval for each queue.");
    println!();
    println!("USAGE:");
    println!("    queue-forecast <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    run       Compute and store a forecast for a queue");
    println!("    get       Show the stored forecast for a queue");
    println!("    clean     Delete forecasts older than the retention window");
    println!("    call      Invoke an action by path with a raw JSON body");
    println!("    config    Print the effective configuration");
    println!();
    println!("EXAMPLES:");
    println!("    queue-forecast run --queue loc:cafe --reports reports.json");
    println!("    queue-forecast get --queue loc:cafe --output-format json");
    println!("    queue-forecast call /Prediction/getForecast '{{\"queueID\": \"loc:cafe\"}}'");
    println!("    queue-forecast clean");
    println!();
    println!("For detailed help on any command, use:");
    println!("    queue-forecast <COMMAND> --help");
}
