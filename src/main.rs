// Stockaudit - Inventory audit sampling and reporting
// Copyright (c) 2025 Stockaudit Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use stockaudit::cli::{Cli, Commands};
use stockaudit::config::{load_config, LoggingConfig};
use stockaudit::logging::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging follows the configuration when it loads; commands report
    // configuration errors themselves
    let loaded = match cli.command {
        Commands::Init(_) | Commands::Verify(_) => None,
        _ => load_config(&cli.config).ok(),
    };
    let logging_config = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(LoggingConfig::default);
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Stockaudit - inventory audit sampling and reporting"
    );

    let exit_code = match cli.command.execute(&cli.config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // Flush buffered file logs before exiting
    drop(guard);
    process::exit(exit_code);
}
