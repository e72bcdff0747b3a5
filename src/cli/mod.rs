//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Stockaudit using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Stockaudit - inventory audit sampling and reporting
#[derive(Parser, Debug)]
#[command(name = "stockaudit")]
#[command(version, about, long_about = None)]
#[command(author = "Stockaudit Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "stockaudit.toml", env = "STOCKAUDIT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STOCKAUDIT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List collections with their selection indices
    Collections(commands::collections::CollectionsArgs),

    /// Show a collection's document count and first records
    Preview(commands::preview::PreviewArgs),

    /// Load a CSV file into a collection
    ImportCsv(commands::import_csv::ImportCsvArgs),

    /// Value, filter and sample a collection
    Audit(commands::audit::AuditArgs),

    /// Run data integrity checks
    Integrity(commands::integrity::IntegrityArgs),

    /// Find gaps and duplicates in a tag sequence, or sample tag numbers
    Tags(commands::tags::TagsArgs),

    /// Remove derived extendedValue fields
    Cleanup(commands::cleanup::CleanupArgs),

    /// Build the normalized items/categories/inventory collections
    Normalize(commands::normalize::NormalizeArgs),

    /// Write collections as JSON files
    Dump(commands::dump::DumpArgs),

    /// Supplementary inventory analyses
    Analyze(commands::analyze::AnalyzeArgs),

    /// Verify an exported file against its checksum
    Verify(commands::verify::VerifyArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Execute the command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        match self {
            Commands::Collections(args) => args.execute(config_path).await,
            Commands::Preview(args) => args.execute(config_path).await,
            Commands::ImportCsv(args) => args.execute(config_path).await,
            Commands::Audit(args) => args.execute(config_path).await,
            Commands::Integrity(args) => args.execute(config_path).await,
            Commands::Tags(args) => args.execute(config_path).await,
            Commands::Cleanup(args) => args.execute(config_path).await,
            Commands::Normalize(args) => args.execute(config_path).await,
            Commands::Dump(args) => args.execute(config_path).await,
            Commands::Analyze(args) => args.execute(config_path).await,
            Commands::Verify(args) => args.execute().await,
            Commands::ValidateConfig(args) => args.execute(config_path).await,
            Commands::Init(args) => args.execute().await,
        }
    }
}
