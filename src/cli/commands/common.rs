//! Helpers shared by the store-backed commands

use crate::adapters::store::connect;
use crate::config::{load_config, StockauditConfig};
use crate::core::audit::{AuditRunner, CollectionSelector};
use crate::domain::{AuditError, CollectionName};
use clap::Args;
use std::io::{self, Write};

/// Collection chosen by name or by 1-based index from `stockaudit collections`
#[derive(Args, Debug, Clone, Default)]
pub struct CollectionArgs {
    /// Collection name
    #[arg(long, conflicts_with = "index")]
    pub collection: Option<String>,

    /// 1-based collection index as listed by `collections`
    #[arg(long)]
    pub index: Option<usize>,
}

impl CollectionArgs {
    /// Selector from the flags, falling back to the configured collection
    pub fn selector(&self, default: Option<&str>) -> Option<CollectionSelector> {
        if let Some(i) = self.index {
            return Some(CollectionSelector::Index(i));
        }
        self.collection
            .as_deref()
            .or(default)
            .map(|name| CollectionSelector::Name(name.to_string()))
    }
}

/// Prints an error and returns its exit code
pub fn report_error(context: &str, error: &AuditError) -> i32 {
    crate::log_error_with_context!(error, context);
    println!("❌ {context}");
    println!("   Error: {error}");
    error.exit_code()
}

/// Loads and validates configuration
pub fn load(config_path: &str) -> Result<StockauditConfig, i32> {
    load_config(config_path).map_err(|e| report_error("Failed to load configuration file", &e))
}

/// Loads configuration and connects to the configured store
pub async fn open_runner(config_path: &str) -> Result<AuditRunner, i32> {
    let config = load(config_path)?;
    let store = connect(&config)
        .await
        .map_err(|e| report_error("Failed to connect to record store", &e))?;
    Ok(AuditRunner::new(store, config))
}

/// Resolves the collection flags, or exit code 2 when none is given
pub async fn resolve_collection(
    runner: &AuditRunner,
    args: &CollectionArgs,
) -> Result<CollectionName, i32> {
    let default = runner.config().audit.collection.clone();
    let Some(selector) = args.selector(default.as_deref()) else {
        println!("❌ No collection given");
        println!("   Use --collection <NAME> or --index <N> (see `stockaudit collections`)");
        return Err(2);
    };
    runner
        .select_collection(&selector)
        .await
        .map_err(|e| report_error("Failed to select collection", &e))
}

/// Asks `prompt [y/N]` on stdout
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
