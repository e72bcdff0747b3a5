//! Integrity command implementation
//!
//! Runs the presence and sign checks over a flat collection, or the orphan
//! checks over the normalized schema. Exits with 1 when any check warns.

use super::common::{open_runner, report_error, resolve_collection, CollectionArgs};
use clap::Args;

/// Arguments for the integrity command
#[derive(Args, Debug)]
pub struct IntegrityArgs {
    #[command(flatten)]
    pub target: CollectionArgs,

    /// Check the normalized items/categories/inventory collections
    #[arg(long, conflicts_with_all = ["collection", "index"])]
    pub normalized: bool,
}

impl IntegrityArgs {
    /// Execute the integrity command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(normalized = self.normalized, "Starting integrity scan");

        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let (summary, warnings) = if self.normalized {
            match runner.run_normalized_integrity_scan().await {
                Ok(report) => (report.format_summary(), report.has_warnings()),
                Err(e) => return Ok(report_error("Integrity scan failed", &e)),
            }
        } else {
            let collection = match resolve_collection(&runner, &self.target).await {
                Ok(c) => c,
                Err(code) => return Ok(code),
            };
            match runner.run_integrity_scan(&collection).await {
                Ok(report) => (report.format_summary(), report.has_warnings()),
                Err(e) => return Ok(report_error("Integrity scan failed", &e)),
            }
        };

        println!("{summary}");
        Ok(if warnings { 1 } else { 0 })
    }
}
