//! Cleanup command implementation
//!
//! Removes the derived `extendedValue` field from every record of a
//! collection.

use super::common::{confirm, open_runner, report_error, resolve_collection, CollectionArgs};
use clap::Args;

/// Arguments for the cleanup command
#[derive(Args, Debug)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub target: CollectionArgs,

    /// Report what would be removed without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl CleanupArgs {
    /// Execute the cleanup command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let collection = match resolve_collection(&runner, &self.target).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let dry_run = self.dry_run || runner.config().application.dry_run;

        if !self.yes && !dry_run {
            let prompt = format!("Remove extendedValue from every record of '{collection}'?");
            if !confirm(&prompt)? {
                println!("Cleanup cancelled.");
                return Ok(0);
            }
        }

        match runner.cleanup(&collection, dry_run).await {
            Ok(removed) => {
                if dry_run {
                    println!("🔍 DRY RUN - cleanup of '{collection}' skipped");
                } else {
                    println!("🧹 Removed extendedValue from {removed} record(s) in '{collection}'");
                }
                Ok(0)
            }
            Err(e) => Ok(report_error("Cleanup failed", &e)),
        }
    }
}
