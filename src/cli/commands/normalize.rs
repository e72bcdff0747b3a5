//! Normalize command implementation
//!
//! Rebuilds the items, categories and inventory collections from the
//! configured flat source collections.

use super::common::{confirm, open_runner, report_error};
use chrono::Local;
use clap::Args;

/// Arguments for the normalize command
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl NormalizeArgs {
    /// Execute the normalize command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let normalized = runner.config().normalized.clone();

        if runner.config().application.dry_run {
            println!("🔍 DRY RUN MODE - normalize rewrites collections and is skipped");
            return Ok(0);
        }

        if !self.yes {
            println!("Normalized Schema:");
            println!("  Sources: {:?}", normalized.source_collections);
            println!(
                "  Targets: {}, {}, {}",
                normalized.items_collection,
                normalized.categories_collection,
                normalized.inventory_collection
            );
            println!();
            println!("The target collections will be dropped and rebuilt.");
            if !confirm("Proceed?")? {
                println!("Normalize cancelled.");
                return Ok(0);
            }
        }

        match runner.import_normalized(Local::now().date_naive()).await {
            Ok(summary) => {
                println!("{}", summary.format_summary());
                Ok(0)
            }
            Err(e) => Ok(report_error("Normalize failed", &e)),
        }
    }
}
