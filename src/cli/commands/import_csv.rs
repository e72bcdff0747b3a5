//! Import-csv command implementation
//!
//! Appends the rows of a CSV file to a collection, creating it if needed.

use super::common::{confirm, open_runner, report_error};
use crate::domain::CollectionName;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the import-csv command
#[derive(Args, Debug)]
pub struct ImportCsvArgs {
    /// CSV file with a header row
    pub file: PathBuf,

    /// Target collection; created when absent
    #[arg(long)]
    pub collection: String,

    /// Field delimiter (defaults to export.delimiter)
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Parse and count rows without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ImportCsvArgs {
    /// Execute the import-csv command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let collection = match CollectionName::new(self.collection.as_str()) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Invalid collection name: {e}");
                return Ok(2);
            }
        };
        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let dry_run = self.dry_run || runner.config().application.dry_run;

        if !self.yes && !dry_run {
            let prompt = format!(
                "Insert the rows of {} into '{collection}'?",
                self.file.display()
            );
            if !confirm(&prompt)? {
                println!("Import cancelled.");
                return Ok(0);
            }
        }

        match runner
            .import_csv(&self.file, &collection, self.delimiter, dry_run)
            .await
        {
            Ok(summary) => {
                print!("{}", summary.format_summary());
                Ok(0)
            }
            Err(e) => Ok(report_error("CSV import failed", &e)),
        }
    }
}
