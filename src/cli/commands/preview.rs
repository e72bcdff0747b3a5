//! Preview command implementation
//!
//! Prints a collection's document count and its first records.

use super::common::{open_runner, report_error, resolve_collection, CollectionArgs};
use crate::core::audit::DEFAULT_PREVIEW_LIMIT;
use clap::Args;

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub target: CollectionArgs,

    /// Number of records to show
    #[arg(short = 'n', long, default_value_t = DEFAULT_PREVIEW_LIMIT)]
    pub limit: usize,
}

impl PreviewArgs {
    /// Execute the preview command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let collection = match resolve_collection(&runner, &self.target).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        match runner.preview(&collection, self.limit).await {
            Ok(preview) => {
                print!("{}", preview.format_summary());
                Ok(0)
            }
            Err(e) => Ok(report_error("Preview failed", &e)),
        }
    }
}
