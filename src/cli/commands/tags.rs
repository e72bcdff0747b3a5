//! Tags command implementation
//!
//! Reports gaps and duplicates in a collection's integer tag sequence, or
//! with `--sample` draws tag numbers for a test count.

use super::common::{open_runner, report_error, resolve_collection, CollectionArgs};
use clap::Args;

/// Arguments for the tags command
#[derive(Args, Debug)]
pub struct TagsArgs {
    #[command(flatten)]
    pub target: CollectionArgs,

    /// Tag field (defaults to normalized.tag_field)
    #[arg(long)]
    pub field: Option<String>,

    /// Draw this many tag numbers instead of scanning the sequence
    #[arg(long)]
    pub sample: Option<i64>,

    /// Seed for a reproducible tag sample (defaults to audit.seed)
    #[arg(long, requires = "sample")]
    pub seed: Option<u64>,
}

impl TagsArgs {
    /// Execute the tags command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let collection = match resolve_collection(&runner, &self.target).await {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if let Some(size) = self.sample {
            let seed = self.seed.or(runner.config().audit.seed);
            return match runner
                .sample_tags(&collection, self.field.as_deref(), size, seed)
                .await
            {
                Ok(sample) => {
                    println!("{}", sample.format_summary());
                    Ok(0)
                }
                Err(e) => Ok(report_error("Tag sampling failed", &e)),
            };
        }

        match runner.scan_tags(&collection, self.field.as_deref()).await {
            Ok(report) => {
                println!("{}", report.format_summary());
                Ok(if report.has_warnings() { 1 } else { 0 })
            }
            Err(e) => Ok(report_error("Tag scan failed", &e)),
        }
    }
}
