//! Audit command implementation
//!
//! Values, filters and samples a collection, or the normalized view, and
//! optionally exports the sample.

use super::common::{confirm, open_runner, report_error, resolve_collection, CollectionArgs};
use crate::config::SamplingStrategy;
use crate::core::audit::{AuditOutcome, AuditRequest, AuditRunner};
use crate::core::threshold::ThresholdCriterion;
use crate::domain::CollectionName;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the audit command
#[derive(Args, Debug)]
pub struct AuditArgs {
    #[command(flatten)]
    pub target: CollectionArgs,

    /// Number of records to sample
    #[arg(short = 'n', long)]
    pub sample_size: Option<i64>,

    /// Threshold bound for the criterion
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Criterion (high_value, high_price, low_stock)
    #[arg(long)]
    pub criterion: Option<ThresholdCriterion>,

    /// Audit the joined normalized view instead of a flat collection
    #[arg(long, conflicts_with_all = ["collection", "index"])]
    pub normalized: bool,

    /// Seed for a reproducible sample
    #[arg(long)]
    pub seed: Option<u64>,

    /// Push sampling down to the store when supported
    #[arg(long)]
    pub store_sampling: bool,

    /// Export the sample; without a path the default export path is used
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "")]
    pub export: Option<String>,

    /// Remove derived extendedValue fields after a successful export
    #[arg(long, requires = "export")]
    pub cleanup: bool,

    /// Compute values without writing to the store
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl AuditArgs {
    /// Execute the audit command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting audit command");

        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let config = runner.config().clone();
        let dry_run = self.dry_run || config.application.dry_run;

        let collection = if self.normalized {
            match CollectionName::new(config.normalized.items_collection.as_str()) {
                Ok(c) => c,
                Err(e) => {
                    println!("❌ Invalid items collection: {e}");
                    return Ok(2);
                }
            }
        } else {
            match resolve_collection(&runner, &self.target).await {
                Ok(c) => c,
                Err(code) => return Ok(code),
            }
        };

        let mut request = AuditRequest::from_config(collection, &config.audit, dry_run);
        if let Some(n) = self.sample_size {
            request.sample_size = n;
        }
        if let Some(t) = self.threshold {
            request.threshold = t;
        }
        if let Some(c) = self.criterion {
            request.criterion = c;
        }
        if self.seed.is_some() {
            request.seed = self.seed;
        }
        if self.store_sampling {
            request.sampling = SamplingStrategy::Store;
        }

        if dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("🔍 DRY RUN MODE - No data will be written to the store");
            println!();
        }

        let writes = !dry_run && !self.normalized && request.criterion.needs_valuation();
        if writes && !self.yes {
            println!("Audit Configuration:");
            println!("  Collection: {}", request.collection);
            println!("  Criterion: {}", request.criterion);
            println!("  Threshold: {}", request.threshold);
            println!("  Sample size: {}", request.sample_size);
            println!();
            println!("extendedValue will be written to every record of the collection.");
            if !confirm("Proceed with audit?")? {
                println!("Audit cancelled.");
                return Ok(0);
            }
        }

        let outcome = if self.normalized {
            runner.run_normalized_audit(&request).await
        } else {
            runner.run_audit(&request).await
        };
        let outcome = match outcome {
            Ok(o) => o,
            Err(e) => return Ok(report_error("Audit failed", &e)),
        };

        println!("{}", outcome.format_summary());

        if let Some(ref path) = self.export {
            let code = self.export_sample(&runner, &outcome, path, dry_run).await;
            if code != 0 {
                return Ok(code);
            }
        }

        Ok(if outcome.has_warnings() { 1 } else { 0 })
    }

    async fn export_sample(
        &self,
        runner: &AuditRunner,
        outcome: &AuditOutcome,
        path: &str,
        dry_run: bool,
    ) -> i32 {
        let path = (!path.is_empty()).then(|| PathBuf::from(path));
        let receipt = match runner.export_results(outcome, path).await {
            Ok(r) => r,
            Err(e) => return report_error("Export failed", &e),
        };

        println!("📄 Exported {} row(s) to {}", receipt.rows, receipt.path.display());
        println!("   SHA-256: {}", receipt.sha256);
        if let Some(ref sidecar) = receipt.checksum_path {
            println!("   Checksum file: {}", sidecar.display());
        }

        let cleanup = self.cleanup || runner.config().audit.cleanup_after_export;
        if cleanup && !outcome.normalized {
            let collection = match CollectionName::new(outcome.collection.as_str()) {
                Ok(c) => c,
                Err(e) => {
                    println!("❌ Invalid collection: {e}");
                    return 2;
                }
            };
            match runner.cleanup(&collection, dry_run).await {
                Ok(removed) => println!("🧹 Removed extendedValue from {removed} record(s)"),
                Err(e) => return report_error("Cleanup failed", &e),
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> super::AuditArgs {
        let mut full = vec!["stockaudit", "audit"];
        full.extend_from_slice(args);
        match Cli::parse_from(full).command {
            Commands::Audit(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_export_without_path() {
        let args = parse(&["--collection", "Storage", "--export"]);
        assert_eq!(args.export.as_deref(), Some(""));
    }

    #[test]
    fn test_export_with_path_and_overrides() {
        let args = parse(&[
            "--index",
            "2",
            "-n",
            "10",
            "--threshold",
            "500",
            "--criterion",
            "low-stock",
            "--export",
            "out.csv",
            "--cleanup",
        ]);
        assert_eq!(args.target.index, Some(2));
        assert_eq!(args.sample_size, Some(10));
        assert_eq!(args.threshold, Some(500.0));
        assert_eq!(
            args.criterion,
            Some(crate::core::threshold::ThresholdCriterion::LowStock)
        );
        assert_eq!(args.export.as_deref(), Some("out.csv"));
        assert!(args.cleanup);
    }

    #[test]
    fn test_collection_and_index_conflict() {
        let result = Cli::try_parse_from([
            "stockaudit",
            "audit",
            "--collection",
            "CPU",
            "--index",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cleanup_requires_export() {
        let result = Cli::try_parse_from(["stockaudit", "audit", "--cleanup"]);
        assert!(result.is_err());
    }
}
