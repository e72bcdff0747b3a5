//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Stockaudit configuration file.

use crate::config::load_config;
use crate::config::schema::StoreBackend;
use crate::domain::AuditError;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config parses, applies overrides and validates in one step
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(AuditError::Configuration(msg)) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {msg}");
                println!();
                return Ok(2);
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);

        match config.store_backend {
            StoreBackend::Memory => {
                println!("  Store Backend: memory");
                println!(
                    "  Snapshot Directory: {}",
                    config.memory.data_dir.as_deref().unwrap_or("(none)")
                );
                println!("  Persist Snapshots: {}", config.memory.persist);
            }
            StoreBackend::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    println!("  Store Backend: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        pg_config.connection_string.expose_secret().redacted_url()
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                    println!(
                        "  Connection Timeout: {}s",
                        pg_config.connection_timeout_seconds
                    );
                }
            }
        }

        println!(
            "  Default Collection: {}",
            config.audit.collection.as_deref().unwrap_or("(none)")
        );
        println!("  Sample Size: {}", config.audit.sample_size);
        println!(
            "  Criterion: {} (threshold {})",
            config.audit.criterion, config.audit.threshold
        );
        println!("  Sampling: {:?}", config.audit.sampling);
        println!(
            "  Normalized: {} / {} / {}",
            config.normalized.items_collection,
            config.normalized.categories_collection,
            config.normalized.inventory_collection
        );
        println!("  Export Directory: {}", config.export.output_dir);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_good_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[audit]\nsample_size = 5").unwrap();
        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_validate_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[audit]\nsample_size = 0").unwrap();
        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
