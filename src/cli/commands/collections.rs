//! Collections command implementation
//!
//! Lists the store's collections with the 1-based indices accepted by
//! `--index`.

use super::common::{open_runner, report_error};
use crate::core::query::Filter;
use crate::domain::CollectionName;
use clap::Args;

/// Arguments for the collections command
#[derive(Args, Debug)]
pub struct CollectionsArgs {
    /// Also count the documents of each collection
    #[arg(long)]
    pub counts: bool,
}

impl CollectionsArgs {
    /// Execute the collections command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let collections = match runner.list_collections().await {
            Ok(c) => c,
            Err(e) => return Ok(report_error("Failed to list collections", &e)),
        };

        if collections.is_empty() {
            println!("No collections found.");
            return Ok(0);
        }

        println!("📚 {} collection(s):", collections.len());
        println!();
        for (i, name) in collections.iter().enumerate() {
            if self.counts {
                let collection = CollectionName::new(name.as_str()).map_err(anyhow::Error::msg)?;
                let n = runner.store().count(&collection, &Filter::All).await?;
                println!("  {:>3}. {:<40} {:>8}", i + 1, name, n);
            } else {
                println!("  {:>3}. {}", i + 1, name);
            }
        }
        println!();
        Ok(0)
    }
}
