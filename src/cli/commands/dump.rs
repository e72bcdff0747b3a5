//! Dump command implementation
//!
//! Writes collections to `<dir>/<prefix>_<collection>.json`.

use super::common::{open_runner, report_error};
use crate::core::export::{CollectionDumper, KeyPreset, KeySelection};
use crate::domain::CollectionName;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the dump command
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Collections to dump (all when omitted)
    pub collections: Vec<String>,

    /// Output directory (defaults to export.output_dir)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// File name prefix
    #[arg(long, default_value = "inventory")]
    pub prefix: String,

    /// Keep only a preset key set (core, meta)
    #[arg(long, conflicts_with = "keys")]
    pub preset: Option<KeyPreset>,

    /// Keep only these keys (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl DumpArgs {
    fn selection(&self) -> KeySelection {
        match self.preset {
            Some(preset) => KeySelection::preset(preset),
            None if !self.keys.is_empty() => KeySelection::Keys(self.keys.clone()),
            None => KeySelection::All,
        }
    }

    /// Execute the dump command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let runner = match open_runner(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };
        let export = runner.config().export.clone();

        let mut collections = Vec::with_capacity(self.collections.len());
        for name in &self.collections {
            match CollectionName::new(name.as_str()) {
                Ok(c) => collections.push(c),
                Err(e) => {
                    println!("❌ Invalid collection name: {e}");
                    return Ok(2);
                }
            }
        }

        let dir = self
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&export.output_dir));
        let dumper = CollectionDumper::new(
            runner.store().clone(),
            export.pretty_json && !self.compact,
            export.write_checksum,
        );

        match dumper
            .dump(&dir, &self.prefix, &collections, &self.selection())
            .await
        {
            Ok(files) => {
                println!("💾 Dumped {} collection(s) to {}", files.len(), dir.display());
                for file in &files {
                    println!(
                        "  {:<30} {:>8} document(s)  {}",
                        file.collection,
                        file.documents,
                        file.path.display()
                    );
                }
                Ok(0)
            }
            Err(e) => Ok(report_error("Dump failed", &e)),
        }
    }
}
