//! Verify command implementation
//!
//! Checks an exported file against its `.sha256` sidecar.

use crate::core::export::checksum::verify_sidecar;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Exported file to verify
    pub file: PathBuf,
}

impl VerifyArgs {
    /// Execute the verify command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file.display(), "Verifying export checksum");

        match verify_sidecar(&self.file).await {
            Ok(true) => {
                println!("✅ Checksum matches: {}", self.file.display());
                Ok(0)
            }
            Ok(false) => {
                println!("⚠️  Checksum MISMATCH: {}", self.file.display());
                Ok(1)
            }
            Err(e) => {
                println!("❌ Failed to verify {}", self.file.display());
                println!("   Error: {e}");
                Ok(e.exit_code())
            }
        }
    }
}
