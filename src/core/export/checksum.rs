//! Checksums for exported audit evidence
//!
//! Every written file can carry a `<file>.sha256` sidecar in the
//! `sha256sum` format, so the evidence can be re-verified later with
//! standard tools.

use crate::domain::{AuditError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Calculate SHA-256 checksum of raw bytes
///
/// # Returns
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
///
/// # Examples
///
/// ```
/// use stockaudit::core::export::checksum::calculate_checksum_bytes;
///
/// let checksum = calculate_checksum_bytes(b"Item ID,Description\n");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Path of the sidecar for `path`
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

/// Writes `<path>.sha256` holding `checksum  <file name>`
pub async fn write_sidecar(path: &Path, checksum: &str) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AuditError::Export(format!("not a file path: {}", path.display())))?;
    let sidecar = sidecar_path(path);
    tokio::fs::write(&sidecar, format!("{checksum}  {file_name}\n")).await?;
    Ok(sidecar)
}

/// Recomputes the checksum of `path` and compares it with its sidecar
///
/// # Returns
///
/// `true` if the file matches the recorded checksum.
pub async fn verify_sidecar(path: &Path) -> Result<bool> {
    let recorded = tokio::fs::read_to_string(sidecar_path(path)).await?;
    let expected = recorded
        .split_whitespace()
        .next()
        .ok_or_else(|| AuditError::Validation(format!("empty checksum file for {}", path.display())))?;
    let data = tokio::fs::read(path).await?;
    Ok(calculate_checksum_bytes(&data) == expected)
}
