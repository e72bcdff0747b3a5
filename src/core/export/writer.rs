//! Delimited-text writer for audit samples

use super::checksum::{calculate_checksum_bytes, write_sidecar};
use super::row::{AuditRow, COLUMNS};
use crate::config::ExportConfig;
use crate::domain::{AuditError, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Written file plus its digest
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub rows: usize,

    /// Hex SHA-256 of the file contents
    pub sha256: String,

    pub checksum_path: Option<PathBuf>,
}

impl ExportReceipt {
    /// Log the receipt
    pub fn log_summary(&self) {
        tracing::info!(
            path = %self.path.display(),
            rows = self.rows,
            sha256 = %self.sha256,
            "Audit results exported"
        );
    }
}

/// Writes audit rows as delimited text
pub struct ResultExporter {
    config: ExportConfig,
}

impl ResultExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// `<output_dir>/<prefix>_<collection>_<YYYYmmdd_HHMMSS>.csv`
    pub fn default_path(&self, collection: &str, at: NaiveDateTime) -> PathBuf {
        Path::new(&self.config.output_dir).join(format!(
            "{}_{}_{}.csv",
            self.config.file_prefix,
            collection,
            at.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Renders rows, header first; the header is written even with no rows
    pub fn render(&self, rows: &[AuditRow]) -> Result<Vec<u8>> {
        let delimiter = u8::try_from(self.config.delimiter).map_err(|_| {
            AuditError::Export(format!(
                "delimiter {:?} is not a single-byte character",
                self.config.delimiter
            ))
        })?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(COLUMNS)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| AuditError::Export(format!("Failed to flush export buffer: {e}")))
    }

    /// Writes rows to `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or any file write fails.
    pub async fn export(&self, rows: &[AuditRow], path: &Path) -> Result<ExportReceipt> {
        let data = self.render(rows)?;
        let sha256 = calculate_checksum_bytes(&data);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &data).await?;

        let checksum_path = if self.config.write_checksum {
            Some(write_sidecar(path, &sha256).await?)
        } else {
            None
        };

        let receipt = ExportReceipt {
            path: path.to_path_buf(),
            rows: rows.len(),
            sha256,
            checksum_path,
        };
        receipt.log_summary();
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::checksum::verify_sidecar;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn row(id: &str, description: &str) -> AuditRow {
        AuditRow {
            item_id: id.to_string(),
            description: description.to_string(),
            unit_price: 12.5,
            quantity: 4,
            extended_value: 50.0,
            category: "Hard_Drive".to_string(),
            supplier: "Acme".to_string(),
            audit_date: "2025-01-31".to_string(),
        }
    }

    #[test]
    fn test_render_header_and_rows() {
        let exporter = ResultExporter::new(ExportConfig::default());
        let text = String::from_utf8(exporter.render(&[row("A1", "SSD, 1TB")]).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Item ID,Description,Unit Price,Quantity,Extended Value,Category,Supplier,Audit Date")
        );
        assert_eq!(
            lines.next(),
            Some("A1,\"SSD, 1TB\",12.5,4,50.0,Hard_Drive,Acme,2025-01-31")
        );
    }

    #[test]
    fn test_render_empty_is_header_only() {
        let exporter = ResultExporter::new(ExportConfig::default());
        let text = String::from_utf8(exporter.render(&[]).unwrap()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_custom_delimiter() {
        let exporter = ResultExporter::new(ExportConfig {
            delimiter: ';',
            ..Default::default()
        });
        let text = String::from_utf8(exporter.render(&[row("A1", "x")]).unwrap()).unwrap();
        assert!(text.starts_with("Item ID;Description;"));
    }

    #[test]
    fn test_default_path() {
        let exporter = ResultExporter::new(ExportConfig::default());
        let at = NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap();
        assert_eq!(
            exporter.default_path("Storage", at),
            Path::new("./audit-output").join("audit_sample_Storage_20250203_040506.csv")
        );
    }

    #[tokio::test]
    async fn test_export_writes_file_and_sidecar() {
        let dir = TempDir::new().unwrap();
        let exporter = ResultExporter::new(ExportConfig {
            output_dir: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        });
        let path = dir.path().join("nested").join("sample.csv");

        let receipt = exporter
            .export(&[row("A1", "x"), row("A2", "y")], &path)
            .await
            .unwrap();
        assert_eq!(receipt.rows, 2);
        assert_eq!(receipt.sha256.len(), 64);
        assert!(receipt.checksum_path.is_some());
        assert!(verify_sidecar(&path).await.unwrap());

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 8);
        let rows: Vec<AuditRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows[1], row("A2", "y"));
    }
}
