//! CSV ingestion into a collection
//!
//! The header row names the fields. Each cell is typed on its own: integers
//! and finite decimals become JSON numbers, `true`/`false` become booleans,
//! everything else stays text. Empty cells are left out of the document so
//! they read as absent downstream. Numeric-looking cells with a leading zero
//! (`"0042"`) stay text so identifiers keep their padding.

use crate::adapters::store::RecordStore;
use crate::domain::{AuditError, CollectionName, Document, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of a CSV import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvImportSummary {
    pub collection: String,
    pub columns: Vec<String>,

    /// Data rows read, blank lines excluded
    pub rows: usize,

    /// Documents written; zero in a dry run
    pub inserted: u64,

    pub dry_run: bool,
    pub duration_ms: u64,
}

impl CsvImportSummary {
    /// Format the summary as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = format!("📥 CSV Import: {}\n", self.collection);
        summary.push_str(&format!("  Columns: {}\n", self.columns.join(", ")));
        summary.push_str(&format!("  Rows read: {}\n", self.rows));
        if self.dry_run {
            summary.push_str("  DRY RUN: nothing written\n");
        } else {
            summary.push_str(&format!("  Documents inserted: {}\n", self.inserted));
        }
        summary
    }
}

/// Types a single cell; `None` for an empty one
pub fn infer_value(raw: &str) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    if has_padding_zero(raw) {
        return Some(Value::String(raw.to_string()));
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Some(Value::Number(n));
    }
    match raw {
        "true" | "TRUE" | "True" => Some(Value::Bool(true)),
        "false" | "FALSE" | "False" => Some(Value::Bool(false)),
        _ => Some(Value::String(raw.to_string())),
    }
}

fn has_padding_zero(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let mut chars = digits.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('0'), Some(c)) if c.is_ascii_digit()
    )
}

fn headers(record: &StringRecord) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(record.len());
    for (i, name) in record.iter().enumerate() {
        if name.is_empty() {
            return Err(AuditError::InvalidInput(format!(
                "CSV header column {} is empty",
                i + 1
            )));
        }
        if !seen.insert(name) {
            return Err(AuditError::InvalidInput(format!(
                "CSV header repeats column '{name}'"
            )));
        }
        columns.push(name.to_string());
    }
    if columns.is_empty() {
        return Err(AuditError::EmptyInput("CSV input has no header row".to_string()));
    }
    Ok(columns)
}

/// Parses delimited text into documents, one per data row
///
/// # Errors
///
/// Returns [`AuditError::InvalidInput`] for an empty or repeated header,
/// a row with more cells than the header, or malformed CSV, naming the line.
pub fn parse_csv(bytes: &[u8], delimiter: u8) -> Result<(Vec<String>, Vec<Document>)> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let columns = headers(
        reader
            .headers()
            .map_err(|e| AuditError::InvalidInput(format!("CSV header: {e}")))?,
    )?;

    let mut documents = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record =
            result.map_err(|e| AuditError::InvalidInput(format!("CSV line {line}: {e}")))?;
        if record.len() > columns.len() {
            return Err(AuditError::InvalidInput(format!(
                "CSV line {line} has {} cells, header has {}",
                record.len(),
                columns.len()
            )));
        }
        if record.iter().all(str::is_empty) {
            continue;
        }

        let mut doc = Document::new();
        for (column, cell) in columns.iter().zip(record.iter()) {
            if let Some(value) = infer_value(cell) {
                doc.set(column.clone(), value);
            }
        }
        documents.push(doc);
    }
    Ok((columns, documents))
}

/// Loads CSV files into collections
pub struct CsvImporter {
    store: Arc<dyn RecordStore>,
    delimiter: u8,
}

impl CsvImporter {
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidInput`] when `delimiter` is not a single
    /// byte.
    pub fn new(store: Arc<dyn RecordStore>, delimiter: char) -> Result<Self> {
        let delimiter = u8::try_from(delimiter).map_err(|_| {
            AuditError::InvalidInput(format!(
                "delimiter {delimiter:?} is not a single-byte character"
            ))
        })?;
        Ok(Self { store, delimiter })
    }

    /// Reads `path` and inserts every data row into `collection` as one batch
    ///
    /// Existing documents are kept. A dry run parses and counts only.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::EmptyInput`] when the file has a header but no
    /// data rows, [`AuditError::Io`] when it cannot be read, and the parse
    /// errors of [`parse_csv`].
    pub async fn import(
        &self,
        path: &Path,
        collection: &CollectionName,
        dry_run: bool,
    ) -> Result<CsvImportSummary> {
        let start = Instant::now();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AuditError::Io(format!("{}: {e}", path.display())))?;
        let (columns, documents) = parse_csv(&bytes, self.delimiter)?;
        if documents.is_empty() {
            return Err(AuditError::EmptyInput(format!(
                "{} has no data rows",
                path.display()
            )));
        }

        let rows = documents.len();
        let inserted = if dry_run {
            tracing::info!(collection = %collection, rows, "DRY RUN: CSV rows not inserted");
            0
        } else {
            self.store.insert_many(collection, documents).await?
        };

        let summary = CsvImportSummary {
            collection: collection.to_string(),
            columns,
            rows,
            inserted,
            dry_run,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        tracing::info!(
            collection = %collection,
            path = %path.display(),
            rows,
            inserted,
            duration_ms = summary.duration_ms,
            "CSV import completed"
        );
        Ok(summary)
    }
}
