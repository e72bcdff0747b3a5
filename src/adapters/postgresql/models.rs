//! PostgreSQL row models
//!
//! Documents are stored one per row in the `documents` table.

use crate::domain::{Document, StoreError};
use serde_json::Value;
use tokio_postgres::Row;

/// Row of the `documents` table as written by the store
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    /// Document `_id`, also kept inside `body`
    pub id: String,

    /// Full document
    pub body: Value,
}

impl DocumentRow {
    /// Builds a row from a document that already carries an `_id`
    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        let id = doc
            .id()
            .ok_or_else(|| StoreError::InvalidDocument("document has no _id".to_string()))?;
        Ok(Self {
            id,
            body: doc.into_value(),
        })
    }

    /// Splits rows into the parallel arrays bound to `unnest`
    pub fn into_columns(rows: Vec<Self>) -> (Vec<String>, Vec<Value>) {
        rows.into_iter().map(|r| (r.id, r.body)).unzip()
    }
}

/// Reads the `body` column (the first column) of a result row
pub fn document_from_row(row: &Row) -> Result<Document, StoreError> {
    let body: Value = row
        .try_get(0)
        .map_err(|e| StoreError::QueryFailed(format!("Failed to read document body: {e}")))?;
    Document::from_value(body)
}
