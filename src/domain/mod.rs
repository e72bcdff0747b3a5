//! Domain models and types for Stockaudit.
//!
//! This module contains the core domain types: schema-less store documents,
//! normalized inventory records, the normalized schema entities, identifiers
//! and the error hierarchy.
//!
//! # Overview
//!
//! - **Documents** ([`Document`]) with dotted-path field-or-default accessors
//! - **Records** ([`InventoryRecord`]) normalized once at the store boundary
//! - **Normalized schema** ([`Item`], [`Category`], [`InventoryFact`], [`JoinedRow`])
//! - **Identifiers** ([`CollectionName`], [`RunId`])
//! - **Errors** ([`AuditError`], [`StoreError`]) and the [`Result`] alias
//!
//! # Normalization
//!
//! ```rust
//! use stockaudit::domain::{Document, InventoryRecord, RecordField};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = Document::from_value(json!({"itemId": "CPU-1", "quantity": 4}))?;
//! let record = InventoryRecord::from_document(&doc);
//!
//! assert_eq!(record.unit_price, 0.0);
//! assert!(record.is_missing(RecordField::UnitPrice));
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;
pub mod schema;

// Re-export commonly used types for convenience
pub use document::{Document, ID_FIELD, NOT_AVAILABLE};
pub use errors::{AuditError, StoreError};
pub use ids::{CollectionName, RunId};
pub use record::{fields, InventoryRecord, RecordField};
pub use result::Result;
pub use schema::{Category, CategoryKey, InventoryFact, Item, JoinedRow};
