//! Flat inventory records
//!
//! [`InventoryRecord::from_document`] is the one place where store documents
//! are normalized: absent numbers become `0`, absent text becomes `N/A`, and
//! every defaulted field is remembered so integrity checks and the valuation
//! summary can report it.

use crate::domain::document::{Document, NOT_AVAILABLE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Well-known document field names
pub mod fields {
    pub const ITEM_ID: &str = "itemId";
    pub const ITEM_ID_ALIAS: &str = "ItemID";
    pub const DESCRIPTION: &str = "description";
    pub const DESCRIPTION_ALIASES: [&str; 3] = ["description", "desc", "name"];
    pub const UNIT_PRICE: &str = "unitPrice";
    pub const QUANTITY: &str = "quantity";
    pub const EXTENDED_VALUE: &str = "extendedValue";
    pub const CATEGORY: &str = "category";
    pub const SUPPLIER: &str = "supplier";
    pub const AUDIT_DATE: &str = "auditDate";
}

/// Fields of a record that may be defaulted during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordField {
    ItemId,
    Description,
    UnitPrice,
    Quantity,
    Category,
    Supplier,
    AuditDate,
}

impl RecordField {
    /// Canonical document field name
    pub fn field_name(&self) -> &'static str {
        match self {
            RecordField::ItemId => fields::ITEM_ID,
            RecordField::Description => fields::DESCRIPTION,
            RecordField::UnitPrice => fields::UNIT_PRICE,
            RecordField::Quantity => fields::QUANTITY,
            RecordField::Category => fields::CATEGORY,
            RecordField::Supplier => fields::SUPPLIER,
            RecordField::AuditDate => fields::AUDIT_DATE,
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A normalized flat inventory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Store identity (`_id`), needed for write-back
    pub id: Option<String>,
    pub item_id: String,
    pub description: String,
    pub unit_price: f64,
    /// Signed so negative stock counts stay detectable
    pub quantity: i64,
    pub category: String,
    pub supplier: String,
    /// Stored extended value, if one has been computed
    pub extended_value: Option<f64>,
    pub audit_date: Option<String>,
    #[serde(skip)]
    missing: BTreeSet<RecordField>,
}

impl InventoryRecord {
    /// Normalizes a store document into a record
    pub fn from_document(doc: &Document) -> Self {
        let mut missing = BTreeSet::new();

        let item_id = doc
            .text_any(&[fields::ITEM_ID, fields::ITEM_ID_ALIAS])
            .unwrap_or_else(|| {
                missing.insert(RecordField::ItemId);
                NOT_AVAILABLE.to_string()
            });

        let description = doc
            .text_any(&fields::DESCRIPTION_ALIASES)
            .unwrap_or_else(|| {
                missing.insert(RecordField::Description);
                NOT_AVAILABLE.to_string()
            });

        let unit_price = doc.number(fields::UNIT_PRICE).unwrap_or_else(|| {
            missing.insert(RecordField::UnitPrice);
            0.0
        });

        // Fractional quantities are truncated toward zero
        let quantity = doc
            .integer(fields::QUANTITY)
            .or_else(|| doc.number(fields::QUANTITY).map(|q| q.trunc() as i64))
            .unwrap_or_else(|| {
                missing.insert(RecordField::Quantity);
                0
            });

        let mut text_field = |field: RecordField| {
            doc.text(field.field_name()).unwrap_or_else(|| {
                missing.insert(field);
                NOT_AVAILABLE.to_string()
            })
        };
        let category = text_field(RecordField::Category);
        let supplier = text_field(RecordField::Supplier);

        let audit_date = doc.text(fields::AUDIT_DATE);
        if audit_date.is_none() {
            missing.insert(RecordField::AuditDate);
        }

        Self {
            id: doc.id(),
            item_id,
            description,
            unit_price,
            quantity,
            category,
            supplier,
            extended_value: doc.number(fields::EXTENDED_VALUE),
            audit_date,
            missing,
        }
    }

    /// `unitPrice × quantity` on the normalized values
    pub fn computed_extended_value(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    /// Stored extended value, falling back to the computed one
    pub fn extended_value_or_computed(&self) -> f64 {
        self.extended_value
            .unwrap_or_else(|| self.computed_extended_value())
    }

    /// Whether the stored extended value is absent or stale
    pub fn needs_valuation(&self) -> bool {
        match self.extended_value {
            None => true,
            Some(stored) => !approx_eq(stored, self.computed_extended_value()),
        }
    }

    /// Whether the field was absent in the source document
    pub fn is_missing(&self, field: RecordField) -> bool {
        self.missing.contains(&field)
    }

    /// Fields that were defaulted during normalization
    pub fn missing_fields(&self) -> &BTreeSet<RecordField> {
        &self.missing
    }

    /// Whether either valuation input was defaulted to zero
    pub fn valuation_defaulted(&self) -> bool {
        self.is_missing(RecordField::UnitPrice) || self.is_missing(RecordField::Quantity)
    }
}

impl From<&Document> for InventoryRecord {
    fn from(doc: &Document) -> Self {
        Self::from_document(doc)
    }
}

/// Relative equality within a few ULPs, so values that round-trip through
/// JSON text are not treated as stale.
fn approx_eq(a: f64, b: f64) -> bool {
    const ULPS: f64 = 4.0;
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= ULPS * f64::EPSILON * scale
}
