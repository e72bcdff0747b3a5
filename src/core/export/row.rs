//! Fixed eight-column audit rows

use crate::domain::{InventoryRecord, JoinedRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column headers, in output order
pub const COLUMNS: [&str; 8] = [
    "Item ID",
    "Description",
    "Unit Price",
    "Quantity",
    "Extended Value",
    "Category",
    "Supplier",
    "Audit Date",
];

/// One exported row
///
/// Both flat records and normalized rows project onto the same columns, so
/// every file is rectangular regardless of which audit produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRow {
    #[serde(rename = "Item ID")]
    pub item_id: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Unit Price")]
    pub unit_price: f64,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "Extended Value")]
    pub extended_value: f64,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Audit Date")]
    pub audit_date: String,
}

fn date_or(audit_date: Option<&str>, run_date: NaiveDate) -> String {
    audit_date
        .map(str::to_string)
        .unwrap_or_else(|| run_date.format("%Y-%m-%d").to_string())
}

impl AuditRow {
    /// Projects a flat record; a missing audit date becomes `run_date`
    pub fn from_record(record: &InventoryRecord, run_date: NaiveDate) -> Self {
        Self {
            item_id: record.item_id.clone(),
            description: record.description.clone(),
            unit_price: record.unit_price,
            quantity: record.quantity,
            extended_value: record.extended_value_or_computed(),
            category: record.category.clone(),
            supplier: record.supplier.clone(),
            audit_date: date_or(record.audit_date.as_deref(), run_date),
        }
    }

    /// Projects a normalized row; the item name is the description
    pub fn from_joined(row: &JoinedRow, run_date: NaiveDate) -> Self {
        Self {
            item_id: row.item_id.clone(),
            description: row.name.clone(),
            unit_price: row.unit_price,
            quantity: row.quantity,
            extended_value: row.extended_value,
            category: row.category.clone(),
            supplier: row.supplier.clone(),
            audit_date: date_or(row.audit_date.as_deref(), run_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Document;
    use serde_json::json;

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_from_sparse_record() {
        let record = InventoryRecord::from_document(
            &Document::from_value(json!({"itemId": "X9", "quantity": 3})).unwrap(),
        );
        let row = AuditRow::from_record(&record, run_date());
        assert_eq!(row.item_id, "X9");
        assert_eq!(row.description, "N/A");
        assert_eq!(row.unit_price, 0.0);
        assert_eq!(row.extended_value, 0.0);
        assert_eq!(row.category, "N/A");
        assert_eq!(row.audit_date, "2025-06-01");
    }

    #[test]
    fn test_unvalued_record_exports_computed_extended_value() {
        let record = InventoryRecord::from_document(
            &Document::from_value(json!({"itemId": "L1", "unitPrice": 5.0, "quantity": 3}))
                .unwrap(),
        );
        assert_eq!(record.extended_value, None);
        let row = AuditRow::from_record(&record, run_date());
        assert_eq!(row.extended_value, 15.0);
    }

    #[test]
    fn test_from_joined_keeps_fact_date() {
        let doc = Document::from_value(json!({
            "itemId": "A",
            "name": "Widget",
            "inventory_info": {"quantity": 2, "unitPrice": 4.5, "auditDate": "2024-02-29"},
            "category_info": [{"category": "Parts", "supplier": "Acme"}],
            "extendedValue": 9.0
        }))
        .unwrap();
        let row = AuditRow::from_joined(&JoinedRow::from_document(&doc), run_date());
        assert_eq!(row.description, "Widget");
        assert_eq!(row.extended_value, 9.0);
        assert_eq!(row.supplier, "Acme");
        assert_eq!(row.audit_date, "2024-02-29");
    }
}
