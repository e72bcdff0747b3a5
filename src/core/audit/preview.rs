//! Collection preview: document count and the first few records

use crate::core::integrity::format_currency;
use crate::domain::InventoryRecord;

/// Default number of records shown
pub const DEFAULT_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPreview {
    pub collection: String,
    pub total: u64,

    /// Leading records in store order
    pub records: Vec<InventoryRecord>,
}

impl CollectionPreview {
    /// Format the preview as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = format!("🔎 Collection: {}\n", self.collection);
        summary.push_str(&format!("  Documents: {}\n", self.total));
        if self.records.is_empty() {
            return summary;
        }
        summary.push_str(&format!("  First {}:\n", self.records.len()));
        for record in &self.records {
            summary.push_str(&format!(
                "  - {}: {} - {} x {}\n",
                record.item_id,
                record.description,
                format_currency(record.unit_price),
                record.quantity
            ));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Document;
    use serde_json::json;

    #[test]
    fn test_summary_lists_defaults() {
        let preview = CollectionPreview {
            collection: "CPU".to_string(),
            total: 12,
            records: vec![InventoryRecord::from_document(
                &Document::from_value(json!({"itemId": "C1", "quantity": 4})).unwrap(),
            )],
        };
        let text = preview.format_summary();
        assert!(text.contains("Documents: 12"));
        assert!(text.contains("- C1: N/A - "));
        assert!(text.contains(" x 4"));
    }
}
