//! Extended-value computation
//!
//! Computes `extendedValue = unitPrice × quantity` for every record whose
//! stored value is absent or stale, and writes all changes back as one
//! batched store write. Absent inputs count as zero and are tallied, never
//! raised.

use crate::adapters::store::RecordStore;
use crate::core::query::Filter;
use crate::domain::{fields, CollectionName, InventoryRecord, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Outcome counters of one valuation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuationSummary {
    /// Records read from the collection
    pub scanned: usize,

    /// Records whose extended value was absent or stale
    pub updated: usize,

    /// Records whose price or quantity was absent and valued as zero
    pub defaulted: usize,

    /// Records without `_id`, which cannot be written back
    pub unaddressable: usize,

    /// Documents the store matched during write-back
    pub matched: u64,

    /// Whether the computed values were written to the store
    pub persisted: bool,

    pub duration_ms: u64,
}

impl ValuationSummary {
    /// Log the summary
    pub fn log_summary(&self, collection: &CollectionName) {
        tracing::info!(
            collection = %collection,
            scanned = self.scanned,
            updated = self.updated,
            defaulted = self.defaulted,
            matched = self.matched,
            persisted = self.persisted,
            duration_ms = self.duration_ms,
            "Valuation completed"
        );

        if self.defaulted > 0 {
            tracing::warn!(
                collection = %collection,
                defaulted = self.defaulted,
                "Records with missing price or quantity were valued as zero"
            );
        }
        if self.unaddressable > 0 {
            tracing::warn!(
                collection = %collection,
                unaddressable = self.unaddressable,
                "Records without _id could not be written back"
            );
        }
    }
}

/// Valuation result: counters plus every record carrying its computed value
#[derive(Debug, Clone)]
pub struct Valuation {
    pub summary: ValuationSummary,
    pub records: Vec<InventoryRecord>,
}

/// Computes and persists extended values
pub struct ValuationCalculator {
    store: Arc<dyn RecordStore>,
}

impl ValuationCalculator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Values every record of `collection`
    ///
    /// With `dry_run` the values are computed and returned but not written.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read or the batched write fails.
    pub async fn run(&self, collection: &CollectionName, dry_run: bool) -> Result<Valuation> {
        let start = Instant::now();
        let documents = self.store.find(collection, &Filter::All).await?;

        let mut summary = ValuationSummary {
            scanned: documents.len(),
            ..Default::default()
        };
        let mut updates = Vec::new();
        let mut records = Vec::with_capacity(documents.len());

        for doc in &documents {
            let mut record = InventoryRecord::from_document(doc);
            let computed = record.computed_extended_value();

            if record.valuation_defaulted() {
                summary.defaulted += 1;
            }
            if record.needs_valuation() {
                summary.updated += 1;
                match record.id {
                    Some(ref id) => updates.push((id.clone(), Value::from(computed))),
                    None => summary.unaddressable += 1,
                }
            }

            record.extended_value = Some(computed);
            records.push(record);
        }

        if dry_run {
            tracing::info!(
                collection = %collection,
                pending = updates.len(),
                "DRY RUN: extended values computed but not written"
            );
        } else if !updates.is_empty() {
            let result = self
                .store
                .bulk_set(collection, fields::EXTENDED_VALUE, updates)
                .await?;
            summary.matched = result.matched;
            summary.persisted = true;
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        summary.log_summary(collection);

        Ok(Valuation { summary, records })
    }

    /// Removes `extendedValue` from every record of `collection`
    ///
    /// # Returns
    ///
    /// Number of records that held the field.
    pub async fn cleanup(&self, collection: &CollectionName) -> Result<u64> {
        let removed = self
            .store
            .unset_field(collection, fields::EXTENDED_VALUE)
            .await?;
        tracing::info!(collection = %collection, removed, "Derived fields removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::Document;
    use serde_json::json;

    fn store_with(docs: Vec<Value>) -> Arc<MemoryStore> {
        let docs = docs
            .into_iter()
            .map(|v| Document::from_value(v).unwrap())
            .collect();
        Arc::new(MemoryStore::with_collections([("Storage", docs)]))
    }

    fn storage() -> CollectionName {
        CollectionName::new("Storage").unwrap()
    }

    #[tokio::test]
    async fn test_values_and_persists() {
        let store = store_with(vec![
            json!({"_id": "1", "itemId": "A", "unitPrice": 2.5, "quantity": 4}),
            json!({"_id": "2", "itemId": "B", "unitPrice": 10.0}),
        ]);
        let calculator = ValuationCalculator::new(store.clone());

        let valuation = calculator.run(&storage(), false).await.unwrap();
        assert_eq!(valuation.summary.scanned, 2);
        assert_eq!(valuation.summary.updated, 2);
        assert_eq!(valuation.summary.defaulted, 1);
        assert_eq!(valuation.summary.matched, 2);
        assert!(valuation.summary.persisted);
        assert_eq!(valuation.records[0].extended_value, Some(10.0));
        assert_eq!(valuation.records[1].extended_value, Some(0.0));

        let docs = store.find(&storage(), &Filter::All).await.unwrap();
        assert_eq!(docs[0].number("extendedValue"), Some(10.0));
        assert_eq!(docs[1].number("extendedValue"), Some(0.0));
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let store = store_with(vec![
            json!({"_id": "1", "unitPrice": 3.0, "quantity": 3}),
            json!({"_id": "2", "unitPrice": 1.5, "quantity": 2, "extendedValue": 99.0}),
        ]);
        let calculator = ValuationCalculator::new(store.clone());

        let first = calculator.run(&storage(), false).await.unwrap();
        assert_eq!(first.summary.updated, 2);
        let before = store.find(&storage(), &Filter::All).await.unwrap();

        let second = calculator.run(&storage(), false).await.unwrap();
        assert_eq!(second.summary.updated, 0);
        assert!(!second.summary.persisted);
        assert_eq!(store.find(&storage(), &Filter::All).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_write() {
        let store = store_with(vec![json!({"_id": "1", "unitPrice": 3.0, "quantity": 3})]);
        let calculator = ValuationCalculator::new(store.clone());

        let valuation = calculator.run(&storage(), true).await.unwrap();
        assert_eq!(valuation.summary.updated, 1);
        assert!(!valuation.summary.persisted);
        assert_eq!(valuation.records[0].extended_value, Some(9.0));
        assert_eq!(
            store.count(&storage(), &Filter::exists("extendedValue")).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_cleanup() {
        let store = store_with(vec![
            json!({"_id": "1", "extendedValue": 5.0}),
            json!({"_id": "2"}),
        ]);
        let calculator = ValuationCalculator::new(store.clone());
        assert_eq!(calculator.cleanup(&storage()).await.unwrap(), 1);
        assert_eq!(
            store.count(&storage(), &Filter::exists("extendedValue")).await.unwrap(),
            0
        );
    }
}
