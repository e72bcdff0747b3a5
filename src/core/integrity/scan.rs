//! Integrity scans over flat and normalized collections
//!
//! Every check is a store-side count or pipeline; no collection is pulled
//! into memory by the checker itself.

use super::report::{CheckResult, IntegrityReport, NormalizedIntegrityReport};
use crate::adapters::store::RecordStore;
use crate::config::NormalizedConfig;
use crate::core::query::{Filter, Pipeline};
use crate::domain::{fields, schema, AuditError, CollectionName, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

pub const MISSING_ITEM_ID: &str = "Missing ItemID";
pub const MISSING_PRICE: &str = "Missing Price";
pub const MISSING_QUANTITY: &str = "Missing Quantity";
pub const NEGATIVE_PRICE: &str = "Negative Price";
pub const NEGATIVE_QTY: &str = "Negative Qty";
pub const ORPHANED_FACTS: &str = "Orphaned Inventory Records";
pub const ORPHANED_CATEGORIES: &str = "Orphaned Category References";

const TOTAL_VALUE: &str = "totalValue";
const TOTAL_INVENTORY_VALUE: &str = "totalInventoryValue";
const ORPHANED_COUNT: &str = "orphanedCount";
const ITEM_INFO: &str = "item_info";

/// The five presence and sign checks, in report order
pub fn record_checks() -> Vec<(&'static str, Filter)> {
    vec![
        (
            MISSING_ITEM_ID,
            Filter::missing(fields::ITEM_ID).and(Filter::missing(fields::ITEM_ID_ALIAS)),
        ),
        (MISSING_PRICE, Filter::missing(fields::UNIT_PRICE)),
        (MISSING_QUANTITY, Filter::missing(fields::QUANTITY)),
        (NEGATIVE_PRICE, Filter::lt(fields::UNIT_PRICE, 0.0)),
        (NEGATIVE_QTY, Filter::lt(fields::QUANTITY, 0.0)),
    ]
}

/// Runs integrity checks against a record store
pub struct IntegrityChecker {
    store: Arc<dyn RecordStore>,
}

impl IntegrityChecker {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Presence and sign checks plus the total inventory value of one
    /// flat collection
    pub async fn check_collection(&self, collection: &CollectionName) -> Result<IntegrityReport> {
        let start = Instant::now();
        let total_records = self.store.count(collection, &Filter::All).await?;

        let mut checks = Vec::new();
        for (label, filter) in record_checks() {
            let count = self.store.count(collection, &filter).await?;
            let result = CheckResult::new(label, count, total_records);
            crate::log_check_result!(collection.as_str(), result);
            checks.push(result);
        }

        let total_value = self.total_value(collection).await?;

        Ok(IntegrityReport {
            collection: collection.to_string(),
            checked_at: Utc::now(),
            total_records,
            checks,
            total_value,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Sum of `unitPrice × quantity` over records holding both fields
    pub async fn total_value(&self, collection: &CollectionName) -> Result<f64> {
        let pipeline = Pipeline::new()
            .filter(Filter::exists(fields::UNIT_PRICE).and(Filter::exists(fields::QUANTITY)))
            .multiply(TOTAL_VALUE, fields::UNIT_PRICE, fields::QUANTITY)
            .project(&[TOTAL_VALUE])
            .group_sum(TOTAL_INVENTORY_VALUE, TOTAL_VALUE);
        self.single_number(collection, &pipeline, TOTAL_INVENTORY_VALUE)
            .await
    }

    /// Orphan counts, collection sizes and total value of the normalized
    /// schema
    pub async fn check_normalized(
        &self,
        config: &NormalizedConfig,
    ) -> Result<NormalizedIntegrityReport> {
        let start = Instant::now();
        let items = collection_name(&config.items_collection)?;
        let categories = collection_name(&config.categories_collection)?;
        let inventory = collection_name(&config.inventory_collection)?;

        let items_count = self.store.count(&items, &Filter::All).await?;
        let categories_count = self.store.count(&categories, &Filter::All).await?;
        let facts_count = self.store.count(&inventory, &Filter::All).await?;

        let orphaned_facts = self
            .orphan_count(&inventory, &items, fields::ITEM_ID, fields::ITEM_ID)
            .await?;
        let orphaned_categories = self
            .orphan_count(
                &inventory,
                &categories,
                schema::CATEGORY_KEY,
                schema::CATEGORY_KEY,
            )
            .await?;

        let value_pipeline = Pipeline::new()
            .join(items.as_str(), fields::ITEM_ID, fields::ITEM_ID, ITEM_INFO)
            .unwind(ITEM_INFO, false)
            .multiply(TOTAL_VALUE, fields::UNIT_PRICE, fields::QUANTITY)
            .project(&[TOTAL_VALUE])
            .group_sum(TOTAL_INVENTORY_VALUE, TOTAL_VALUE);
        let total_value = self
            .single_number(&inventory, &value_pipeline, TOTAL_INVENTORY_VALUE)
            .await?;

        let report = NormalizedIntegrityReport {
            checked_at: Utc::now(),
            items_count,
            categories_count,
            facts_count,
            orphaned_facts: CheckResult::new(ORPHANED_FACTS, orphaned_facts, facts_count),
            orphaned_category_refs: CheckResult::new(
                ORPHANED_CATEGORIES,
                orphaned_categories,
                facts_count,
            ),
            total_value,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        crate::log_check_result!(inventory.as_str(), report.orphaned_facts);
        crate::log_check_result!(inventory.as_str(), report.orphaned_category_refs);
        Ok(report)
    }

    /// Documents of `source` whose `local` value matches nothing in `target`
    pub async fn orphan_count(
        &self,
        source: &CollectionName,
        target: &CollectionName,
        local: &str,
        foreign: &str,
    ) -> Result<u64> {
        let pipeline = Pipeline::new()
            .join(target.as_str(), local, foreign, ITEM_INFO)
            .filter(Filter::empty_array(ITEM_INFO))
            .count(ORPHANED_COUNT);
        let count = self.single_number(source, &pipeline, ORPHANED_COUNT).await?;
        Ok(count.max(0.0) as u64)
    }

    /// First document's numeric `field`, 0 when the pipeline yields nothing
    async fn single_number(
        &self,
        collection: &CollectionName,
        pipeline: &Pipeline,
        field: &str,
    ) -> Result<f64> {
        let rows = self.store.aggregate(collection, pipeline).await?;
        Ok(rows.first().map(|d| d.number_or_zero(field)).unwrap_or(0.0))
    }
}

fn collection_name(name: &str) -> Result<CollectionName> {
    CollectionName::new(name).map_err(AuditError::Configuration)
}
