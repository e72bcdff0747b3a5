//! Normalized schema import
//!
//! Rebuilds the items, categories and inventory collections from flat source
//! collections. Items are deduplicated by `itemId`, categories by key; every
//! source record with an item id yields one inventory fact.

use crate::adapters::store::RecordStore;
use crate::config::NormalizedConfig;
use crate::core::query::Filter;
use crate::domain::{
    AuditError, Category, CategoryKey, CollectionName, Document, InventoryFact, InventoryRecord,
    Item, RecordField, Result,
};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of a normalized import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    /// `(collection, documents read)` per source that existed
    pub sources: Vec<(String, usize)>,

    /// Configured sources that do not exist in the store
    pub missing_sources: Vec<String>,

    /// Source documents without an item id
    pub skipped_documents: usize,

    pub items: u64,
    pub categories: u64,
    pub facts: u64,
    pub duration_ms: u64,
}

impl ImportSummary {
    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            sources = self.sources.len(),
            items = self.items,
            categories = self.categories,
            facts = self.facts,
            skipped_documents = self.skipped_documents,
            duration_ms = self.duration_ms,
            "Normalized import completed"
        );
    }

    /// Format the summary as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::from("🗂️  Normalized Import\n");
        for (name, count) in &self.sources {
            summary.push_str(&format!("  {name}: {count} documents read\n"));
        }
        for name in &self.missing_sources {
            summary.push_str(&format!("  {name}: not found, skipped\n"));
        }
        summary.push_str(&format!("  Items: {}\n", self.items));
        summary.push_str(&format!("  Categories: {}\n", self.categories));
        summary.push_str(&format!("  Inventory facts: {}\n", self.facts));
        if self.skipped_documents > 0 {
            summary.push_str(&format!(
                "  Skipped (no item id): {}\n",
                self.skipped_documents
            ));
        }
        summary
    }
}

/// In-memory result of normalizing source records
#[derive(Debug, Clone, Default)]
pub struct NormalizedData {
    pub items: Vec<Item>,
    pub categories: Vec<Category>,
    pub facts: Vec<InventoryFact>,
    pub skipped: usize,
}

impl NormalizedData {
    /// Adds one source document
    ///
    /// Documents without an item id are counted and skipped.
    pub fn push(&mut self, doc: &Document, today: NaiveDate, seen: &mut Seen) {
        let record = InventoryRecord::from_document(doc);
        if record.is_missing(RecordField::ItemId) || record.item_id.trim().is_empty() {
            self.skipped += 1;
            return;
        }

        if seen.items.insert(record.item_id.clone()) {
            self.items.push(Item {
                item_id: record.item_id.clone(),
                name: record.description.clone(),
            });
        }

        let key = CategoryKey::new(record.category.clone(), record.supplier.clone());
        if seen.categories.insert(key.clone()) {
            self.categories.push(Category::new(key.clone()));
        }

        self.facts.push(InventoryFact {
            item_id: record.item_id,
            quantity: record.quantity,
            unit_price: record.unit_price,
            audit_date: record
                .audit_date
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            category_key: key,
        });
    }
}

/// Keys already emitted during one import
#[derive(Debug, Default)]
pub struct Seen {
    items: HashSet<String>,
    categories: BTreeSet<CategoryKey>,
}

/// Rebuilds the normalized collections
pub struct NormalizedImporter {
    store: Arc<dyn RecordStore>,
    config: NormalizedConfig,
}

impl NormalizedImporter {
    pub fn new(store: Arc<dyn RecordStore>, config: NormalizedConfig) -> Self {
        Self { store, config }
    }

    /// Drops and rebuilds the three target collections
    ///
    /// `today` is the audit date given to facts that carry none.
    ///
    /// # Errors
    ///
    /// Returns a store error if any read, drop or insert fails. Targets
    /// dropped before the failure stay dropped.
    pub async fn import(&self, today: NaiveDate) -> Result<ImportSummary> {
        let start = Instant::now();
        let items = name(&self.config.items_collection)?;
        let categories = name(&self.config.categories_collection)?;
        let inventory = name(&self.config.inventory_collection)?;

        let existing: HashSet<String> = self.store.list_collections().await?.into_iter().collect();
        let mut summary = ImportSummary::default();
        let mut data = NormalizedData::default();
        let mut seen = Seen::default();

        for source in &self.config.source_collections {
            if !existing.contains(source) {
                tracing::warn!(collection = %source, "Source collection not found, skipping");
                summary.missing_sources.push(source.clone());
                continue;
            }
            let docs = self.store.find(&name(source)?, &Filter::All).await?;
            tracing::info!(collection = %source, documents = docs.len(), "Reading source collection");
            for doc in &docs {
                data.push(doc, today, &mut seen);
            }
            summary.sources.push((source.clone(), docs.len()));
        }

        for target in [&items, &categories, &inventory] {
            self.store.drop_collection(target).await?;
        }

        summary.items = self
            .store
            .insert_many(&items, data.items.iter().map(Item::to_document).collect())
            .await?;
        summary.categories = self
            .store
            .insert_many(
                &categories,
                data.categories.iter().map(Category::to_document).collect(),
            )
            .await?;
        summary.facts = self
            .store
            .insert_many(
                &inventory,
                data.facts.iter().map(InventoryFact::to_document).collect(),
            )
            .await?;

        summary.skipped_documents = data.skipped;
        summary.duration_ms = start.elapsed().as_millis() as u64;
        summary.log_summary();
        Ok(summary)
    }
}

fn name(raw: &str) -> Result<CollectionName> {
    CollectionName::new(raw).map_err(AuditError::Configuration)
}
