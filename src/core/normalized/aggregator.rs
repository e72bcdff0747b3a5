//! `Item ⟕ InventoryFact ⟕ Category` aggregation
//!
//! Both joins are left outer: an item without a fact still yields one row
//! with zero quantity and price, and a fact whose category key matches no
//! category yields `N/A` category fields.

use crate::adapters::store::RecordStore;
use crate::config::{NormalizedConfig, SamplingStrategy};
use crate::core::query::{Filter, Pipeline};
use crate::core::sampling::{SampleOutcome, SampleSize, Sampler};
use crate::core::threshold::Threshold;
use crate::domain::schema::{CATEGORY_INFO, CATEGORY_KEY, INVENTORY_INFO};
use crate::domain::{fields, AuditError, CollectionName, JoinedRow, Result};
use rand::Rng;
use std::sync::Arc;

const CANDIDATES: &str = "candidates";

/// Rows selected from the normalized view
#[derive(Debug, Clone)]
pub struct NormalizedSelection {
    /// Rows passing the threshold, before sampling
    pub candidates: usize,

    pub rows: SampleOutcome<JoinedRow>,

    /// Whether the sample was drawn by the store
    pub store_sampled: bool,
}

/// Builds and runs the normalized view pipeline
pub struct NormalizedAggregator {
    store: Arc<dyn RecordStore>,
    config: NormalizedConfig,
}

impl NormalizedAggregator {
    pub fn new(store: Arc<dyn RecordStore>, config: NormalizedConfig) -> Self {
        Self { store, config }
    }

    fn items(&self) -> Result<CollectionName> {
        CollectionName::new(self.config.items_collection.as_str())
            .map_err(AuditError::Configuration)
    }

    /// The join/compute pipeline, with an optional `extendedValue > t` stage
    pub fn pipeline(&self, threshold: Option<Threshold>) -> Pipeline {
        let fact = |field: &str| format!("{INVENTORY_INFO}.{field}");

        let pipeline = Pipeline::new()
            .join(
                self.config.inventory_collection.as_str(),
                fields::ITEM_ID,
                fields::ITEM_ID,
                INVENTORY_INFO,
            )
            .unwind(INVENTORY_INFO, true)
            .join(
                self.config.categories_collection.as_str(),
                fact(CATEGORY_KEY),
                CATEGORY_KEY,
                CATEGORY_INFO,
            )
            .multiply(
                fields::EXTENDED_VALUE,
                fact(fields::UNIT_PRICE),
                fact(fields::QUANTITY),
            );

        match threshold {
            Some(t) => pipeline.filter(Filter::gt(fields::EXTENDED_VALUE, t.value())),
            None => pipeline,
        }
    }

    /// Every row of the view passing the optional threshold
    pub async fn rows(&self, threshold: Option<Threshold>) -> Result<Vec<JoinedRow>> {
        let docs = self
            .store
            .aggregate(&self.items()?, &self.pipeline(threshold))
            .await?;
        Ok(docs.iter().map(JoinedRow::from_document).collect())
    }

    /// Rows of the view passing the optional threshold, optionally sampled
    ///
    /// With [`SamplingStrategy::Store`] and a backend that samples natively,
    /// the candidate count and the sample are both computed by the store.
    /// Otherwise all candidates are fetched and `sampler` draws the sample.
    pub async fn select<R: Rng + Send>(
        &self,
        threshold: Option<Threshold>,
        size: Option<SampleSize>,
        strategy: SamplingStrategy,
        sampler: &mut Sampler<R>,
    ) -> Result<NormalizedSelection> {
        let Some(size) = size else {
            let rows = self.rows(threshold).await?;
            return Ok(NormalizedSelection {
                candidates: rows.len(),
                rows: SampleOutcome::Complete(rows),
                store_sampled: false,
            });
        };

        if strategy == SamplingStrategy::Store && self.store.supports_native_sampling() {
            return self.select_in_store(threshold, size).await;
        }
        if strategy == SamplingStrategy::Store {
            tracing::debug!(
                backend = self.store.backend_name(),
                "Store has no native sampling, sampling client-side"
            );
        }

        let rows = self.rows(threshold).await?;
        let candidates = rows.len();
        Ok(NormalizedSelection {
            candidates,
            rows: sampler.sample(rows, size),
            store_sampled: false,
        })
    }

    async fn select_in_store(
        &self,
        threshold: Option<Threshold>,
        size: SampleSize,
    ) -> Result<NormalizedSelection> {
        let items = self.items()?;
        let counted = self
            .store
            .aggregate(&items, &self.pipeline(threshold).count(CANDIDATES))
            .await?;
        let candidates = counted
            .first()
            .and_then(|d| d.integer(CANDIDATES))
            .unwrap_or(0)
            .max(0) as usize;

        if candidates <= size.get() {
            let rows = self.rows(threshold).await?;
            return Ok(NormalizedSelection {
                candidates,
                rows: SampleOutcome::Complete(rows),
                store_sampled: true,
            });
        }

        let docs = self
            .store
            .aggregate(&items, &self.pipeline(threshold).sample(size.get()))
            .await?;
        Ok(NormalizedSelection {
            candidates,
            rows: SampleOutcome::Sampled(docs.iter().map(JoinedRow::from_document).collect()),
            store_sampled: true,
        })
    }
}
