//! Audit runner - orchestrates one audit session against a record store
//!
//! The runner ties the valuation calculator, threshold filter, sampler,
//! integrity checker and exporter together behind the operations the CLI
//! drives: select a collection, run an audit, run integrity scans, export
//! the sample and clean up derived fields.

use super::outcome::{AuditEntry, AuditOutcome, AuditWarning};
use super::preview::CollectionPreview;
use crate::adapters::store::RecordStore;
use crate::config::{AuditConfig, SamplingStrategy, StockauditConfig};
use crate::core::export::{ExportReceipt, ResultExporter};
use crate::core::ingest::{CsvImportSummary, CsvImporter};
use crate::core::integrity::{
    sample_collection_tags, scan_collection_tags, IntegrityChecker, IntegrityReport,
    NormalizedIntegrityReport, TagSample, TagScanReport,
};
use crate::core::normalized::{ImportSummary, NormalizedAggregator, NormalizedImporter};
use crate::core::query::{Filter, Pipeline};
use crate::core::sampling::{SampleOutcome, SampleSize, Sampler};
use crate::core::threshold::{Threshold, ThresholdCriterion, ThresholdFilter};
use crate::core::valuation::{Valuation, ValuationCalculator};
use crate::domain::{AuditError, CollectionName, InventoryRecord, Result, RunId};
use chrono::{Local, NaiveDate, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// How the audited collection is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSelector {
    Name(String),

    /// 1-based position in the sorted collection list
    Index(usize),
}

impl fmt::Display for CollectionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionSelector::Name(name) => write!(f, "'{name}'"),
            CollectionSelector::Index(i) => write!(f, "#{i}"),
        }
    }
}

/// Parameters of one audit run
///
/// Sample size and threshold are kept raw so they are validated by the run
/// itself, before any store access.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub collection: CollectionName,
    pub sample_size: i64,
    pub threshold: f64,
    pub criterion: ThresholdCriterion,
    pub sampling: SamplingStrategy,
    pub seed: Option<u64>,
    pub dry_run: bool,
}

impl AuditRequest {
    /// Request built from the configured audit defaults
    pub fn from_config(collection: CollectionName, config: &AuditConfig, dry_run: bool) -> Self {
        Self {
            collection,
            sample_size: config.sample_size,
            threshold: config.threshold,
            criterion: config.criterion,
            sampling: config.sampling,
            seed: config.seed,
            dry_run,
        }
    }

    fn validate(&self) -> Result<(SampleSize, ThresholdFilter)> {
        let size = SampleSize::new(self.sample_size)?;
        let threshold = Threshold::new(self.threshold)?;
        Ok((size, ThresholdFilter::new(self.criterion, threshold)))
    }
}

/// Candidates after filtering, and the drawn sample
struct Selection {
    candidates: usize,
    sample: SampleOutcome<InventoryRecord>,
}

/// Audit session bound to one store
pub struct AuditRunner {
    store: Arc<dyn RecordStore>,
    config: StockauditConfig,
}

impl AuditRunner {
    pub fn new(store: Arc<dyn RecordStore>, config: StockauditConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn config(&self) -> &StockauditConfig {
        &self.config
    }

    /// Sorted names of every collection in the store
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.store.list_collections().await
    }

    /// Resolves a selector against the store's collection list
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidInput`] for an index outside
    /// `1..=collections` or a name the store does not hold.
    pub async fn select_collection(&self, selector: &CollectionSelector) -> Result<CollectionName> {
        let collections = self.store.list_collections().await?;

        let selected = match selector {
            CollectionSelector::Index(i) => {
                let i = *i;
                if i == 0 || i > collections.len() {
                    return Err(AuditError::InvalidInput(format!(
                        "collection index {i} out of range 1..={}",
                        collections.len()
                    )));
                }
                collections[i - 1].clone()
            }
            CollectionSelector::Name(name) => {
                if !collections.iter().any(|c| c == name) {
                    return Err(AuditError::InvalidInput(format!(
                        "collection '{name}' not found ({} available)",
                        collections.len()
                    )));
                }
                name.clone()
            }
        };

        tracing::debug!(selector = %selector, collection = %selected, "Collection selected");
        CollectionName::new(selected).map_err(AuditError::InvalidInput)
    }

    /// Runs a flat-collection audit
    ///
    /// For the high-value criterion, extended values are computed first
    /// (and persisted unless `dry_run`). The threshold is pushed down to the
    /// store except in a dry run, where it is applied to the freshly
    /// computed values. An empty result is a warning, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidInput`] for a sample size `<= 0` or a
    /// negative or non-finite threshold, before the store is touched. Any
    /// store failure aborts the run.
    pub async fn run_audit(&self, request: &AuditRequest) -> Result<AuditOutcome> {
        let (size, filter) = request.validate()?;
        let start = Instant::now();
        let started_at = Utc::now();

        crate::log_audit_start!(request.collection, size, filter);

        let valuation = if filter.criterion.needs_valuation() {
            Some(
                ValuationCalculator::new(self.store.clone())
                    .run(&request.collection, request.dry_run)
                    .await?,
            )
        } else {
            None
        };

        let mut sampler = Sampler::from_seed_option(request.seed);
        let selection = match valuation {
            Some(ref v) if request.dry_run => Selection::client(&filter, v, size, &mut sampler),
            _ => {
                self.select_flat(&request.collection, &filter, size, request.sampling, &mut sampler)
                    .await?
            }
        };

        let mut warnings = Vec::new();
        if selection.candidates == 0 {
            warnings.push(AuditWarning::EmptyResult {
                filter: filter.to_string(),
            });
        }
        let defaulted = match valuation {
            Some(ref v) => v.summary.defaulted,
            None => selection
                .sample
                .items()
                .iter()
                .filter(|r| r.valuation_defaulted())
                .count(),
        };
        if defaulted > 0 {
            warnings.push(AuditWarning::PartialFieldDefault { records: defaulted });
        }
        if let Some(ref v) = valuation {
            if v.summary.unaddressable > 0 {
                warnings.push(AuditWarning::Unaddressable {
                    records: v.summary.unaddressable,
                });
            }
        }
        for warning in &warnings {
            tracing::warn!(collection = %request.collection, "{warning}");
        }

        let elapsed = start.elapsed();
        crate::log_audit_complete!(
            request.collection,
            selection.candidates,
            selection.sample.len(),
            elapsed
        );

        Ok(AuditOutcome {
            run_id: RunId::generate(),
            collection: request.collection.to_string(),
            filter,
            requested_size: size.get(),
            candidates: selection.candidates,
            sample: selection.sample.map(AuditEntry::Flat),
            valuation: valuation.map(|v| v.summary),
            warnings,
            dry_run: request.dry_run,
            normalized: false,
            started_at,
            run_date: Local::now().date_naive(),
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    async fn select_flat(
        &self,
        collection: &CollectionName,
        filter: &ThresholdFilter,
        size: SampleSize,
        strategy: SamplingStrategy,
        sampler: &mut Sampler,
    ) -> Result<Selection> {
        let predicate = filter.to_filter();

        if strategy == SamplingStrategy::Store && self.store.supports_native_sampling() {
            let candidates = self.store.count(collection, &predicate).await? as usize;
            if candidates > size.get() {
                if let Some(docs) = self.store.sample(collection, &predicate, size.get()).await? {
                    return Ok(Selection {
                        candidates,
                        sample: SampleOutcome::Sampled(
                            docs.iter().map(InventoryRecord::from_document).collect(),
                        ),
                    });
                }
            }
        } else if strategy == SamplingStrategy::Store {
            tracing::debug!(
                backend = self.store.backend_name(),
                "Store has no native sampling, sampling client-side"
            );
        }

        let records: Vec<InventoryRecord> = self
            .store
            .find(collection, &predicate)
            .await?
            .iter()
            .map(InventoryRecord::from_document)
            .collect();
        Ok(Selection {
            candidates: records.len(),
            sample: sampler.sample(records, size),
        })
    }

    /// Runs an audit over the joined normalized view
    ///
    /// Only the high-value criterion applies: the view derives
    /// `extendedValue` from each fact.
    pub async fn run_normalized_audit(&self, request: &AuditRequest) -> Result<AuditOutcome> {
        let (size, filter) = request.validate()?;
        if filter.criterion != ThresholdCriterion::HighValue {
            return Err(AuditError::InvalidInput(format!(
                "normalized audits support the high_value criterion only, got {}",
                filter.criterion
            )));
        }
        let start = Instant::now();
        let started_at = Utc::now();
        let items = &self.config.normalized.items_collection;

        crate::log_audit_start!(items, size, filter);

        let mut sampler = Sampler::from_seed_option(request.seed);
        let selection = NormalizedAggregator::new(self.store.clone(), self.config.normalized.clone())
            .select(Some(filter.threshold), Some(size), request.sampling, &mut sampler)
            .await?;

        let mut warnings = Vec::new();
        if selection.candidates == 0 {
            warnings.push(AuditWarning::EmptyResult {
                filter: filter.to_string(),
            });
        }
        for warning in &warnings {
            tracing::warn!(collection = %items, "{warning}");
        }

        let elapsed = start.elapsed();
        crate::log_audit_complete!(items, selection.candidates, selection.rows.len(), elapsed);

        Ok(AuditOutcome {
            run_id: RunId::generate(),
            collection: items.clone(),
            filter,
            requested_size: size.get(),
            candidates: selection.candidates,
            sample: selection.rows.map(AuditEntry::Joined),
            valuation: None,
            warnings,
            dry_run: request.dry_run,
            normalized: true,
            started_at,
            run_date: Local::now().date_naive(),
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    /// Presence, sign and total-value checks over a flat collection
    pub async fn run_integrity_scan(&self, collection: &CollectionName) -> Result<IntegrityReport> {
        IntegrityChecker::new(self.store.clone())
            .check_collection(collection)
            .await
    }

    /// Orphan and total-value checks over the normalized schema
    pub async fn run_normalized_integrity_scan(&self) -> Result<NormalizedIntegrityReport> {
        IntegrityChecker::new(self.store.clone())
            .check_normalized(&self.config.normalized)
            .await
    }

    /// Tag-sequence anomalies; `field` defaults to the configured tag field
    pub async fn scan_tags(
        &self,
        collection: &CollectionName,
        field: Option<&str>,
    ) -> Result<TagScanReport> {
        let field = field.unwrap_or(&self.config.normalized.tag_field);
        scan_collection_tags(
            self.store.as_ref(),
            collection,
            field,
            self.config.normalized.max_tag_span,
        )
        .await
    }

    /// Draws up to `sample_size` tag numbers for a test count
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidInput`] for a sample size `<= 0`, before
    /// the store is touched.
    pub async fn sample_tags(
        &self,
        collection: &CollectionName,
        field: Option<&str>,
        sample_size: i64,
        seed: Option<u64>,
    ) -> Result<TagSample> {
        let size = SampleSize::new(sample_size)?;
        let field = field.unwrap_or(&self.config.normalized.tag_field);
        let mut sampler = Sampler::from_seed_option(seed);
        sample_collection_tags(self.store.as_ref(), collection, field, size, &mut sampler).await
    }

    /// Document count and the first `limit` records in store order
    pub async fn preview(
        &self,
        collection: &CollectionName,
        limit: usize,
    ) -> Result<CollectionPreview> {
        let total = self.store.count(collection, &Filter::All).await?;
        let records = if limit == 0 || total == 0 {
            Vec::new()
        } else {
            self.store
                .aggregate(collection, &Pipeline::new().limit(limit))
                .await?
                .iter()
                .map(InventoryRecord::from_document)
                .collect()
        };
        tracing::debug!(
            collection = %collection,
            total,
            shown = records.len(),
            "Collection previewed"
        );
        Ok(CollectionPreview {
            collection: collection.to_string(),
            total,
            records,
        })
    }

    /// Appends the rows of a CSV file to `collection`
    ///
    /// The delimiter is `export.delimiter` unless given.
    pub async fn import_csv(
        &self,
        path: &Path,
        collection: &CollectionName,
        delimiter: Option<char>,
        dry_run: bool,
    ) -> Result<CsvImportSummary> {
        let delimiter = delimiter.unwrap_or(self.config.export.delimiter);
        CsvImporter::new(self.store.clone(), delimiter)?
            .import(path, collection, dry_run)
            .await
    }

    /// Writes the outcome's sample to `path`, or to the default export path
    pub async fn export_results(
        &self,
        outcome: &AuditOutcome,
        path: Option<PathBuf>,
    ) -> Result<ExportReceipt> {
        let exporter = ResultExporter::new(self.config.export.clone());
        let path = path.unwrap_or_else(|| {
            exporter.default_path(
                &outcome.collection,
                outcome.started_at.with_timezone(&Local).naive_local(),
            )
        });
        tracing::info!(
            run_id = %outcome.run_id,
            path = %path.display(),
            rows = outcome.sample.len(),
            "Exporting audit sample"
        );
        exporter.export(&outcome.rows(), &path).await
    }

    /// Removes derived `extendedValue` fields; skipped in a dry run
    pub async fn cleanup(&self, collection: &CollectionName, dry_run: bool) -> Result<u64> {
        if dry_run {
            tracing::info!(collection = %collection, "DRY RUN: cleanup skipped");
            return Ok(0);
        }
        ValuationCalculator::new(self.store.clone())
            .cleanup(collection)
            .await
    }

    /// Rebuilds the normalized collections from the configured sources
    pub async fn import_normalized(&self, today: NaiveDate) -> Result<ImportSummary> {
        NormalizedImporter::new(self.store.clone(), self.config.normalized.clone())
            .import(today)
            .await
    }
}

impl Selection {
    /// Filters freshly computed values without touching the store
    fn client(
        filter: &ThresholdFilter,
        valuation: &Valuation,
        size: SampleSize,
        sampler: &mut Sampler,
    ) -> Self {
        let matching = filter.apply(valuation.records.clone());
        Self {
            candidates: matching.len(),
            sample: sampler.sample(matching, size),
        }
    }
}
