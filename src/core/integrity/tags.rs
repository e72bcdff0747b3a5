//! Tag-sequence anomaly detection
//!
//! Physical inventory tags are expected to form a contiguous run of integers.
//! Gaps point to lost tags, repeats to double counting.

use crate::adapters::store::RecordStore;
use crate::core::query::Filter;
use crate::core::sampling::{SampleSize, Sampler};
use crate::domain::{AuditError, CollectionName, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Gaps and repeats in a tag sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAnalysis {
    pub min: i64,
    pub max: i64,
    pub count: usize,

    /// Integers in `[min, max]` absent from the input, ascending
    pub missing: Vec<i64>,

    /// Values seen more than once, each listed once, ascending
    pub duplicates: Vec<i64>,
}

impl TagAnalysis {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.duplicates.is_empty()
    }
}

/// Widest `max - min` accepted by default
pub const DEFAULT_MAX_TAG_SPAN: u64 = 1_000_000;

/// Finds missing and duplicated tags
///
/// The gap list is materialized, so the range `[min, max]` may not span more
/// than `max_span` integers.
///
/// # Errors
///
/// Returns [`AuditError::EmptyInput`] for an empty sequence and
/// [`AuditError::InvalidInput`] when `max - min` exceeds `max_span`.
///
/// # Examples
///
/// ```
/// use stockaudit::core::integrity::{analyze_tag_sequence, DEFAULT_MAX_TAG_SPAN};
///
/// let analysis = analyze_tag_sequence(&[1, 2, 2, 4, 6], DEFAULT_MAX_TAG_SPAN).unwrap();
/// assert_eq!(analysis.missing, vec![3, 5]);
/// assert_eq!(analysis.duplicates, vec![2]);
///
/// assert!(analyze_tag_sequence(&[1, 9_000_000_000], DEFAULT_MAX_TAG_SPAN).is_err());
/// ```
pub fn analyze_tag_sequence(tags: &[i64], max_span: u64) -> Result<TagAnalysis> {
    let mut occurrences: BTreeMap<i64, usize> = BTreeMap::new();
    for &tag in tags {
        *occurrences.entry(tag).or_default() += 1;
    }

    let (Some((&min, _)), Some((&max, _))) =
        (occurrences.first_key_value(), occurrences.last_key_value())
    else {
        return Err(AuditError::EmptyInput(
            "tag sequence analysis needs at least one tag".to_string(),
        ));
    };

    // i128 so that [i64::MIN, i64::MAX] cannot overflow
    let span = i128::from(max) - i128::from(min);
    if span > i128::from(max_span) {
        return Err(AuditError::InvalidInput(format!(
            "tag range {min}..={max} spans {span} values, more than the maximum of {max_span}"
        )));
    }

    let mut missing = Vec::new();
    let mut expected = min;
    for &tag in occurrences.keys() {
        missing.extend(expected..tag);
        expected = tag.saturating_add(1);
    }

    let duplicates = occurrences
        .iter()
        .filter(|(_, &n)| n > 1)
        .map(|(&tag, _)| tag)
        .collect();

    Ok(TagAnalysis {
        min,
        max,
        count: tags.len(),
        missing,
        duplicates,
    })
}

/// Tag values read from one collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedTags {
    /// Integer tags in the store's natural order
    pub tags: Vec<i64>,

    /// Documents whose tag was absent or not an integer
    pub invalid: usize,
}

/// Reads the integer `field` from every document of `collection`
pub async fn collect_tags(
    store: &dyn RecordStore,
    collection: &CollectionName,
    field: &str,
) -> Result<CollectedTags> {
    let documents = store.find(collection, &Filter::All).await?;
    let mut collected = CollectedTags::default();
    for doc in &documents {
        match doc.integer(field) {
            Some(tag) => collected.tags.push(tag),
            None => collected.invalid += 1,
        }
    }
    Ok(collected)
}

/// Tag scan of one collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagScanReport {
    pub collection: String,
    pub field: String,
    pub analysis: TagAnalysis,
    pub invalid: usize,
}

impl TagScanReport {
    pub fn has_warnings(&self) -> bool {
        !self.analysis.is_clean() || self.invalid > 0
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let a = &self.analysis;
        let mut summary = String::new();
        summary.push_str(&format!(
            "🏷️  Tag Sequence: {}.{}\n",
            self.collection, self.field
        ));
        summary.push_str(&format!("  Tags: {} (range {}..={})\n", a.count, a.min, a.max));
        summary.push_str(&format!("  Missing: {}\n", join_tags(&a.missing)));
        summary.push_str(&format!("  Duplicates: {}\n", join_tags(&a.duplicates)));
        if self.invalid > 0 {
            summary.push_str(&format!(
                "  Documents without an integer tag: {}\n",
                self.invalid
            ));
        }
        summary
    }
}

fn join_tags(tags: &[i64]) -> String {
    if tags.is_empty() {
        return "none".to_string();
    }
    tags.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Scans the tag sequence of a collection
///
/// # Errors
///
/// Returns [`AuditError::EmptyInput`] when no document carries an integer
/// tag, and [`AuditError::InvalidInput`] when the tags span more than
/// `max_span` values.
pub async fn scan_collection_tags(
    store: &dyn RecordStore,
    collection: &CollectionName,
    field: &str,
    max_span: u64,
) -> Result<TagScanReport> {
    let collected = collect_tags(store, collection, field).await?;
    if collected.tags.is_empty() {
        return Err(AuditError::EmptyInput(format!(
            "no integer '{field}' values in collection '{collection}'"
        )));
    }
    let analysis = analyze_tag_sequence(&collected.tags, max_span)
        .map_err(|e| match e {
            AuditError::InvalidInput(msg) => {
                AuditError::InvalidInput(format!("{collection}.{field}: {msg}"))
            }
            other => other,
        })?;

    tracing::info!(
        collection = %collection,
        field,
        tags = analysis.count,
        missing = analysis.missing.len(),
        duplicates = analysis.duplicates.len(),
        invalid = collected.invalid,
        "Tag sequence scanned"
    );

    Ok(TagScanReport {
        collection: collection.to_string(),
        field: field.to_string(),
        analysis,
        invalid: collected.invalid,
    })
}

/// Tag numbers drawn for a test count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSample {
    pub collection: String,
    pub field: String,

    /// Documents carrying an integer tag
    pub population: usize,

    pub invalid: usize,

    /// Drawn tags, ascending
    pub tags: Vec<i64>,

    /// Whether the population was no larger than the requested size
    pub complete: bool,
}

impl TagSample {
    /// Format the sample as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = format!("🎯 Tag Sample: {}.{}
", self.collection, self.field);
        summary.push_str(&format!(
            "  Selected {} of {} tag(s){}\n",
            self.tags.len(),
            self.population,
            if self.complete { " (entire population)" } else { "" }
        ));
        summary.push_str(&format!("  Tags: {}\n", join_tags(&self.tags)));
        if self.invalid > 0 {
            summary.push_str(&format!(
                "  Documents without an integer tag: {}\n",
                self.invalid
            ));
        }
        summary
    }
}

/// Draws up to `size` tag numbers uniformly from a collection
///
/// # Errors
///
/// Returns [`AuditError::EmptyInput`] when no document carries an integer
/// tag.
pub async fn sample_collection_tags(
    store: &dyn RecordStore,
    collection: &CollectionName,
    field: &str,
    size: SampleSize,
    sampler: &mut Sampler,
) -> Result<TagSample> {
    let collected = collect_tags(store, collection, field).await?;
    if collected.tags.is_empty() {
        return Err(AuditError::EmptyInput(format!(
            "no integer '{field}' values in collection '{collection}'"
        )));
    }

    let population = collected.tags.len();
    let outcome = sampler.sample(collected.tags, size);
    let complete = outcome.is_complete();
    let mut tags = outcome.into_items();
    tags.sort_unstable();

    tracing::info!(
        collection = %collection,
        field,
        population,
        selected = tags.len(),
        "Tag sample drawn"
    );

    Ok(TagSample {
        collection: collection.to_string(),
        field: field.to_string(),
        population,
        invalid: collected.invalid,
        tags,
        complete,
    })
}
