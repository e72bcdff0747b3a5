//! Audit outcome and warnings

use crate::core::export::AuditRow;
use crate::core::integrity::format_currency;
use crate::core::sampling::SampleOutcome;
use crate::core::threshold::ThresholdFilter;
use crate::core::valuation::ValuationSummary;
use crate::domain::{InventoryRecord, JoinedRow, RunId};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Non-fatal conditions raised during an audit
#[derive(Debug, Clone, PartialEq)]
pub enum AuditWarning {
    /// No record passed the threshold; the sample is empty
    EmptyResult { filter: String },

    /// Records were valued with a missing price or quantity taken as zero
    PartialFieldDefault { records: usize },

    /// Records without `_id` could not receive their computed value
    Unaddressable { records: usize },
}

impl fmt::Display for AuditWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditWarning::EmptyResult { filter } => {
                write!(f, "no records matched {filter}; the sample is empty")
            }
            AuditWarning::PartialFieldDefault { records } => write!(
                f,
                "{records} record(s) had a missing price or quantity, valued as 0"
            ),
            AuditWarning::Unaddressable { records } => write!(
                f,
                "{records} record(s) have no _id; computed values were not stored"
            ),
        }
    }
}

/// One sampled record, flat or from the normalized view
#[derive(Debug, Clone, PartialEq)]
pub enum AuditEntry {
    Flat(InventoryRecord),
    Joined(JoinedRow),
}

impl AuditEntry {
    pub fn item_id(&self) -> &str {
        match self {
            AuditEntry::Flat(r) => &r.item_id,
            AuditEntry::Joined(r) => &r.item_id,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            AuditEntry::Flat(r) => &r.description,
            AuditEntry::Joined(r) => &r.name,
        }
    }

    pub fn extended_value(&self) -> f64 {
        match self {
            AuditEntry::Flat(r) => r.extended_value_or_computed(),
            AuditEntry::Joined(r) => r.extended_value,
        }
    }

    pub fn to_row(&self, run_date: NaiveDate) -> AuditRow {
        match self {
            AuditEntry::Flat(r) => AuditRow::from_record(r, run_date),
            AuditEntry::Joined(r) => AuditRow::from_joined(r, run_date),
        }
    }
}

/// Result of one audit run
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub run_id: RunId,
    pub collection: String,
    pub filter: ThresholdFilter,
    pub requested_size: usize,

    /// Records passing the threshold
    pub candidates: usize,

    pub sample: SampleOutcome<AuditEntry>,
    pub valuation: Option<ValuationSummary>,
    pub warnings: Vec<AuditWarning>,
    pub dry_run: bool,

    /// Sample drawn from the normalized view rather than a flat collection
    pub normalized: bool,

    pub started_at: DateTime<Utc>,

    /// Date written for records without an audit date
    pub run_date: NaiveDate,

    pub duration_ms: u64,
}

impl AuditOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Sum of extended values over the sample
    pub fn sampled_value(&self) -> f64 {
        self.sample.items().iter().map(AuditEntry::extended_value).sum()
    }

    /// The sample projected onto the export columns
    pub fn rows(&self) -> Vec<AuditRow> {
        self.sample
            .items()
            .iter()
            .map(|entry| entry.to_row(self.run_date))
            .collect()
    }

    /// Format the outcome as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("🔎 Audit {} on {}\n", self.run_id.short(), self.collection));
        if self.dry_run {
            summary.push_str("  Mode: DRY RUN (no values written)\n");
        }
        summary.push_str(&format!("  Filter: {}\n", self.filter));
        summary.push_str(&format!("  Candidates: {}\n", self.candidates));
        summary.push_str(&format!(
            "  Sample: {} of {} requested{}\n",
            self.sample.len(),
            self.requested_size,
            if self.sample.is_complete() {
                " (all candidates)"
            } else {
                ""
            }
        ));
        if let Some(ref valuation) = self.valuation {
            summary.push_str(&format!(
                "  Valuation: {} scanned, {} updated, {} defaulted\n",
                valuation.scanned, valuation.updated, valuation.defaulted
            ));
        }

        if !self.sample.is_empty() {
            summary.push_str("\n  #   Item ID          Extended Value  Description\n");
            for (i, entry) in self.sample.items().iter().enumerate() {
                summary.push_str(&format!(
                    "  {:<3} {:<16} {:>14}  {}\n",
                    i + 1,
                    entry.item_id(),
                    format_currency(entry.extended_value()),
                    entry.description()
                ));
            }
        }

        summary.push_str(&format!(
            "\n  Total sampled value: {}\n",
            format_currency(self.sampled_value())
        ));

        for warning in &self.warnings {
            summary.push_str(&format!("  ⚠️  {warning}\n"));
        }
        summary
    }
}
