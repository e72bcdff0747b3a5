//! Integrity report structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one presence or sign check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Warn,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Pass => f.write_str("PASS"),
            CheckStatus::Warn => f.write_str("WARN"),
        }
    }
}

/// Count of offending records and their share of the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub label: String,
    pub count: u64,
    pub percent: f64,
    pub status: CheckStatus,
}

impl CheckResult {
    /// Builds a result; the percent of an empty collection is 0
    pub fn new(label: impl Into<String>, count: u64, total: u64) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        let status = if count == 0 {
            CheckStatus::Pass
        } else {
            CheckStatus::Warn
        };
        Self {
            label: label.into(),
            count,
            percent,
            status,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: count={}, percent={:.1}%",
            self.label, self.count, self.percent
        )
    }
}

/// Integrity scan of one flat collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub collection: String,
    pub checked_at: DateTime<Utc>,
    pub total_records: u64,
    pub checks: Vec<CheckResult>,

    /// Sum of `unitPrice × quantity` over records holding both fields
    pub total_value: f64,

    pub duration_ms: u64,
}

impl IntegrityReport {
    /// Number of checks that did not pass
    pub fn warning_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed()).count()
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Looks up a check by label
    pub fn check(&self, label: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.label == label)
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("📋 Integrity Report: {}\n", self.collection));
        summary.push_str(&format!("  Checked at: {}\n", self.checked_at));
        summary.push_str(&format!("  Total records: {}\n", self.total_records));
        for check in &self.checks {
            let icon = if check.passed() { "✅" } else { "⚠️ " };
            summary.push_str(&format!("  {icon} [{}] {check}\n", check.status));
        }
        summary.push_str(&format!(
            "  Total inventory value: {}\n",
            format_currency(self.total_value)
        ));
        summary
    }
}

/// Integrity scan of the normalized collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedIntegrityReport {
    pub checked_at: DateTime<Utc>,
    pub items_count: u64,
    pub categories_count: u64,
    pub facts_count: u64,

    /// Facts whose `itemId` matches no item
    pub orphaned_facts: CheckResult,

    /// Facts whose category key matches no category
    pub orphaned_category_refs: CheckResult,

    /// Sum of `unitPrice × quantity` over facts joined to an item
    pub total_value: f64,

    pub duration_ms: u64,
}

impl NormalizedIntegrityReport {
    pub fn has_warnings(&self) -> bool {
        !self.orphaned_facts.passed() || !self.orphaned_category_refs.passed()
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📋 Normalized Integrity Report\n");
        summary.push_str(&format!("  Checked at: {}\n", self.checked_at));
        summary.push_str(&format!("  Items: {}\n", self.items_count));
        summary.push_str(&format!("  Categories: {}\n", self.categories_count));
        summary.push_str(&format!("  Inventory facts: {}\n", self.facts_count));
        for check in [&self.orphaned_facts, &self.orphaned_category_refs] {
            summary.push_str(&format!("  [{}] {check}\n", check.status));
        }
        summary.push_str(&format!(
            "  Total inventory value: {}\n",
            format_currency(self.total_value)
        ));
        summary
    }
}

/// Formats an amount as `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${grouped}.{frac}", if negative { "-" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_check_result_display() {
        let missing = CheckResult::new("Missing Price", 2, 10);
        assert_eq!(missing.to_string(), "Missing Price: count=2, percent=20.0%");
        assert_eq!(missing.status, CheckStatus::Warn);

        let clean = CheckResult::new("Negative Qty", 0, 10);
        assert_eq!(clean.to_string(), "Negative Qty: count=0, percent=0.0%");
        assert_eq!(clean.status, CheckStatus::Pass);
    }

    #[test]
    fn test_empty_collection_percent_is_zero() {
        let result = CheckResult::new("Missing ItemID", 0, 0);
        assert_eq!(result.percent, 0.0);
        assert!(result.passed());
    }

    #[test_case(0.0, "$0.00")]
    #[test_case(999.5, "$999.50")]
    #[test_case(1234.5, "$1,234.50")]
    #[test_case(1234567.891, "$1,234,567.89")]
    #[test_case(-1000.0, "-$1,000.00")]
    fn test_format_currency(amount: f64, expected: &str) {
        assert_eq!(format_currency(amount), expected);
    }

    #[test]
    fn test_report_warnings() {
        let report = IntegrityReport {
            collection: "CPU".to_string(),
            checked_at: Utc::now(),
            total_records: 4,
            checks: vec![
                CheckResult::new("Missing ItemID", 0, 4),
                CheckResult::new("Negative Qty", 1, 4),
            ],
            total_value: 10.0,
            duration_ms: 1,
        };
        assert_eq!(report.warning_count(), 1);
        assert!(report.has_warnings());
        assert_eq!(report.check("Negative Qty").unwrap().percent, 25.0);
        let text = report.format_summary();
        assert!(text.contains("[WARN] Negative Qty: count=1, percent=25.0%"));
        assert!(text.contains("$10.00"));
    }
}
