//! Threshold filtering
//!
//! Selects records whose extended value or unit price strictly exceeds a
//! bound, or whose quantity falls strictly below it. The same criterion can
//! run client-side over normalized records or be pushed down to the store as
//! a [`Filter`]; both select the same set.

use crate::core::query::Filter;
use crate::domain::{fields, AuditError, InventoryRecord, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which field is compared, and in which direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdCriterion {
    /// `extendedValue > threshold`
    #[default]
    HighValue,
    /// `unitPrice > threshold`
    HighPrice,
    /// `quantity < threshold`
    LowStock,
}

impl ThresholdCriterion {
    /// Document field the criterion reads
    pub fn field(&self) -> &'static str {
        match self {
            ThresholdCriterion::HighValue => fields::EXTENDED_VALUE,
            ThresholdCriterion::HighPrice => fields::UNIT_PRICE,
            ThresholdCriterion::LowStock => fields::QUANTITY,
        }
    }

    /// Whether values below the bound are selected
    pub fn is_below(&self) -> bool {
        matches!(self, ThresholdCriterion::LowStock)
    }

    /// Whether the audit needs extended values computed first
    pub fn needs_valuation(&self) -> bool {
        matches!(self, ThresholdCriterion::HighValue)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdCriterion::HighValue => "high_value",
            ThresholdCriterion::HighPrice => "high_price",
            ThresholdCriterion::LowStock => "low_stock",
        }
    }
}

impl fmt::Display for ThresholdCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdCriterion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "high_value" => Ok(ThresholdCriterion::HighValue),
            "high_price" => Ok(ThresholdCriterion::HighPrice),
            "low_stock" => Ok(ThresholdCriterion::LowStock),
            other => Err(format!(
                "unknown criterion '{other}'. Must be one of: high_value, high_price, low_stock"
            )),
        }
    }
}

/// A validated comparison bound: finite and non-negative
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Threshold(f64);

impl Threshold {
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidInput`] for negative or non-finite values
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(AuditError::InvalidInput(format!(
                "threshold must be a finite number, got {value}"
            )));
        }
        if value < 0.0 {
            return Err(AuditError::InvalidInput(format!(
                "threshold must be >= 0, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Criterion plus bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdFilter {
    pub criterion: ThresholdCriterion,
    pub threshold: Threshold,
}

impl ThresholdFilter {
    pub fn new(criterion: ThresholdCriterion, threshold: Threshold) -> Self {
        Self {
            criterion,
            threshold,
        }
    }

    /// Store predicate selecting the same records as [`ThresholdFilter::matches`]
    pub fn to_filter(&self) -> Filter {
        let field = self.criterion.field();
        let bound = self.threshold.value();
        if self.criterion.is_below() {
            Filter::lt(field, bound)
        } else {
            Filter::gt(field, bound)
        }
    }

    /// Client-side evaluation over a normalized record
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        let bound = self.threshold.value();
        match self.criterion {
            ThresholdCriterion::HighValue => record.extended_value.unwrap_or(0.0) > bound,
            ThresholdCriterion::HighPrice => record.unit_price > bound,
            ThresholdCriterion::LowStock => (record.quantity as f64) < bound,
        }
    }

    /// Keeps matching records, preserving input order
    pub fn apply(&self, records: Vec<InventoryRecord>) -> Vec<InventoryRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

impl fmt::Display for ThresholdFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.criterion.is_below() { "<" } else { ">" };
        write!(f, "{} {} {}", self.criterion.field(), op, self.threshold)
    }
}
