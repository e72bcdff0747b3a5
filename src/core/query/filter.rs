//! Document predicates
//!
//! A [`Filter`] is evaluated in memory with [`Filter::matches`] or translated
//! to SQL by the PostgreSQL backend. Numeric comparisons read absent or
//! non-numeric fields as `0`.

use crate::domain::Document;
use serde_json::Value;

/// Predicate over a document
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    /// Field is present and not null
    Exists(String),
    /// Field is absent or null
    Missing(String),
    /// Numeric field strictly greater than the bound
    Gt(String, f64),
    /// Numeric field strictly less than the bound
    Lt(String, f64),
    /// Field equals the JSON value
    Eq(String, Value),
    /// Field is absent or an empty array
    EmptyArray(String),
    /// All inner filters match
    And(Vec<Filter>),
}

impl Filter {
    pub fn exists(path: impl Into<String>) -> Self {
        Filter::Exists(path.into())
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Filter::Missing(path.into())
    }

    pub fn gt(path: impl Into<String>, bound: f64) -> Self {
        Filter::Gt(path.into(), bound)
    }

    pub fn lt(path: impl Into<String>, bound: f64) -> Self {
        Filter::Lt(path.into(), bound)
    }

    pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(path.into(), value.into())
    }

    pub fn empty_array(path: impl Into<String>) -> Self {
        Filter::EmptyArray(path.into())
    }

    /// Conjunction with another filter, flattening nested `And`s
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (f, Filter::And(mut right)) => {
                right.insert(0, f);
                Filter::And(right)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// Evaluates the predicate in memory
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Exists(path) => doc.has(path),
            Filter::Missing(path) => !doc.has(path),
            Filter::Gt(path, bound) => doc.number_or_zero(path) > *bound,
            Filter::Lt(path, bound) => doc.number_or_zero(path) < *bound,
            Filter::Eq(path, value) => doc.get_path(path) == Some(value),
            Filter::EmptyArray(path) => match doc.get_path(path) {
                None => true,
                Some(Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            },
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test_case(json!({"extendedValue": 1500.0}), true ; "above bound")]
    #[test_case(json!({"extendedValue": 1000.0}), false ; "equal to bound")]
    #[test_case(json!({"extendedValue": 10.0}), false ; "below bound")]
    #[test_case(json!({}), false ; "absent reads as zero")]
    fn test_gt_is_strict(value: Value, expected: bool) {
        assert_eq!(Filter::gt("extendedValue", 1000.0).matches(&doc(value)), expected);
    }

    #[test]
    fn test_lt_absent_reads_as_zero() {
        assert!(Filter::lt("quantity", 5.0).matches(&doc(json!({}))));
        assert!(!Filter::lt("quantity", 5.0).matches(&doc(json!({"quantity": 5}))));
    }

    #[test]
    fn test_exists_and_missing() {
        let d = doc(json!({"unitPrice": 3.0, "quantity": null}));
        assert!(Filter::exists("unitPrice").matches(&d));
        assert!(Filter::missing("quantity").matches(&d));
        assert!(Filter::missing("itemId").matches(&d));
    }

    #[test]
    fn test_eq_structured_value() {
        let d = doc(json!({"categoryKey": {"category": "CPU", "supplier": "AMD"}}));
        assert!(Filter::equals("categoryKey", json!({"supplier": "AMD", "category": "CPU"})).matches(&d));
        assert!(!Filter::equals("categoryKey", json!({"category": "CPU", "supplier": "Intel"})).matches(&d));
    }

    #[test]
    fn test_empty_array() {
        assert!(Filter::empty_array("item_info").matches(&doc(json!({"item_info": []}))));
        assert!(Filter::empty_array("item_info").matches(&doc(json!({}))));
        assert!(!Filter::empty_array("item_info").matches(&doc(json!({"item_info": [{}]}))));
    }

    #[test]
    fn test_and_flattens() {
        let f = Filter::exists("a")
            .and(Filter::exists("b"))
            .and(Filter::All)
            .and(Filter::exists("c"));
        match &f {
            Filter::And(inner) => assert_eq!(inner.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
        assert!(f.matches(&doc(json!({"a": 1, "b": 2, "c": 3}))));
        assert!(!f.matches(&doc(json!({"a": 1, "b": 2}))));
    }
}
