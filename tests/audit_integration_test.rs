//! Integration tests for valuation, threshold filtering and sampling

mod common;

use common::{docs, inventory, name, store_with};
use serde_json::json;
use std::collections::HashSet;
use stockaudit::adapters::store::RecordStore;
use stockaudit::config::{SamplingStrategy, StockauditConfig};
use stockaudit::core::audit::{AuditEntry, AuditRequest, AuditRunner, AuditWarning};
use stockaudit::core::query::Filter;
use stockaudit::core::threshold::ThresholdCriterion;
use stockaudit::core::valuation::ValuationCalculator;
use stockaudit::domain::{fields, InventoryRecord};
use test_case::test_case;

fn request(sample_size: i64, threshold: f64, criterion: ThresholdCriterion) -> AuditRequest {
    AuditRequest {
        collection: name("Storage"),
        sample_size,
        threshold,
        criterion,
        sampling: SamplingStrategy::Client,
        seed: Some(11),
        dry_run: false,
    }
}

fn item_ids(entries: &[AuditEntry]) -> Vec<String> {
    entries.iter().map(|e| e.item_id().to_string()).collect()
}

#[tokio::test]
async fn test_valuation_is_idempotent() {
    let store = store_with("Storage", inventory(20));
    let calculator = ValuationCalculator::new(store.clone());

    let first = calculator.run(&name("Storage"), false).await.unwrap();
    assert_eq!(first.summary.updated, 20);
    assert!(first.summary.persisted);
    let before = store.find(&name("Storage"), &Filter::All).await.unwrap();

    let second = calculator.run(&name("Storage"), false).await.unwrap();
    assert_eq!(second.summary.updated, 0);
    assert!(!second.summary.persisted);
    let after = store.find(&name("Storage"), &Filter::All).await.unwrap();

    assert_eq!(before, after);
    for doc in &after {
        let record = InventoryRecord::from_document(doc);
        assert_eq!(
            record.extended_value,
            Some(record.unit_price * record.quantity as f64)
        );
    }
}

#[test_case(30, 5 ; "more candidates than requested")]
#[test_case(5, 5 ; "exactly as many as requested")]
#[test_case(3, 10 ; "fewer candidates than requested")]
#[tokio::test]
async fn test_sample_is_bounded_and_distinct(n: usize, k: i64) {
    let store = store_with("Storage", inventory(n));
    let runner = AuditRunner::new(store, StockauditConfig::default());

    // every generated price is >= 1
    let outcome = runner
        .run_audit(&request(k, 0.5, ThresholdCriterion::HighPrice))
        .await
        .unwrap();

    assert_eq!(outcome.candidates, n);
    assert_eq!(outcome.sample.len(), n.min(k as usize));
    assert_eq!(outcome.sample.is_complete(), n <= k as usize);

    let ids = item_ids(outcome.sample.items());
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
    assert!(ids
        .iter()
        .all(|id| (0..n).any(|i| *id == format!("ITEM-{i}"))));
}

#[tokio::test]
async fn test_high_value_filter_selects_exactly_above_threshold() {
    let documents = inventory(40);
    let threshold = 5_000.0;
    let expected: HashSet<String> = documents
        .iter()
        .map(InventoryRecord::from_document)
        .filter(|r| r.unit_price * r.quantity as f64 > threshold)
        .map(|r| r.item_id)
        .collect();

    let store = store_with("Storage", documents);
    let runner = AuditRunner::new(store, StockauditConfig::default());
    let outcome = runner
        .run_audit(&request(1_000, threshold, ThresholdCriterion::HighValue))
        .await
        .unwrap();

    let selected: HashSet<String> = item_ids(outcome.sample.items()).into_iter().collect();
    assert_eq!(selected, expected);
    assert!(outcome
        .sample
        .items()
        .iter()
        .all(|e| e.extended_value() > threshold));
}

#[tokio::test]
async fn test_threshold_equal_to_value_is_excluded() {
    let store = store_with(
        "Storage",
        docs(vec![
            json!({"itemId": "A", "unitPrice": 10.0, "quantity": 10}),
            json!({"itemId": "B", "unitPrice": 10.0, "quantity": 11}),
        ]),
    );
    let runner = AuditRunner::new(store, StockauditConfig::default());
    let outcome = runner
        .run_audit(&request(10, 100.0, ThresholdCriterion::HighValue))
        .await
        .unwrap();
    assert_eq!(item_ids(outcome.sample.items()), vec!["B".to_string()]);
}

#[tokio::test]
async fn test_no_match_yields_empty_sample_with_warning() {
    let store = store_with("Storage", inventory(10));
    let runner = AuditRunner::new(store, StockauditConfig::default());

    let outcome = runner
        .run_audit(&request(5, 1.0e12, ThresholdCriterion::HighValue))
        .await
        .unwrap();

    assert!(outcome.sample.is_empty());
    assert_eq!(outcome.candidates, 0);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [AuditWarning::EmptyResult { .. }]
    ));
}

#[tokio::test]
async fn test_same_seed_same_sample() {
    let store = store_with("Storage", inventory(50));
    let runner = AuditRunner::new(store, StockauditConfig::default());
    let req = request(7, 0.0, ThresholdCriterion::HighPrice);

    let first = runner.run_audit(&req).await.unwrap();
    let second = runner.run_audit(&req).await.unwrap();
    assert_eq!(
        item_ids(first.sample.items()),
        item_ids(second.sample.items())
    );
}

#[tokio::test]
async fn test_dry_run_leaves_store_untouched() {
    let store = store_with("Storage", inventory(15));
    let runner = AuditRunner::new(store.clone(), StockauditConfig::default());
    let mut req = request(100, 0.0, ThresholdCriterion::HighValue);
    req.dry_run = true;

    let outcome = runner.run_audit(&req).await.unwrap();
    assert_eq!(outcome.candidates, 15);
    assert!(outcome.dry_run);
    assert!(outcome.valuation.as_ref().is_some_and(|v| !v.persisted));

    let valued = store
        .count(&name("Storage"), &Filter::exists(fields::EXTENDED_VALUE))
        .await
        .unwrap();
    assert_eq!(valued, 0);
}

#[tokio::test]
async fn test_store_sampling_falls_back_on_memory_store() {
    let store = store_with("Storage", inventory(25));
    let runner = AuditRunner::new(store, StockauditConfig::default());
    let mut req = request(4, 0.0, ThresholdCriterion::HighPrice);
    req.sampling = SamplingStrategy::Store;

    let outcome = runner.run_audit(&req).await.unwrap();
    assert_eq!(outcome.sample.len(), 4);
    assert_eq!(outcome.candidates, 25);
}

#[tokio::test]
async fn test_missing_fields_are_defaulted_and_reported() {
    let store = store_with(
        "Storage",
        docs(vec![
            json!({"itemId": "A", "unitPrice": 200.0, "quantity": 2}),
            json!({"itemId": "B", "quantity": 5}),
            json!({"itemId": "C", "unitPrice": 3.0}),
        ]),
    );
    let runner = AuditRunner::new(store.clone(), StockauditConfig::default());

    let outcome = runner
        .run_audit(&request(10, 0.0, ThresholdCriterion::HighValue))
        .await
        .unwrap();
    assert_eq!(item_ids(outcome.sample.items()), vec!["A".to_string()]);
    assert!(outcome
        .warnings
        .contains(&AuditWarning::PartialFieldDefault { records: 2 }));

    let zeroes = store
        .count(&name("Storage"), &Filter::equals(fields::EXTENDED_VALUE, 0.0))
        .await
        .unwrap();
    assert_eq!(zeroes, 2);
}
