//! Integration tests for sample exports and collection dumps

mod common;

use common::{docs, inventory, name, store_with};
use serde_json::{json, Value};
use stockaudit::config::{ExportConfig, SamplingStrategy, StockauditConfig};
use stockaudit::core::audit::{AuditRequest, AuditRunner};
use stockaudit::core::export::checksum::{sidecar_path, verify_sidecar};
use stockaudit::core::export::{CollectionDumper, KeyPreset, KeySelection, COLUMNS};
use stockaudit::core::threshold::ThresholdCriterion;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> StockauditConfig {
    StockauditConfig {
        export: ExportConfig {
            output_dir: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn request(collection: &str, sample_size: i64) -> AuditRequest {
    AuditRequest {
        collection: name(collection),
        sample_size,
        threshold: 0.0,
        criterion: ThresholdCriterion::HighValue,
        sampling: SamplingStrategy::Client,
        seed: Some(5),
        dry_run: false,
    }
}

#[tokio::test]
async fn test_sparse_records_export_rectangular_rows() {
    let dir = TempDir::new().unwrap();
    let store = store_with(
        "GPU",
        docs(vec![
            json!({"itemId": "G1", "unitPrice": 700.0, "quantity": 2}),
            json!({"ItemID": "G2", "desc": "RTX", "unitPrice": 1200.0, "quantity": 1,
                   "category": "GPU", "supplier": "Nvidia", "auditDate": "2024-09-30"}),
        ]),
    );
    let runner = AuditRunner::new(store, config_in(&dir));
    let outcome = runner.run_audit(&request("GPU", 10)).await.unwrap();
    let receipt = runner.export_results(&outcome, None).await.unwrap();

    assert_eq!(receipt.rows, 2);
    assert!(receipt.path.starts_with(dir.path()));
    let file_name = receipt.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("audit_sample_GPU_"));
    assert!(file_name.ends_with(".csv"));

    let mut reader = csv::Reader::from_path(&receipt.path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, COLUMNS.map(str::to_string).to_vec());

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.len() == 8));

    let run_date = outcome.run_date.format("%Y-%m-%d").to_string();
    let g1 = records.iter().find(|r| &r[0] == "G1").unwrap();
    assert_eq!(&g1[1], "N/A");
    assert_eq!(&g1[4], "1400.0");
    assert_eq!(&g1[5], "N/A");
    assert_eq!(&g1[6], "N/A");
    assert_eq!(&g1[7], run_date.as_str());

    let g2 = records.iter().find(|r| &r[0] == "G2").unwrap();
    assert_eq!(&g2[1], "RTX");
    assert_eq!(&g2[7], "2024-09-30");
}

#[tokio::test]
async fn test_empty_sample_exports_header_only() {
    let dir = TempDir::new().unwrap();
    let store = store_with("Storage", inventory(5));
    let runner = AuditRunner::new(store, config_in(&dir));

    let mut req = request("Storage", 3);
    req.threshold = 1.0e12;
    let outcome = runner.run_audit(&req).await.unwrap();
    let path = dir.path().join("empty.csv");
    let receipt = runner.export_results(&outcome, Some(path.clone())).await.unwrap();

    assert_eq!(receipt.rows, 0);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[tokio::test]
async fn test_tampered_export_fails_verification() {
    let dir = TempDir::new().unwrap();
    let store = store_with("Storage", inventory(8));
    let runner = AuditRunner::new(store, config_in(&dir));

    let outcome = runner.run_audit(&request("Storage", 4)).await.unwrap();
    let path = dir.path().join("sample.csv");
    let receipt = runner.export_results(&outcome, Some(path.clone())).await.unwrap();

    assert_eq!(receipt.checksum_path.as_deref(), Some(sidecar_path(&path).as_path()));
    assert!(verify_sidecar(&path).await.unwrap());

    let mut text = std::fs::read_to_string(&path).unwrap();
    text.push_str("FORGED,row,1,1,1,x,y,2025-01-01\n");
    std::fs::write(&path, text).unwrap();
    assert!(!verify_sidecar(&path).await.unwrap());
}

#[tokio::test]
async fn test_dump_with_core_preset() {
    let dir = TempDir::new().unwrap();
    let store = store_with("Storage", inventory(3));
    let dumper = CollectionDumper::new(store, false, true);

    let written = dumper
        .dump(
            dir.path(),
            "inventory",
            &[],
            &KeySelection::preset(KeyPreset::Core),
        )
        .await
        .unwrap();

    assert_eq!(written.len(), 1);
    let file = &written[0];
    assert_eq!(file.collection, "Storage");
    assert_eq!(file.documents, 3);
    assert_eq!(file.path, dir.path().join("inventory_Storage.json"));
    assert!(verify_sidecar(&file.path).await.unwrap());

    let dumped: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(&file.path).unwrap()).unwrap();
    assert_eq!(dumped.len(), 3);
    for doc in &dumped {
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert!(keys
            .iter()
            .all(|k| KeyPreset::Core.keys().contains(&k.as_str())));
        assert!(doc.get("description").is_none());
        assert!(doc.get("itemId").is_some());
    }
}

#[tokio::test]
async fn test_low_stock_export_carries_computed_extended_value() {
    let dir = TempDir::new().unwrap();
    let store = store_with(
        "Storage",
        docs(vec![
            json!({"itemId": "L1", "unitPrice": 5.0, "quantity": 3}),
            json!({"itemId": "L2", "unitPrice": 9.0, "quantity": 40}),
        ]),
    );
    let runner = AuditRunner::new(store, config_in(&dir));

    let mut req = request("Storage", 5);
    req.criterion = ThresholdCriterion::LowStock;
    req.threshold = 10.0;
    let outcome = runner.run_audit(&req).await.unwrap();
    assert!(outcome.valuation.is_none());

    let path = dir.path().join("low_stock.csv");
    let receipt = runner.export_results(&outcome, Some(path.clone())).await.unwrap();
    assert_eq!(receipt.rows, 1);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let row = reader.records().next().unwrap().unwrap();
    assert_eq!(&row[0], "L1");
    assert_eq!(&row[2], "5.0");
    assert_eq!(&row[3], "3");
    assert_eq!(&row[4], "15.0");
}
