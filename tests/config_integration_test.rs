//! Integration tests for configuration loading and the snapshot-backed store
//!
//! Tests touching environment variables hold `ENV_MUTEX`.

mod common;

use common::name;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use stockaudit::adapters::memory::MemoryStore;
use stockaudit::adapters::store::{connect, RecordStore};
use stockaudit::config::{
    load_config, MemoryConfig, SamplingStrategy, StockauditConfig, StoreBackend,
};
use stockaudit::core::query::Filter;
use stockaudit::core::threshold::ThresholdCriterion;
use stockaudit::core::valuation::ValuationCalculator;
use stockaudit::domain::{fields, AuditError};
use tempfile::{NamedTempFile, TempDir};

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    std::env::remove_var("STOCKAUDIT_AUDIT_SAMPLE_SIZE");
    std::env::remove_var("STOCKAUDIT_AUDIT_CRITERION");
    std::env::remove_var("STOCKAUDIT_AUDIT_SAMPLING");
    std::env::remove_var("STOCKAUDIT_APPLICATION_DRY_RUN");
    std::env::remove_var("STOCKAUDIT_POSTGRESQL_CONNECTION_STRING");
    std::env::remove_var("TEST_STOCKAUDIT_PG_PASSWORD");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_STOCKAUDIT_PG_PASSWORD", "s3cret");

    let file = write_config(
        r#"
store_backend = "postgresql"

[application]
log_level = "debug"
dry_run = true

[postgresql]
connection_string = "postgresql://audit:${TEST_STOCKAUDIT_PG_PASSWORD}@db:5432/inventory"
max_connections = 4
connection_timeout_seconds = 20

[audit]
collection = "Storage"
sample_size = 25
threshold = 1500.0
criterion = "high_price"
sampling = "store"
seed = 99
cleanup_after_export = true

[normalized]
items_collection = "items"
categories_collection = "categories"
inventory_collection = "inventory"
source_collections = ["Storage", "CPU"]
tag_field = "tag"

[export]
output_dir = "/tmp/stockaudit"
file_prefix = "q4"
delimiter = ";"
write_checksum = false

[logging]
local_enabled = true
local_path = "/tmp/stockaudit/logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    cleanup_env_vars();

    assert_eq!(config.store_backend, StoreBackend::PostgreSQL);
    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);

    let pg = config.postgresql.as_ref().unwrap();
    assert_eq!(
        pg.connection_string.expose_secret(),
        "postgresql://audit:s3cret@db:5432/inventory"
    );
    assert_eq!(pg.max_connections, 4);

    assert_eq!(config.audit.collection.as_deref(), Some("Storage"));
    assert_eq!(config.audit.sample_size, 25);
    assert_eq!(config.audit.criterion, ThresholdCriterion::HighPrice);
    assert_eq!(config.audit.sampling, SamplingStrategy::Store);
    assert_eq!(config.audit.seed, Some(99));
    assert!(config.audit.cleanup_after_export);

    assert_eq!(config.normalized.source_collections, vec!["Storage", "CPU"]);
    assert_eq!(config.normalized.tag_field, "tag");
    assert_eq!(config.export.delimiter, ';');
    assert!(!config.export.write_checksum);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = write_config("[application]\nlog_level = \"info\"\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.store_backend, StoreBackend::Memory);
    assert_eq!(config.audit.sample_size, 25);
    assert_eq!(config.audit.criterion, ThresholdCriterion::HighValue);
    assert_eq!(config.normalized.items_collection, "items");
    assert!(config.export.write_checksum);
}

#[test]
fn test_env_overrides_win_over_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("STOCKAUDIT_AUDIT_SAMPLE_SIZE", "7");
    std::env::set_var("STOCKAUDIT_AUDIT_CRITERION", "low-stock");
    std::env::set_var("STOCKAUDIT_APPLICATION_DRY_RUN", "true");

    let file = write_config("[audit]\nsample_size = 30\ncriterion = \"high_value\"\n");
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.audit.sample_size, 7);
    assert_eq!(config.audit.criterion, ThresholdCriterion::LowStock);
    assert!(config.application.dry_run);
}

#[test]
fn test_unparseable_override_is_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("STOCKAUDIT_AUDIT_SAMPLE_SIZE", "many");

    let file = write_config("");
    let result = load_config(file.path());
    cleanup_env_vars();

    let err = result.unwrap_err();
    assert!(matches!(err, AuditError::Configuration(_)));
    assert!(err.to_string().contains("STOCKAUDIT_AUDIT_SAMPLE_SIZE"));
}

#[test]
fn test_invalid_configs_are_rejected() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let cases = [
        ("store_backend = \"postgresql\"\n", "postgresql configuration is required"),
        ("[audit]\nsample_size = 0\n", "audit.sample_size"),
        ("[audit]\nthreshold = -5.0\n", "audit.threshold"),
        ("[memory]\npersist = true\n", "memory.persist requires memory.data_dir"),
        (
            "[normalized]\nsource_collections = [\"items\"]\n",
            "must not include target collection",
        ),
        ("[application]\nlog_level = \"loud\"\n", "Invalid log_level"),
    ];

    for (contents, expected) in cases {
        let file = write_config(contents);
        let err = load_config(file.path()).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "{contents:?} gave {err}"
        );
        assert_eq!(err.exit_code(), 2);
    }
}

#[tokio::test]
async fn test_persisted_valuation_survives_reopen() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("Storage.json"),
        r#"[
            {"_id": "a", "itemId": "S1", "unitPrice": 12.5, "quantity": 4},
            {"_id": "b", "itemId": "S2", "unitPrice": 3.0, "quantity": 3}
        ]"#,
    )
    .unwrap();

    let config = StockauditConfig {
        memory: MemoryConfig {
            data_dir: Some(dir.path().to_string_lossy().into_owned()),
            persist: true,
        },
        ..Default::default()
    };

    let store = connect(&config).await.unwrap();
    let valuation = ValuationCalculator::new(store)
        .run(&name("Storage"), false)
        .await
        .unwrap();
    assert_eq!(valuation.summary.updated, 2);

    let reopened = MemoryStore::open(&config.memory).await.unwrap();
    let valued = reopened
        .count(&name("Storage"), &Filter::gt(fields::EXTENDED_VALUE, 9.0))
        .await
        .unwrap();
    assert_eq!(valued, 1);
    let all = reopened
        .count(&name("Storage"), &Filter::exists(fields::EXTENDED_VALUE))
        .await
        .unwrap();
    assert_eq!(all, 2);
}
