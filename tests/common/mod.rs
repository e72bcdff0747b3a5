//! Shared fixtures for integration tests

#![allow(dead_code)]

use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use std::sync::Arc;
use stockaudit::adapters::memory::MemoryStore;
use stockaudit::domain::{CollectionName, Document};

pub fn docs(values: Vec<Value>) -> Vec<Document> {
    values
        .into_iter()
        .map(|v| Document::from_value(v).unwrap())
        .collect()
}

pub fn name(s: &str) -> CollectionName {
    CollectionName::new(s).unwrap()
}

/// `n` complete inventory records with unique item ids `ITEM-0..n`
///
/// Prices lie in `[1, 1000)` and quantities in `[1, 50)`, drawn from a
/// fixed seed so every run sees the same collection.
pub fn inventory(n: usize) -> Vec<Document> {
    let mut rng = StdRng::seed_from_u64(2024);
    (0..n)
        .map(|i| {
            let price: f64 = (100..100_000).fake_with_rng::<i64, _>(&mut rng) as f64 / 100.0;
            let quantity: i64 = (1..50).fake_with_rng(&mut rng);
            let word: String = Word().fake_with_rng(&mut rng);
            Document::from_value(json!({
                "_id": format!("doc-{i}"),
                "itemId": format!("ITEM-{i}"),
                "description": word,
                "unitPrice": price,
                "quantity": quantity,
                "category": "Storage",
                "supplier": "Acme",
            }))
            .unwrap()
        })
        .collect()
}

pub fn store_with(collection: &str, documents: Vec<Document>) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_collections([(collection, documents)]))
}
