//! In-memory record store

use super::snapshot::SnapshotDir;
use crate::adapters::store::{BulkWriteResult, RecordStore};
use crate::config::MemoryConfig;
use crate::core::query::{executor, Filter, Pipeline};
use crate::domain::{CollectionName, Document, Result, ID_FIELD};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Collections held in memory, optionally loaded from and persisted to JSON
/// snapshot files
///
/// Pipelines run through the in-memory executor under one read lock. There
/// is no native sampling operator.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<Document>>>,
    snapshots: Option<SnapshotDir>,
    persist: bool,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with collections
    pub fn with_collections<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Document>)>,
        S: Into<String>,
    {
        let map = collections
            .into_iter()
            .map(|(name, mut docs)| {
                docs.iter_mut().for_each(ensure_id);
                (name.into(), docs)
            })
            .collect();
        Self {
            collections: RwLock::new(map),
            snapshots: None,
            persist: false,
        }
    }

    /// Opens a store from configuration, loading snapshots if configured
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot file cannot be read or parsed.
    pub async fn open(config: &MemoryConfig) -> Result<Self> {
        let Some(ref dir) = config.data_dir else {
            tracing::info!("Memory store starting empty (no data_dir configured)");
            return Ok(Self::new());
        };

        let snapshots = SnapshotDir::new(dir);
        let mut collections = snapshots.load_all().await?;
        for docs in collections.values_mut() {
            docs.iter_mut().for_each(ensure_id);
        }

        tracing::info!(
            data_dir = %dir,
            collections = collections.len(),
            persist = config.persist,
            "Memory store loaded snapshots"
        );

        Ok(Self {
            collections: RwLock::new(collections),
            snapshots: Some(snapshots),
            persist: config.persist,
        })
    }

    async fn persist_collection(&self, name: &str, docs: Option<&[Document]>) -> Result<()> {
        if !self.persist {
            return Ok(());
        }
        let Some(ref snapshots) = self.snapshots else {
            return Ok(());
        };
        match docs {
            Some(docs) => snapshots.write(name, docs).await,
            None => snapshots.remove(name).await,
        }
    }
}

fn ensure_id(doc: &mut Document) {
    if doc.id().is_none() {
        doc.set(ID_FIELD, Value::String(uuid::Uuid::new_v4().simple().to_string()));
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn test_connection(&self) -> Result<()> {
        let _guard = self.collections.read().await;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(collections.keys().cloned().collect())
    }

    async fn count(&self, collection: &CollectionName, filter: &Filter) -> Result<u64> {
        let collections = self.collections.read().await;
        let n = collections
            .get(collection.as_str())
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count())
            .unwrap_or(0);
        Ok(n as u64)
    }

    async fn find(&self, collection: &CollectionName, filter: &Filter) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn bulk_set(
        &self,
        collection: &CollectionName,
        field: &str,
        updates: Vec<(String, Value)>,
    ) -> Result<BulkWriteResult> {
        let requested = updates.len();
        if requested == 0 {
            return Ok(BulkWriteResult::default());
        }

        let mut by_id: HashMap<String, Value> = updates.into_iter().collect();
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection.as_str()) else {
            return Ok(BulkWriteResult {
                requested,
                matched: 0,
            });
        };

        let mut matched = 0u64;
        for doc in docs.iter_mut() {
            if let Some(value) = doc.id().and_then(|id| by_id.remove(&id)) {
                doc.set(field, value);
                matched += 1;
            }
        }

        self.persist_collection(collection.as_str(), Some(docs.as_slice())).await?;
        Ok(BulkWriteResult { requested, matched })
    }

    async fn unset_field(&self, collection: &CollectionName, field: &str) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection.as_str()) else {
            return Ok(0);
        };
        let removed = docs
            .iter_mut()
            .filter_map(|doc| doc.remove(field))
            .count() as u64;
        if removed > 0 {
            self.persist_collection(collection.as_str(), Some(docs.as_slice())).await?;
        }
        Ok(removed)
    }

    async fn insert_many(
        &self,
        collection: &CollectionName,
        documents: Vec<Document>,
    ) -> Result<u64> {
        let inserted = documents.len() as u64;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.as_str().to_string()).or_default();
        docs.extend(documents.into_iter().map(|mut doc| {
            ensure_id(&mut doc);
            doc
        }));
        self.persist_collection(collection.as_str(), Some(docs.as_slice())).await?;
        Ok(inserted)
    }

    async fn drop_collection(&self, collection: &CollectionName) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let existed = collections.remove(collection.as_str()).is_some();
        if existed {
            self.persist_collection(collection.as_str(), None).await?;
        }
        Ok(existed)
    }

    async fn aggregate(
        &self,
        collection: &CollectionName,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let source = collections
            .get(collection.as_str())
            .cloned()
            .unwrap_or_default();
        let foreign: BTreeMap<String, Vec<Document>> = pipeline
            .joined_collections()
            .into_iter()
            .filter_map(|name| {
                collections
                    .get(name)
                    .map(|docs| (name.to_string(), docs.clone()))
            })
            .collect();
        Ok(executor::execute(pipeline, source, &foreign)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn name(s: &str) -> CollectionName {
        CollectionName::new(s).unwrap()
    }

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_ids_assigned_on_insert() {
        let store = MemoryStore::new();
        store
            .insert_many(&name("CPU"), vec![doc(json!({"itemId": "A"}))])
            .await
            .unwrap();
        let docs = store.find(&name("CPU"), &Filter::All).await.unwrap();
        assert!(docs[0].id().is_some());
    }

    #[tokio::test]
    async fn test_unknown_collection_reads_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.count(&name("nope"), &Filter::All).await.unwrap(), 0);
        assert!(store.find(&name("nope"), &Filter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_set_and_unset() {
        let store = MemoryStore::with_collections([(
            "GPU",
            vec![doc(json!({"_id": "1"})), doc(json!({"_id": "2"}))],
        )]);
        let result = store
            .bulk_set(
                &name("GPU"),
                "extendedValue",
                vec![("1".to_string(), json!(10.0)), ("9".to_string(), json!(1.0))],
            )
            .await
            .unwrap();
        assert_eq!(result, BulkWriteResult { requested: 2, matched: 1 });
        assert_eq!(
            store.count(&name("GPU"), &Filter::exists("extendedValue")).await.unwrap(),
            1
        );

        assert_eq!(store.unset_field(&name("GPU"), "extendedValue").await.unwrap(), 1);
        assert_eq!(
            store.count(&name("GPU"), &Filter::exists("extendedValue")).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_drop_collection() {
        let store = MemoryStore::with_collections([("items", vec![doc(json!({}))])]);
        assert!(store.drop_collection(&name("items")).await.unwrap());
        assert!(!store.drop_collection(&name("items")).await.unwrap());
        assert!(store.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_native_sampling() {
        let store = MemoryStore::new();
        assert!(!store.supports_native_sampling());
        let sampled = store.sample(&name("CPU"), &Filter::All, 3).await.unwrap();
        assert!(sampled.is_none());
    }

    #[tokio::test]
    async fn test_persisted_store_round_trips_through_snapshots() {
        let dir = TempDir::new().unwrap();
        let config = MemoryConfig {
            data_dir: Some(dir.path().to_string_lossy().into_owned()),
            persist: true,
        };

        let store = MemoryStore::open(&config).await.unwrap();
        store
            .insert_many(&name("Storage"), vec![doc(json!({"itemId": "S1", "quantity": 2}))])
            .await
            .unwrap();
        drop(store);

        let reopened = MemoryStore::open(&config).await.unwrap();
        assert_eq!(reopened.list_collections().await.unwrap(), vec!["Storage"]);
        let docs = reopened.find(&name("Storage"), &Filter::All).await.unwrap();
        assert_eq!(docs[0].text("itemId").as_deref(), Some("S1"));
    }
}
