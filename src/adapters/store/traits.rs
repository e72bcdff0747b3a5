//! Record store abstraction
//!
//! This module defines the trait that record store backends must implement
//! to work with Stockaudit.

use crate::core::query::{executor, Filter, Pipeline};
use crate::domain::{CollectionName, Document, Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of a batched write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkWriteResult {
    /// Number of updates submitted
    pub requested: usize,

    /// Number of documents the store reported as matched
    pub matched: u64,
}

/// Document store holding named collections of JSON objects
///
/// Reads against a collection that does not exist behave as reads against an
/// empty collection. Every call is a single round-trip and none is retried.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name for logs and reports
    fn backend_name(&self) -> &'static str;

    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Names of all collections, sorted
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Number of documents matching `filter`
    async fn count(&self, collection: &CollectionName, filter: &Filter) -> Result<u64>;

    /// Documents matching `filter`, in the store's natural order
    async fn find(&self, collection: &CollectionName, filter: &Filter) -> Result<Vec<Document>>;

    /// Sets `field` on each document identified by `_id`, as one batched write
    ///
    /// # Arguments
    ///
    /// * `collection` - Target collection
    /// * `field` - Top-level field to set
    /// * `updates` - `(document id, new value)` pairs
    async fn bulk_set(
        &self,
        collection: &CollectionName,
        field: &str,
        updates: Vec<(String, Value)>,
    ) -> Result<BulkWriteResult>;

    /// Removes `field` from every document of the collection
    ///
    /// # Returns
    ///
    /// Number of documents that held the field.
    async fn unset_field(&self, collection: &CollectionName, field: &str) -> Result<u64>;

    /// Inserts documents as one batch, assigning `_id` where absent
    async fn insert_many(&self, collection: &CollectionName, documents: Vec<Document>)
        -> Result<u64>;

    /// Drops a collection
    ///
    /// # Returns
    ///
    /// `true` if the collection existed.
    async fn drop_collection(&self, collection: &CollectionName) -> Result<bool>;

    /// Runs a multi-stage pipeline over `collection`
    ///
    /// The default implementation loads the source and every joined
    /// collection, then runs the in-memory executor. Backends with native
    /// pipeline support override it.
    async fn aggregate(
        &self,
        collection: &CollectionName,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>> {
        let source = self.find(collection, &Filter::All).await?;
        let mut foreign = BTreeMap::new();
        for name in pipeline.joined_collections() {
            let joined = CollectionName::new(name).map_err(StoreError::PipelineFailed)?;
            let docs = self.find(&joined, &Filter::All).await?;
            foreign.insert(joined.into_inner(), docs);
        }
        Ok(executor::execute(pipeline, source, &foreign)?)
    }

    /// Whether [`RecordStore::sample`] draws at the source
    fn supports_native_sampling(&self) -> bool {
        false
    }

    /// Uniform random sample of at most `k` matching documents drawn by the store
    ///
    /// # Returns
    ///
    /// `None` when the backend has no native sampling operator; callers then
    /// sample client-side.
    async fn sample(
        &self,
        _collection: &CollectionName,
        _filter: &Filter,
        _k: usize,
    ) -> Result<Option<Vec<Document>>> {
        Ok(None)
    }
}
