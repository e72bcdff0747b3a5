//! PostgreSQL adapter implementing the record store trait
//!
//! Collections are partitions of one JSONB table. Filters and pipelines are
//! translated to SQL and run in the database, so joins and sampling never
//! pull whole collections across the wire.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{document_from_row, DocumentRow};
use crate::adapters::postgresql::sql;
use crate::adapters::store::{BulkWriteResult, RecordStore};
use crate::core::query::{Filter, Pipeline};
use crate::domain::{CollectionName, Document, Result, StoreError, ID_FIELD};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// PostgreSQL implementation of [`RecordStore`]
pub struct PostgreSQLStore {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLStore {
    /// Create a new PostgreSQL store
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    async fn fetch(&self, query: &str, collection: &CollectionName) -> Result<Vec<Document>> {
        let name = collection.as_str();
        let rows = self.client.query(query, &[&name]).await?;
        rows.iter()
            .map(|row| document_from_row(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl RecordStore for PostgreSQLStore {
    fn backend_name(&self) -> &'static str {
        "postgresql"
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await?;
        self.client.ensure_schema().await
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let rows = self
            .client
            .query(
                "SELECT DISTINCT collection FROM documents ORDER BY collection",
                &[],
            )
            .await?;
        let names = rows
            .iter()
            .map(|row| row.try_get::<_, String>(0))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        Ok(names)
    }

    async fn count(&self, collection: &CollectionName, filter: &Filter) -> Result<u64> {
        let query = sql::count_sql(filter)?;
        let name = collection.as_str();
        let rows = self.client.query(&query, &[&name]).await?;
        let n: i64 = rows
            .first()
            .map(|row| row.try_get(0))
            .transpose()
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?
            .unwrap_or(0);
        Ok(n.max(0) as u64)
    }

    async fn find(&self, collection: &CollectionName, filter: &Filter) -> Result<Vec<Document>> {
        let query = sql::find_sql(filter)?;
        self.fetch(&query, collection).await
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

        let (ids, values): (Vec<String>, Vec<Value>) = updates.into_iter().unzip();
        let name = collection.as_str();
        let matched = self
            .client
            .execute(
                "UPDATE documents d \
                 SET body = jsonb_set(d.body, ARRAY[$2::text], u.value, true) \
                 FROM unnest($3::text[], $4::jsonb[]) AS u(id, value) \
                 WHERE d.collection = $1 AND d.id = u.id",
                &[&name, &field, &ids, &values],
                StoreError::UpdateFailed,
            )
            .await?;

        tracing::debug!(collection = name, field, requested, matched, "Bulk update applied");
        Ok(BulkWriteResult { requested, matched })
    }

    async fn unset_field(&self, collection: &CollectionName, field: &str) -> Result<u64> {
        let name = collection.as_str();
        self.client
            .execute(
                "UPDATE documents SET body = body - $2::text \
                 WHERE collection = $1 AND body ? $2::text",
                &[&name, &field],
                StoreError::UpdateFailed,
            )
            .await
    }

    async fn insert_many(
        &self,
        collection: &CollectionName,
        documents: Vec<Document>,
    ) -> Result<u64> {
        if documents.is_empty() {
            return Ok(0);
        }

        let rows = documents
            .into_iter()
            .map(|mut doc| {
                if doc.id().is_none() {
                    doc.set(
                        ID_FIELD,
                        Value::String(uuid::Uuid::new_v4().simple().to_string()),
                    );
                }
                DocumentRow::from_document(doc)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let (ids, bodies) = DocumentRow::into_columns(rows);
        let name = collection.as_str();

        self.client
            .execute(
                "INSERT INTO documents (collection, id, body) \
                 SELECT $1, u.id, u.body \
                 FROM unnest($2::text[], $3::jsonb[]) WITH ORDINALITY AS u(id, body, ord) \
                 ORDER BY u.ord \
                 ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body",
                &[&name, &ids, &bodies],
                StoreError::InsertFailed,
            )
            .await
    }

    async fn drop_collection(&self, collection: &CollectionName) -> Result<bool> {
        let name = collection.as_str();
        let deleted = self
            .client
            .execute(
                "DELETE FROM documents WHERE collection = $1",
                &[&name],
                StoreError::UpdateFailed,
            )
            .await?;
        Ok(deleted > 0)
    }

    async fn aggregate(
        &self,
        collection: &CollectionName,
        pipeline: &Pipeline,
    ) -> Result<Vec<Document>> {
        let query = sql::pipeline_sql(pipeline)?;
        tracing::trace!(collection = %collection, sql = %query, "Running pipeline");
        self.fetch(&query, collection).await
    }

    fn supports_native_sampling(&self) -> bool {
        true
    }

    async fn sample(
        &self,
        collection: &CollectionName,
        filter: &Filter,
        k: usize,
    ) -> Result<Option<Vec<Document>>> {
        let query = sql::sample_sql(filter)?;
        let name = collection.as_str();
        let limit = i64::try_from(k).unwrap_or(i64::MAX);
        let rows = self.client.query(&query, &[&name, &limit]).await?;
        let docs = rows
            .iter()
            .map(document_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(docs))
    }
}
