//! Collection dumps as JSON files
//!
//! Every collection is written to `<dir>/<prefix>_<collection>.json`,
//! optionally reduced to a fixed set of keys.

use super::checksum::{calculate_checksum_bytes, write_sidecar};
use crate::adapters::store::RecordStore;
use crate::core::query::Filter;
use crate::domain::{AuditError, CollectionName, Document, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Named key sets for reduced dumps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPreset {
    /// Identity, quantity and valuation fields
    Core,
    /// Identity and descriptive fields
    Meta,
}

impl KeyPreset {
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            KeyPreset::Core => &[
                "_id",
                "itemId",
                "ItemID",
                "quantity",
                "unitPrice",
                "extendedValue",
                "auditDate",
            ],
            KeyPreset::Meta => &["_id", "description", "desc", "category", "supplier"],
        }
    }
}

impl FromStr for KeyPreset {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "core" => Ok(KeyPreset::Core),
            "meta" => Ok(KeyPreset::Meta),
            other => Err(AuditError::InvalidInput(format!(
                "unknown key preset '{other}', expected core or meta"
            ))),
        }
    }
}

impl fmt::Display for KeyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPreset::Core => f.write_str("core"),
            KeyPreset::Meta => f.write_str("meta"),
        }
    }
}

/// Which keys each dumped document keeps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeySelection {
    #[default]
    All,
    Keys(Vec<String>),
}

impl KeySelection {
    pub fn preset(preset: KeyPreset) -> Self {
        KeySelection::Keys(preset.keys().iter().map(|k| k.to_string()).collect())
    }

    /// Applies the selection to a document
    pub fn apply(&self, mut doc: Document) -> Document {
        if let KeySelection::Keys(keys) = self {
            doc.retain_keys(keys);
        }
        doc
    }
}

/// One written dump file
#[derive(Debug, Clone, PartialEq)]
pub struct DumpedFile {
    pub collection: String,
    pub path: PathBuf,
    pub documents: usize,
    pub sha256: String,
}

/// Writes collections to JSON files
pub struct CollectionDumper {
    store: Arc<dyn RecordStore>,
    pretty: bool,
    write_checksum: bool,
}

impl CollectionDumper {
    pub fn new(store: Arc<dyn RecordStore>, pretty: bool, write_checksum: bool) -> Self {
        Self {
            store,
            pretty,
            write_checksum,
        }
    }

    /// Dumps the given collections, or every collection when `collections`
    /// is empty
    ///
    /// # Errors
    ///
    /// Fails on the first read or write error; files already written stay.
    pub async fn dump(
        &self,
        dir: &Path,
        prefix: &str,
        collections: &[CollectionName],
        selection: &KeySelection,
    ) -> Result<Vec<DumpedFile>> {
        let targets = if collections.is_empty() {
            self.store
                .list_collections()
                .await?
                .into_iter()
                .map(|name| CollectionName::new(name).map_err(AuditError::Validation))
                .collect::<Result<Vec<_>>>()?
        } else {
            collections.to_vec()
        };

        tokio::fs::create_dir_all(dir).await?;

        let mut written = Vec::with_capacity(targets.len());
        for collection in &targets {
            let docs: Vec<Document> = self
                .store
                .find(collection, &Filter::All)
                .await?
                .into_iter()
                .map(|d| selection.apply(d))
                .collect();

            let data = if self.pretty {
                serde_json::to_vec_pretty(&docs)?
            } else {
                serde_json::to_vec(&docs)?
            };
            let path = dir.join(format!("{prefix}_{collection}.json"));
            tokio::fs::write(&path, &data).await?;

            let sha256 = calculate_checksum_bytes(&data);
            if self.write_checksum {
                write_sidecar(&path, &sha256).await?;
            }

            tracing::info!(
                collection = %collection,
                documents = docs.len(),
                path = %path.display(),
                "Collection dumped"
            );
            written.push(DumpedFile {
                collection: collection.to_string(),
                path,
                documents: docs.len(),
                sha256,
            });
        }

        Ok(written)
    }
}
