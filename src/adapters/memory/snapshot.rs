//! JSON snapshot files backing the memory store
//!
//! One file per collection, `<dir>/<collection>.json`. A file holds either a
//! JSON array of objects or newline-delimited objects (as produced by
//! `mongoexport`).

use crate::domain::{Document, Result, StoreError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory of collection snapshot files
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }

    /// Loads every `*.json` file in the directory
    ///
    /// A missing directory yields no collections.
    pub async fn load_all(&self) -> Result<BTreeMap<String, Vec<Document>>> {
        let mut collections = BTreeMap::new();
        if !tokio::fs::try_exists(&self.root).await? {
            tracing::warn!(dir = %self.root.display(), "Snapshot directory does not exist, starting empty");
            return Ok(collections);
        }

        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = tokio::fs::read_to_string(&path).await?;
            let docs = parse_snapshot(&text).map_err(|e| {
                StoreError::InvalidDocument(format!("{}: {e}", path.display()))
            })?;
            tracing::debug!(collection = name, documents = docs.len(), "Loaded snapshot");
            collections.insert(name.to_string(), docs);
        }
        Ok(collections)
    }

    /// Writes one collection, replacing any previous snapshot
    pub async fn write(&self, collection: &str, docs: &[Document]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let body = serde_json::to_vec_pretty(docs)?;
        tokio::fs::write(self.file_for(collection), body).await?;
        Ok(())
    }

    /// Removes a collection's snapshot if present
    pub async fn remove(&self, collection: &str) -> Result<()> {
        let path = self.file_for(collection);
        if tokio::fs::try_exists(&path).await? {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }
}

/// Parses a JSON array or newline-delimited JSON objects
pub fn parse_snapshot(text: &str) -> std::result::Result<Vec<Document>, String> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(trimmed).map_err(|e| e.to_string())?;
        return values
            .into_iter()
            .map(|v| Document::from_value(v).map_err(|e| e.to_string()))
            .collect();
    }
    trimmed
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            let value: serde_json::Value =
                serde_json::from_str(line).map_err(|e| format!("line {}: {e}", n + 1))?;
            Document::from_value(value).map_err(|e| format!("line {}: {e}", n + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_array() {
        let docs = parse_snapshot(r#"[{"itemId": "A"}, {"itemId": "B"}]"#).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_parse_ndjson() {
        let docs = parse_snapshot("{\"itemId\": \"A\"}\n\n{\"itemId\": \"B\"}\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(parse_snapshot("[1, 2]").is_err());
        assert!(parse_snapshot("{\"a\": 1}\nnot json").unwrap_err().contains("line 2"));
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = TempDir::new().unwrap();
        let snapshots = SnapshotDir::new(dir.path());
        let docs = vec![Document::new().with("itemId", "A")];
        snapshots.write("CPU", &docs).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loaded = snapshots.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["CPU"], docs);

        snapshots.remove("CPU").await.unwrap();
        assert!(snapshots.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let snapshots = SnapshotDir::new(dir.path().join("absent"));
        assert!(snapshots.load_all().await.unwrap().is_empty());
    }
}
