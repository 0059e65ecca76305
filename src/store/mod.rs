//! Persisted vector store
//!
//! Named collections of (text, vector, metadata) records kept as one JSON
//! file per collection under a configurable directory. Records are
//! append-only within a run; search is exhaustive cosine similarity, which
//! is plenty for a single document's worth of chunks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{RagError, Result};
use crate::types::{Chunk, Metadata, ScoredChunk};

/// What to do when opening a collection name that already exists on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Discard the existing records and start fresh (the default)
    Overwrite,
    /// Keep the existing records and append new ones
    Append,
    /// Refuse to touch the existing collection
    Fail,
}

impl FromStr for OverwritePolicy {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "overwrite" => Ok(Self::Overwrite),
            "append" => Ok(Self::Append),
            "fail" => Ok(Self::Fail),
            other => Err(RagError::Config(format!(
                "unknown overwrite policy '{}' (expected overwrite, append, or fail)",
                other
            ))),
        }
    }
}

/// One persisted chunk with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

/// On-disk layout of a collection file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionFile {
    name: String,
    dimension: usize,
    created_at: DateTime<Utc>,
    records: Vec<EmbeddingRecord>,
}

/// Directory of named collections
#[derive(Debug)]
pub struct VectorStore {
    dir: PathBuf,
}

impl VectorStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Whether a collection file exists under this store
    pub fn collection_exists(&self, name: &str) -> bool {
        self.collection_path(name).exists()
    }

    /// Open a collection for building, honoring the overwrite policy
    ///
    /// The policy decides what a pre-existing collection file means:
    /// `Overwrite` starts fresh, `Append` loads the existing records, and
    /// `Fail` returns [`RagError::CollectionExists`].
    pub fn open_collection(&self, name: &str, policy: OverwritePolicy) -> Result<Collection> {
        let path = self.collection_path(name);

        if path.exists() {
            match policy {
                OverwritePolicy::Overwrite => {}
                OverwritePolicy::Append => return self.load_collection(name),
                OverwritePolicy::Fail => {
                    return Err(RagError::CollectionExists(name.to_string()))
                }
            }
        }

        Ok(Collection {
            path,
            data: CollectionFile {
                name: name.to_string(),
                dimension: 0,
                created_at: Utc::now(),
                records: Vec::new(),
            },
        })
    }

    /// Load an existing collection for querying
    pub fn load_collection(&self, name: &str) -> Result<Collection> {
        let path = self.collection_path(name);
        if !path.exists() {
            return Err(RagError::NotFound { path });
        }
        let contents = fs::read_to_string(&path)?;
        let data: CollectionFile = serde_json::from_str(&contents)?;
        Ok(Collection { path, data })
    }
}

/// An open collection, in memory until persisted
#[derive(Debug)]
pub struct Collection {
    path: PathBuf,
    data: CollectionFile,
}

impl Collection {
    /// Collection name
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.data.records.len()
    }

    /// True when no records are stored
    pub fn is_empty(&self) -> bool {
        self.data.records.is_empty()
    }

    /// Embedding dimension, fixed by the first appended record
    pub fn dimension(&self) -> usize {
        self.data.dimension
    }

    /// Append a record, enforcing a consistent embedding dimension
    pub fn append(&mut self, record: EmbeddingRecord) -> Result<()> {
        if self.data.records.is_empty() {
            self.data.dimension = record.vector.len();
        } else if record.vector.len() != self.data.dimension {
            return Err(RagError::Generic(format!(
                "embedding dimension mismatch in collection '{}': expected {}, got {}",
                self.data.name,
                self.data.dimension,
                record.vector.len()
            )));
        }
        self.data.records.push(record);
        Ok(())
    }

    /// Write the collection to its file
    pub fn persist(&self) -> Result<()> {
        let contents = serde_json::to_string(&self.data)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Top-`k` records by descending cosine similarity to `vector`
    ///
    /// Ties keep insertion order (the sort is stable over the record list).
    /// An empty collection returns an empty result, never an error.
    pub fn search(&self, vector: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .data
            .records
            .iter()
            .map(|record| ScoredChunk {
                chunk: Chunk {
                    id: record.id.clone(),
                    text: record.text.clone(),
                    metadata: record.metadata.clone(),
                },
                score: cosine_similarity(&record.vector, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity between two vectors, 0.0 when either has zero magnitude
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, text: &str, vector: Vec<f32>) -> EmbeddingRecord {
        EmbeddingRecord {
            id: id.to_string(),
            text: text.to_string(),
            vector,
            metadata: Metadata::new(),
        }
    }

    fn test_store() -> (VectorStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::new(dir.path().join("db")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_empty_collection_search_returns_empty() {
        let (store, _dir) = test_store();
        let collection = store
            .open_collection("local_rag", OverwritePolicy::Overwrite)
            .unwrap();
        let results = collection.search(&[1.0, 0.0], 5);
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let (store, _dir) = test_store();
        let mut collection = store
            .open_collection("local_rag", OverwritePolicy::Overwrite)
            .unwrap();
        collection.append(record("a", "off axis", vec![0.0, 1.0])).unwrap();
        collection.append(record("b", "aligned", vec![1.0, 0.0])).unwrap();
        collection.append(record("c", "diagonal", vec![1.0, 1.0])).unwrap();

        let results = collection.search(&[1.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "b");
        assert_eq!(results[1].chunk.id, "c");
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let (store, _dir) = test_store();
        let mut collection = store
            .open_collection("local_rag", OverwritePolicy::Overwrite)
            .unwrap();
        collection.append(record("first", "same", vec![1.0, 0.0])).unwrap();
        collection.append(record("second", "same", vec![1.0, 0.0])).unwrap();

        let results = collection.search(&[1.0, 0.0], 2);
        assert_eq!(results[0].chunk.id, "first");
        assert_eq!(results[1].chunk.id, "second");
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let (store, _dir) = test_store();
        let mut collection = store
            .open_collection("local_rag", OverwritePolicy::Overwrite)
            .unwrap();
        collection.append(record("a", "x", vec![1.0, 0.0])).unwrap();
        let err = collection.append(record("b", "y", vec![1.0])).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn test_persist_and_reload() {
        let (store, _dir) = test_store();
        let mut collection = store
            .open_collection("local_rag", OverwritePolicy::Overwrite)
            .unwrap();
        collection.append(record("a", "hello", vec![0.5, 0.5])).unwrap();
        collection.persist().unwrap();

        let reloaded = store.load_collection("local_rag").unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.dimension(), 2);
        let results = reloaded.search(&[0.5, 0.5], 1);
        assert_eq!(results[0].chunk.text, "hello");
    }

    #[test]
    fn test_overwrite_policy_starts_fresh() {
        let (store, _dir) = test_store();
        let mut collection = store
            .open_collection("local_rag", OverwritePolicy::Overwrite)
            .unwrap();
        collection.append(record("a", "old", vec![1.0])).unwrap();
        collection.persist().unwrap();

        let fresh = store
            .open_collection("local_rag", OverwritePolicy::Overwrite)
            .unwrap();
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_append_policy_keeps_records() {
        let (store, _dir) = test_store();
        let mut collection = store
            .open_collection("local_rag", OverwritePolicy::Overwrite)
            .unwrap();
        collection.append(record("a", "old", vec![1.0])).unwrap();
        collection.persist().unwrap();

        let existing = store
            .open_collection("local_rag", OverwritePolicy::Append)
            .unwrap();
        assert_eq!(existing.len(), 1);
    }

    #[test]
    fn test_fail_policy_errors_on_existing() {
        let (store, _dir) = test_store();
        let collection = store
            .open_collection("local_rag", OverwritePolicy::Fail)
            .unwrap();
        collection.persist().unwrap();

        let err = store
            .open_collection("local_rag", OverwritePolicy::Fail)
            .unwrap_err();
        assert!(matches!(err, RagError::CollectionExists(_)));
    }

    #[test]
    fn test_load_missing_collection_is_not_found() {
        let (store, _dir) = test_store();
        let err = store.load_collection("absent").unwrap_err();
        assert!(matches!(err, RagError::NotFound { .. }));
    }

    #[test]
    fn test_overwrite_policy_from_str() {
        assert_eq!(
            "append".parse::<OverwritePolicy>().unwrap(),
            OverwritePolicy::Append
        );
        assert!("truncate".parse::<OverwritePolicy>().is_err());
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
