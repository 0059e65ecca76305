//! Core data types shared across pipeline stages

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata attached to segments, chunks, and records
pub type Metadata = HashMap<String, Value>;

/// A unit of extracted text with positional metadata
///
/// Produced by the document loader, one or more per page.
/// Metadata always carries a 1-based `page` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub metadata: Metadata,
}

impl Segment {
    /// Create a segment for a given page of the source document
    pub fn new(text: impl Into<String>, page: usize) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert("page".to_string(), Value::from(page));
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Page number this segment came from, if recorded
    pub fn page(&self) -> Option<u64> {
        self.metadata.get("page").and_then(|v| v.as_u64())
    }
}

/// A bounded slice of a segment, ready for embedding
///
/// The id encodes chunk identity (`p{page}_c{index}`) and is what retrieval
/// deduplicates on. Metadata is inherited from the source segment plus a
/// `chunk_index` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
}

/// A chunk paired with its similarity score from a store query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
