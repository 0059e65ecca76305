//! Text chunker
//!
//! Splits page segments into bounded, overlapping chunks by a deterministic
//! sliding window over characters. Consecutive chunks from the same segment
//! share exactly `overlap` characters, so concatenating chunk texts (minus
//! the overlaps) reconstructs the segment losslessly.

use serde::{Deserialize, Serialize};

use crate::errors::{RagError, Result};
use crate::types::{Chunk, Segment};

/// Chunking parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkParams {
    /// Maximum characters per chunk
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks, must be < chunk_size
    pub overlap: usize,
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_size: 7500,
            overlap: 100,
        }
    }
}

impl ChunkParams {
    /// Validate the parameter pair
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits segments into fixed-size overlapping chunks
#[derive(Debug, Clone)]
pub struct TextChunker {
    params: ChunkParams,
}

impl TextChunker {
    /// Create a chunker, validating parameters up front
    pub fn new(params: ChunkParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Current parameters
    pub fn params(&self) -> ChunkParams {
        self.params
    }

    /// Split all segments in order
    ///
    /// Chunk ids are `p{page}_c{index}` with the index counted per segment.
    /// Empty segments produce no chunks. Deterministic for identical input
    /// and parameters.
    pub fn split(&self, segments: &[Segment]) -> Vec<Chunk> {
        segments
            .iter()
            .flat_map(|segment| self.split_segment(segment))
            .collect()
    }

    fn split_segment(&self, segment: &Segment) -> Vec<Chunk> {
        if segment.text.is_empty() {
            return Vec::new();
        }

        // Windows are measured in characters so multi-byte text never
        // lands on a broken boundary.
        let chars: Vec<char> = segment.text.chars().collect();
        let step = self.params.chunk_size - self.params.overlap;
        let page = segment.page().unwrap_or(0);

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut index = 0;

        loop {
            let end = (start + self.params.chunk_size).min(chars.len());
            let text: String = chars[start..end].iter().collect();

            let mut metadata = segment.metadata.clone();
            metadata.insert("chunk_index".to_string(), serde_json::Value::from(index));

            chunks.push(Chunk {
                id: format!("p{}_c{}", page, index),
                text,
                metadata,
            });

            if end == chars.len() {
                break;
            }
            start += step;
            index += 1;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(ChunkParams {
            chunk_size,
            overlap,
        })
        .unwrap()
    }

    /// Undo the overlap to rebuild the original segment text
    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(&chunk.text);
            } else {
                out.extend(chunk.text.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_overlap_equal_to_size_is_config_error() {
        let err = TextChunker::new(ChunkParams {
            chunk_size: 100,
            overlap: 100,
        })
        .unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn test_overlap_larger_than_size_is_config_error() {
        let err = TextChunker::new(ChunkParams {
            chunk_size: 50,
            overlap: 80,
        })
        .unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn test_zero_chunk_size_is_config_error() {
        let err = TextChunker::new(ChunkParams {
            chunk_size: 0,
            overlap: 0,
        })
        .unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn test_short_segment_is_single_chunk() {
        let chunker = chunker(7500, 100);
        let segments = vec![Segment::new("a short page", 1)];
        let chunks = chunker.split(&segments);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "p1_c0");
        assert_eq!(chunks[0].text, "a short page");
    }

    #[test]
    fn test_every_chunk_within_bound() {
        let chunker = chunker(10, 3);
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        let chunks = chunker.split(&[Segment::new(text, 1)]);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 10);
        }
    }

    #[test]
    fn test_reconstruction_is_lossless() {
        let chunker = chunker(10, 3);
        let text = "the quick brown fox jumps over the lazy dog";
        let chunks = chunker.split(&[Segment::new(text, 1)]);
        assert_eq!(reconstruct(&chunks, 3), text);
    }

    #[test]
    fn test_reconstruction_multibyte() {
        let chunker = chunker(8, 2);
        let text = "héllö wörld — ünïcödé tèxt ☃ again";
        let chunks = chunker.split(&[Segment::new(text, 2)]);
        assert_eq!(reconstruct(&chunks, 2), text);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 8);
        }
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let chunker = chunker(12, 4);
        let segments = vec![
            Segment::new("first page with enough text to split", 1),
            Segment::new("second page, also long enough to split", 2),
        ];
        let a = chunker.split(&segments);
        let b = chunker.split(&segments);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_segment_produces_no_chunks() {
        let chunker = chunker(100, 10);
        let chunks = chunker.split(&[Segment::new("", 1)]);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_ids_and_metadata_per_page() {
        let chunker = chunker(10, 2);
        let segments = vec![
            Segment::new("short", 1),
            Segment::new("a second page long enough for two", 2),
        ];
        let chunks = chunker.split(&segments);
        assert_eq!(chunks[0].id, "p1_c0");
        assert_eq!(chunks[1].id, "p2_c0");
        assert_eq!(chunks[2].id, "p2_c1");
        assert_eq!(chunks[1].metadata.get("page"), Some(&serde_json::json!(2)));
        assert_eq!(
            chunks[2].metadata.get("chunk_index"),
            Some(&serde_json::json!(1))
        );
    }

    #[test]
    fn test_one_chunk_per_short_page() {
        // Pages below the chunk bound map one-to-one onto chunks.
        let chunker = chunker(7500, 100);
        let segments = vec![
            Segment::new("page one text", 1),
            Segment::new("page two text", 2),
            Segment::new("page three text", 3),
        ];
        let chunks = chunker.split(&segments);
        assert_eq!(chunks.len(), 3);
    }
}
