//! Multi-query retriever
//!
//! Expands the user question into several paraphrased variants through the
//! language model, retrieves top-k chunks for each variant, and merges the
//! results deduplicated by chunk id in first-seen order. The paraphrase
//! parser is a pure function that tolerates under-producing models.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ollama::{Embedder, Generator};
use crate::store::Collection;
use crate::types::Chunk;

/// Retrieval parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetrieverParams {
    /// Number of paraphrased query variants to ask the model for
    pub variants: usize,
    /// Chunks retrieved per query
    pub top_k: usize,
}

impl Default for RetrieverParams {
    fn default() -> Self {
        Self {
            variants: 5,
            top_k: 5,
        }
    }
}

/// Outcome of one retrieval pass
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Deduplicated chunks in first-seen order across all queries
    pub chunks: Vec<Chunk>,
    /// The queries that were actually searched, original question first
    pub queries: Vec<String>,
}

/// Expands a question into variants and merges per-variant search results
pub struct MultiQueryRetriever {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    params: RetrieverParams,
}

impl MultiQueryRetriever {
    /// Create a retriever over the given service handles
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        params: RetrieverParams,
    ) -> Self {
        Self {
            embedder,
            generator,
            params,
        }
    }

    /// Current parameters
    pub fn params(&self) -> RetrieverParams {
        self.params
    }

    /// Retrieve chunks for a question from the collection
    ///
    /// The original question is always searched first, then each parsed
    /// paraphrase. A model that produces fewer variants than requested is
    /// tolerated; whatever parsed is used.
    pub async fn retrieve(&self, collection: &Collection, question: &str) -> Result<Retrieval> {
        let raw = self
            .generator
            .generate(&expansion_prompt(question, self.params.variants))
            .await?;

        let mut queries = vec![question.to_string()];
        queries.extend(parse_variants(&raw, self.params.variants));

        let mut seen: HashSet<String> = HashSet::new();
        let mut chunks = Vec::new();

        for query in &queries {
            let vector = self.embedder.embed(query).await?;
            for result in collection.search(&vector, self.params.top_k) {
                if seen.insert(result.chunk.id.clone()) {
                    chunks.push(result.chunk);
                }
            }
        }

        Ok(Retrieval { chunks, queries })
    }
}

/// Fixed prompt instructing the model to paraphrase the question
pub fn expansion_prompt(question: &str, n: usize) -> String {
    format!(
        "You are an AI assistant. Generate {} different versions of the \
         following user question to retrieve relevant documents from a \
         vector database. Provide each version on its own line, with no \
         numbering or commentary.\nOriginal question: {}",
        n, question
    )
}

/// Parse raw model output into at most `expected` query strings
///
/// Strips list markers and blank lines; anything beyond `expected` is
/// dropped. Returns fewer entries (possibly none) when the model
/// under-produces — the caller proceeds with what parsed.
pub fn parse_variants(raw: &str, expected: usize) -> Vec<String> {
    raw.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .take(expected)
        .map(str::to_string)
        .collect()
}

/// Remove a leading bullet or "1." / "1)" style numbering from a line
fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim();
    let trimmed = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .unwrap_or(trimmed);

    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_lines() {
        let raw = "How does it work?\nWhat is the mechanism?\n";
        let variants = parse_variants(raw, 5);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0], "How does it work?");
    }

    #[test]
    fn test_parse_strips_numbering() {
        let raw = "1. First version?\n2) Second version?\n- Third version?\n* Fourth?";
        let variants = parse_variants(raw, 5);
        assert_eq!(
            variants,
            vec![
                "First version?",
                "Second version?",
                "Third version?",
                "Fourth?"
            ]
        );
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let raw = "\n\nOnly one?\n\n";
        let variants = parse_variants(raw, 5);
        assert_eq!(variants, vec!["Only one?"]);
    }

    #[test]
    fn test_parse_caps_at_expected() {
        let raw = "a\nb\nc\nd\ne\nf\ng";
        let variants = parse_variants(raw, 3);
        assert_eq!(variants.len(), 3);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_variants("", 5).is_empty());
        assert!(parse_variants("\n \n", 5).is_empty());
    }

    #[test]
    fn test_expansion_prompt_mentions_question_and_count() {
        let prompt = expansion_prompt("What is adapter tuning?", 5);
        assert!(prompt.contains("What is adapter tuning?"));
        assert!(prompt.contains("5 different versions"));
    }

    #[test]
    fn test_strip_marker_leaves_plain_text() {
        assert_eq!(strip_list_marker("  plain question  "), "plain question");
        assert_eq!(strip_list_marker("42 is the answer?"), "42 is the answer?");
    }
}
