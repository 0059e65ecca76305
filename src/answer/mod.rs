//! Answer generator
//!
//! Renders the fixed RAG prompt from retrieved chunks and the question,
//! sends it to the language model, and returns the response verbatim.
//! No post-processing and no retry.

use std::sync::Arc;

use crate::errors::Result;
use crate::ollama::Generator;
use crate::types::Chunk;

/// Generates the final answer from retrieved context
pub struct AnswerGenerator {
    generator: Arc<dyn Generator>,
}

impl AnswerGenerator {
    /// Create an answer generator over a language model handle
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Answer the question using the retrieved chunks as the only context
    pub async fn answer(&self, chunks: &[Chunk], question: &str) -> Result<String> {
        let prompt = rag_prompt(chunks, question);
        self.generator.generate(&prompt).await
    }
}

/// Fixed RAG prompt: concatenated chunk texts as context, question verbatim
pub fn rag_prompt(chunks: &[Chunk], question: &str) -> String {
    let context = chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Answer the question based ONLY on the following context:\n{}\nQuestion: {}\n",
        context, question
    )
}
