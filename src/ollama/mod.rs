//! Ollama service clients and the capability traits the pipeline depends on
//!
//! The pipeline never talks to reqwest directly; it goes through the
//! [`Embedder`] and [`Generator`] traits so tests can substitute
//! deterministic fakes for the external services.

pub mod client;

pub use client::OllamaClient;

use async_trait::async_trait;

use crate::errors::Result;

/// Turns text into a fixed-dimension embedding vector
///
/// A failed call must surface as [`crate::errors::RagError::EmbeddingService`],
/// never as a zero vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Generates text from a prompt via a language model
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
