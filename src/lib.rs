//! localrag - question answering over a local PDF via Ollama
//!
//! A retrieval-augmented generation pipeline: load a PDF, split it into
//! bounded overlapping chunks, embed the chunks into a persisted vector
//! collection, and answer questions by multi-query retrieval plus a fixed
//! RAG prompt sent to a local Ollama model.
//!
//! # Architecture
//!
//! - [`loader`] — PDF → page segments
//! - [`chunker`] — segments → bounded overlapping chunks
//! - [`store`] — persisted collections with cosine search
//! - [`retriever`] — multi-query expansion and deduplicated retrieval
//! - [`answer`] — fixed RAG prompt and answer generation
//! - [`pipeline`] — the linear build/ask flow tying it together

pub mod errors;
pub mod types;

// Re-export commonly used types
pub use errors::{RagError, Result};

pub mod answer;
pub mod chunker;
pub mod cli;
pub mod config;
pub mod loader;
pub mod ollama;
pub mod pipeline;
pub mod retriever;
pub mod store;
