//! Error types for the localrag pipeline
//!
//! Every stage failure aborts the pipeline and surfaces here with the
//! failing artifact and underlying cause attached. No stage retries.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the RAG pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Input document does not exist
    #[error("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Input document exists but could not be parsed
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// Invalid chunking or pipeline configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Embedding service transport or model failure
    #[error("embedding service error: {0}")]
    EmbeddingService(String),

    /// Language model service transport or model failure
    #[error("language model service error: {0}")]
    LlmService(String),

    /// Collection already exists and the overwrite policy is `fail`
    #[error("collection '{0}' already exists")]
    CollectionExists(String),

    /// Vector store and config file I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RagError>;

/// Convert anyhow errors to RagError
impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Generic(err.to_string())
    }
}
