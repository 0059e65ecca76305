//! Command-line argument parsing for localrag
//!
//! Flags override the config file per invocation; anything left unset
//! falls back to `~/.localrag/config.toml`.

use clap::Parser;
use std::path::PathBuf;

use crate::chunker::ChunkParams;
use crate::config::Config;
use crate::errors::Result;
use crate::pipeline::PipelineConfig;
use crate::retriever::RetrieverParams;

/// localrag - ask questions about a local PDF through Ollama
#[derive(Parser, Debug)]
#[command(name = "localrag")]
#[command(version)]
#[command(about = "Index a PDF into a local vector store and answer questions about it", long_about = None)]
pub struct Args {
    /// Path to the PDF document
    #[arg(value_name = "PDF")]
    pub pdf: PathBuf,

    /// Question to answer (interactive prompt when omitted)
    #[arg(short = 'Q', long)]
    pub question: Option<String>,

    /// Ollama model for answer generation and query expansion
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama model for embeddings
    #[arg(long)]
    pub embed_model: Option<String>,

    /// Ollama host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Ollama port
    #[arg(long, default_value_t = 11434)]
    pub port: u16,

    /// Collection name in the vector store
    #[arg(short, long)]
    pub collection: Option<String>,

    /// Directory for persisted collections
    #[arg(long)]
    pub db_dir: Option<PathBuf>,

    /// Maximum characters per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Chunks retrieved per query variant
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Paraphrased query variants requested from the model
    #[arg(long)]
    pub variants: Option<usize>,

    /// What to do when the collection already exists: overwrite, append, fail
    #[arg(long)]
    pub on_existing: Option<String>,

    /// Reuse the persisted collection instead of rebuilding the index
    #[arg(long)]
    pub reuse_index: bool,

    /// Suppress status output (the answer is still printed)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Model for generation, flag over config file
    pub fn generate_model(&self, config: &Config) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| config.models.generate.clone())
    }

    /// Model for embeddings, flag over config file
    pub fn embed_model(&self, config: &Config) -> String {
        self.embed_model
            .clone()
            .unwrap_or_else(|| config.models.embed.clone())
    }

    /// Store directory, flag over config file
    pub fn db_dir(&self, config: &Config) -> PathBuf {
        self.db_dir.clone().unwrap_or_else(|| config.store.dir.clone())
    }

    /// Merge flags and config file into the pipeline configuration
    pub fn pipeline_config(&self, config: &Config) -> Result<PipelineConfig> {
        let policy = self
            .on_existing
            .as_deref()
            .unwrap_or(&config.store.overwrite_policy)
            .parse()?;

        Ok(PipelineConfig {
            chunking: ChunkParams {
                chunk_size: self.chunk_size.unwrap_or(config.chunking.chunk_size),
                overlap: self.overlap.unwrap_or(config.chunking.overlap),
            },
            retrieval: RetrieverParams {
                top_k: self.top_k.unwrap_or(config.retrieval.top_k),
                variants: self.variants.unwrap_or(config.retrieval.variants),
            },
            collection: self
                .collection
                .clone()
                .unwrap_or_else(|| config.store.collection.clone()),
            overwrite_policy: policy,
        })
    }
}
