//! End-to-end RAG pipeline
//!
//! Linear flow: load → chunk → embed + persist (build phase, once per
//! document), then retrieve → answer (query phase, once per question,
//! reusing the persisted index). Any stage failure aborts the run and
//! propagates to the caller.

use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;

use crate::answer::AnswerGenerator;
use crate::chunker::{ChunkParams, TextChunker};
use crate::errors::{RagError, Result};
use crate::loader::PdfLoader;
use crate::ollama::{Embedder, Generator};
use crate::retriever::{MultiQueryRetriever, RetrieverParams};
use crate::store::{Collection, EmbeddingRecord, OverwritePolicy, VectorStore};
use crate::types::Segment;

/// Pipeline configuration, assembled from config file and CLI flags
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunking: ChunkParams,
    pub retrieval: RetrieverParams,
    pub collection: String,
    pub overwrite_policy: OverwritePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkParams::default(),
            retrieval: RetrieverParams::default(),
            collection: "local_rag".to_string(),
            overwrite_policy: OverwritePolicy::Overwrite,
        }
    }
}

/// What the build phase produced
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub pages: usize,
    pub chunks: usize,
    pub records: usize,
}

/// One answered question
#[derive(Debug, Clone)]
pub struct Answered {
    pub answer: String,
    /// Chunks handed to the model as context
    pub chunks_used: usize,
    /// Queries searched, original question first
    pub queries: Vec<String>,
}

/// The whole pipeline: document index build plus question answering
pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    store: VectorStore,
    config: PipelineConfig,
    collection: Option<Collection>,
}

impl RagPipeline {
    /// Create a pipeline over the given service handles and store directory
    ///
    /// Chunking parameters are validated here so a bad overlap fails before
    /// any document is touched.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        store_dir: impl AsRef<Path>,
        config: PipelineConfig,
    ) -> Result<Self> {
        config.chunking.validate()?;
        let store = VectorStore::new(store_dir)?;
        Ok(Self {
            embedder,
            generator,
            store,
            config,
            collection: None,
        })
    }

    /// Current configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Number of records in the open collection, if any
    pub fn record_count(&self) -> Option<usize> {
        self.collection.as_ref().map(Collection::len)
    }

    /// Build phase: load the document, chunk it, embed every chunk, and
    /// persist the collection
    ///
    /// The overwrite policy decides what a pre-existing collection means.
    /// `progress` ticks once per embedded chunk when given.
    pub async fn build_index(
        &mut self,
        path: impl AsRef<Path>,
        progress: Option<&ProgressBar>,
    ) -> Result<BuildReport> {
        let loader = PdfLoader::new(path);
        let segments = loader.load().await?;
        self.index_segments(&segments, progress).await
    }

    /// Chunk, embed, and persist already-loaded segments
    pub async fn index_segments(
        &mut self,
        segments: &[Segment],
        progress: Option<&ProgressBar>,
    ) -> Result<BuildReport> {
        let pages = segments.len();

        let chunker = TextChunker::new(self.config.chunking)?;
        let chunks = chunker.split(segments);

        let mut collection = self
            .store
            .open_collection(&self.config.collection, self.config.overwrite_policy)?;

        if let Some(pb) = progress {
            pb.set_length(chunks.len() as u64);
        }

        let chunk_count = chunks.len();
        for chunk in chunks {
            let vector = self.embedder.embed(&chunk.text).await?;
            collection.append(EmbeddingRecord {
                id: chunk.id,
                text: chunk.text,
                vector,
                metadata: chunk.metadata,
            })?;
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        collection.persist()?;
        let records = collection.len();
        self.collection = Some(collection);

        Ok(BuildReport {
            pages,
            chunks: chunk_count,
            records,
        })
    }

    /// Open a previously persisted collection instead of rebuilding it
    pub fn load_index(&mut self) -> Result<usize> {
        let collection = self.store.load_collection(&self.config.collection)?;
        let count = collection.len();
        self.collection = Some(collection);
        Ok(count)
    }

    /// Query phase: expand, retrieve, and answer one question
    ///
    /// Requires a built or loaded index; the index is reused across calls.
    pub async fn ask(&self, question: &str) -> Result<Answered> {
        let collection = self.collection.as_ref().ok_or_else(|| {
            RagError::Generic("no index available: build or load a collection first".to_string())
        })?;

        let retriever = MultiQueryRetriever::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.generator),
            self.config.retrieval,
        );
        let retrieval = retriever.retrieve(collection, question).await?;

        let generator = AnswerGenerator::new(Arc::clone(&self.generator));
        let answer = generator.answer(&retrieval.chunks, question).await?;

        Ok(Answered {
            answer,
            chunks_used: retrieval.chunks.len(),
            queries: retrieval.queries,
        })
    }
}
