//! Retrieval-augmented query service consumed by the recommendation pipeline

use crate::config::Config;
use crate::error::{Result, RetentionError};
use crate::hr::snapshot::EmployeeSnapshot;
use crate::input::manager::{InputManager, SourceDocument};
use crate::llm::client::{ChatCompletion, OpenAiCompatClient};
use crate::llm::prompts::render_context_qa;
use crate::processing::document::SentenceChunker;
use crate::processing::embeddings::{Embedder, Model2VecEmbedder};
use crate::processing::index::DocumentIndex;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// Incrementally delivered answer text; ends on completion or on the first error
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Answers free-text prompts against the reference corpus
#[async_trait]
pub trait DocumentQueryService: Send + Sync {
    async fn query(&self, prompt: &str) -> Result<FragmentStream>;

    /// Fails with `UpstreamUnavailable` when the service cannot answer at all
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }
}

pub struct RetrievalQueryEngine {
    index: DocumentIndex,
    llm: Arc<dyn ChatCompletion>,
    top_k: usize,
}

impl RetrievalQueryEngine {
    pub fn build(
        documents: &[SourceDocument],
        chunker: &SentenceChunker,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn ChatCompletion>,
        top_k: usize,
    ) -> Result<Self> {
        let chunks = chunker.chunk_documents(documents);
        if chunks.is_empty() {
            return Err(RetentionError::UpstreamUnavailable(
                "reference corpus produced no text chunks".to_string(),
            ));
        }

        let index = DocumentIndex::build(chunks, embedder)?;
        info!(
            "Query engine ready: {} chunks from {} documents, model {}",
            index.len(),
            documents.len(),
            llm.model()
        );

        Ok(Self {
            index,
            llm,
            top_k: top_k.max(1),
        })
    }

    /// Load the configured corpus plus `extra_dirs`, embed it and connect the LLM
    pub async fn from_config(config: &Config, extra_dirs: &[PathBuf]) -> Result<Self> {
        let roots = corpus_roots(config, extra_dirs)?;

        let mut input_manager = InputManager::new();
        let documents = input_manager.load_corpus(&roots).await.map_err(|e| match e {
            RetentionError::InvalidInput(msg) => RetentionError::UpstreamUnavailable(msg),
            other => other,
        })?;

        let chunker = SentenceChunker::new(config.retrieval.chunk_size, config.retrieval.chunk_overlap)?;
        let embedder: Arc<dyn Embedder> = Arc::new(Model2VecEmbedder::load(&config.retrieval.embedding_model, 64)?);
        let llm: Arc<dyn ChatCompletion> = Arc::new(OpenAiCompatClient::from_config(config)?);

        Self::build(&documents, &chunker, embedder, llm, config.retrieval.top_k)
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }
}

/// Directories to load the corpus from: the configured documents directory
/// when it exists, followed by `extra_dirs`
pub fn corpus_roots(config: &Config, extra_dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let configured = &config.retrieval.documents_dir;
    let mut roots = Vec::with_capacity(extra_dirs.len() + 1);
    if configured.is_dir() {
        roots.push(configured.clone());
    } else {
        warn!("Skipping missing documents directory: {}", configured.display());
    }

    for dir in extra_dirs {
        if !roots.contains(dir) {
            roots.push(dir.clone());
        }
    }

    if roots.is_empty() {
        return Err(RetentionError::UpstreamUnavailable(format!(
            "no document directory available; create {} or pass --docs",
            configured.display()
        )));
    }
    Ok(roots)
}

#[async_trait]
impl DocumentQueryService for RetrievalQueryEngine {
    async fn query(&self, prompt: &str) -> Result<FragmentStream> {
        let hits = self.index.search(prompt, self.top_k)?;
        let context = hits
            .iter()
            .map(|hit| hit.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        debug!(
            "Query context from: {}",
            hits.iter().map(|h| h.chunk.source.as_str()).collect::<Vec<_>>().join(", ")
        );

        self.llm.stream_completion(&render_context_qa(&context, prompt)).await
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.index.is_empty() {
            return Err(RetentionError::UpstreamUnavailable("document index is empty".to_string()));
        }
        Ok(())
    }
}

/// Snapshots included as context when answering free-form questions
pub const QA_SNAPSHOT_LIMIT: usize = 10;

/// Answers `question` with the first [`QA_SNAPSHOT_LIMIT`] snapshots as context
pub async fn ask_about_snapshots(
    llm: &dyn ChatCompletion,
    snapshots: &[EmployeeSnapshot],
    question: &str,
) -> Result<FragmentStream> {
    if question.trim().is_empty() {
        return Err(RetentionError::InvalidInput("question is empty".to_string()));
    }

    let context = snapshots
        .iter()
        .take(QA_SNAPSHOT_LIMIT)
        .map(EmployeeSnapshot::as_str)
        .collect::<Vec<_>>()
        .join("\n\n");
    llm.stream_completion(&render_context_qa(&context, question)).await
}

/// Drains a fragment stream in arrival order
pub async fn collect_fragments(mut stream: FragmentStream) -> Result<String> {
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment?);
    }
    Ok(text)
}
