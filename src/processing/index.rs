//! In-memory vector index over reference document chunks

use crate::error::{Result, RetentionError};
use crate::processing::document::DocumentChunk;
use crate::processing::embeddings::{cosine_similarity, Embedder};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Chunks and their embeddings; built once, read-only afterwards
pub struct DocumentIndex {
    chunks: Vec<DocumentChunk>,
    vectors: Vec<Vec<f32>>,
    embedder: Arc<dyn Embedder>,
}

impl DocumentIndex {
    pub fn build(chunks: Vec<DocumentChunk>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let start_time = Instant::now();
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = embedder.embed(&texts)?;

        if vectors.len() != chunks.len() {
            return Err(RetentionError::Embedding(format!(
                "embedded {} of {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        info!(
            "Indexed {} chunks with {} in {:.2?}",
            chunks.len(),
            embedder.model_name(),
            start_time.elapsed()
        );

        Ok(Self {
            chunks,
            vectors,
            embedder,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top `k` chunks by cosine similarity; equal scores keep index order
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query_vector = self.embedder.embed_one(query)?;

        let mut scored = Vec::with_capacity(self.chunks.len());
        for (chunk, vector) in self.chunks.iter().zip(&self.vectors) {
            scored.push(ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(&query_vector, vector)?,
            });
        }

        // Stable sort keeps insertion order among ties
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        debug!(
            "Retrieved {} chunks (best score {:.3})",
            scored.len(),
            scored.first().map(|s| s.score).unwrap_or(0.0)
        );
        Ok(scored)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Bag-of-words embedder over a fixed vocabulary
    pub(crate) struct KeywordEmbedder {
        pub vocabulary: Vec<&'static str>,
    }

    impl Embedder for KeywordEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lower = text.to_lowercase();
                    self.vocabulary
                        .iter()
                        .map(|word| lower.matches(word).count() as f32)
                        .collect()
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "keyword-test"
        }
    }

    fn chunk(id: usize, content: &str) -> DocumentChunk {
        DocumentChunk {
            content: content.to_string(),
            source: "test.txt".to_string(),
            chunk_id: id,
        }
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let embedder = Arc::new(KeywordEmbedder {
            vocabulary: vec!["salary", "benefit", "survey"],
        });
        let index = DocumentIndex::build(
            vec![
                chunk(0, "Benefit catalogue: fitness, lunch card."),
                chunk(1, "Salary benchmarks for sales salary bands."),
                chunk(2, "Survey methodology."),
            ],
            embedder,
        )
        .unwrap();

        let hits = index.search("How does salary compare?", 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.chunk_id, 1);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let embedder = Arc::new(KeywordEmbedder { vocabulary: vec!["x"] });
        let index = DocumentIndex::build(vec![chunk(0, "x"), chunk(1, "x"), chunk(2, "x")], embedder).unwrap();
        let ids: Vec<usize> = index.search("x", 3).unwrap().iter().map(|h| h.chunk.chunk_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
