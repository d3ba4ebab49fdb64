//! Reference document chunking

use crate::error::{Result, RetentionError};
use crate::input::manager::SourceDocument;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    /// Display name of the document the chunk was cut from
    pub source: String,
    pub chunk_id: usize,
}

/// Splits documents into overlapping chunks on sentence boundaries.
///
/// Sizes are in characters. A sentence longer than `chunk_size` is split
/// on word boundaries instead.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    overlap: usize,
}

impl SentenceChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size <= overlap {
            return Err(RetentionError::Processing(
                "Chunk size must be greater than overlap".to_string(),
            ));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_documents(&self, documents: &[SourceDocument]) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();
        for doc in documents {
            let source = doc
                .path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| doc.path.display().to_string());

            for content in self.chunk_text(&doc.content) {
                chunks.push(DocumentChunk {
                    content,
                    source: source.clone(),
                    chunk_id: chunks.len(),
                });
            }
        }
        chunks
    }

    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let pieces: Vec<String> = text
            .unicode_sentences()
            .flat_map(|sentence| self.split_long(sentence.trim()))
            .filter(|s| !s.is_empty())
            .collect();

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_len = 0;

        for piece in &pieces {
            let piece_len = piece.chars().count();
            if current_len + piece_len > self.chunk_size && !current.is_empty() {
                chunks.push(current.join(" "));

                // Carry trailing sentences forward while they fit in the overlap
                let mut carried: Vec<&str> = Vec::new();
                let mut carried_len = 0;
                for prev in current.iter().rev() {
                    let len = prev.chars().count() + 1;
                    if carried_len + len > self.overlap {
                        break;
                    }
                    carried.insert(0, prev);
                    carried_len += len;
                }
                current = carried;
                current_len = carried_len;
            }
            current.push(piece);
            current_len += piece_len + 1;
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }
        chunks
    }

    fn split_long(&self, sentence: &str) -> Vec<String> {
        if sentence.chars().count() <= self.chunk_size {
            return vec![sentence.to_string()];
        }

        let mut parts = Vec::new();
        let mut part = String::new();
        for word in sentence.split_word_bounds() {
            if part.chars().count() + word.chars().count() > self.chunk_size && !part.is_empty() {
                parts.push(part.trim().to_string());
                part.clear();
            }
            part.push_str(word);
        }
        if !part.trim().is_empty() {
            parts.push(part.trim().to_string());
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::file_detector::FileType;
    use std::path::PathBuf;

    #[test]
    fn test_rejects_overlap_not_smaller_than_chunk() {
        assert!(SentenceChunker::new(100, 100).is_err());
        assert!(SentenceChunker::new(100, 20).is_ok());
    }

    #[test]
    fn test_chunks_respect_sentence_boundaries() {
        let chunker = SentenceChunker::new(60, 0).unwrap();
        let text = "Sales attrition rose to 18% in 2024. Remote roles churn less. Benchmarks favour variable pay.";
        let chunks = chunker.chunk_text(text);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.ends_with('.'), "chunk split mid-sentence: {:?}", chunk);
        }
    }

    #[test]
    fn test_overlap_carries_previous_sentence() {
        let chunker = SentenceChunker::new(50, 30).unwrap();
        let text = "First short one. Second short one. Third short one. Fourth short one.";
        let chunks = chunker.chunk_text(text);
        assert!(chunks.len() >= 2);
        let tail_of_first = chunks[0].rsplit(". ").next().unwrap().trim_end_matches('.');
        assert!(chunks[1].contains(tail_of_first));
    }

    #[test]
    fn test_long_sentence_is_split_on_words() {
        let chunker = SentenceChunker::new(20, 0).unwrap();
        let text = "word ".repeat(30);
        let chunks = chunker.chunk_text(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 21));
    }

    #[test]
    fn test_chunk_ids_are_global() {
        let chunker = SentenceChunker::new(40, 0).unwrap();
        let docs = vec![
            SourceDocument {
                path: PathBuf::from("a/trends.txt"),
                file_type: FileType::Text,
                content: "One sentence here. Another sentence there.".to_string(),
            },
            SourceDocument {
                path: PathBuf::from("b/benefits.md"),
                file_type: FileType::Markdown,
                content: "Fitness stipend.".to_string(),
            },
        ];
        let chunks = chunker.chunk_documents(&docs);
        let ids: Vec<usize> = chunks.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, (0..chunks.len()).collect::<Vec<_>>());
        assert_eq!(chunks.last().unwrap().source, "benefits.md");
    }
}
