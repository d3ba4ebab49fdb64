//! Reference corpus loading and retrieval over real files

use async_trait::async_trait;
use futures::{stream, StreamExt};
use retention_advisor::config::Config;
use retention_advisor::error::{Result, RetentionError};
use retention_advisor::input::file_detector::FileType;
use retention_advisor::input::manager::InputManager;
use retention_advisor::llm::client::ChatCompletion;
use retention_advisor::llm::query::{
    collect_fragments, corpus_roots, DocumentQueryService, FragmentStream, RetrievalQueryEngine,
};
use retention_advisor::processing::document::SentenceChunker;
use retention_advisor::processing::embeddings::Embedder;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

struct TermEmbedder;

const TERMS: [&str; 4] = ["salary", "fitness", "lunch", "remote"];

impl Embedder for TermEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                TERMS.iter().map(|term| lower.matches(term).count() as f32).collect()
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "term-counts"
    }
}

#[derive(Default)]
struct CapturingLlm {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatCompletion for CapturingLlm {
    async fn stream_completion(&self, prompt: &str) -> Result<FragmentStream> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(stream::iter(vec![Ok("answer".to_string())]).boxed())
    }

    fn model(&self) -> &str {
        "capturing"
    }
}

fn corpus_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("benefits")).unwrap();
    std::fs::write(
        dir.path().join("trends.txt"),
        "Median salary growth in sales was 3% in 2024. Remote work reduces attrition.",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("benefits").join("catalogue.md"),
        "# Benefits\n\n* **Fitness** stipend of 50 EUR.\n* Lunch card worth 10 EUR per day.\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("logo.png"), [0u8, 1, 2]).unwrap();
    std::fs::write(dir.path().join("empty.txt"), "   \n").unwrap();
    dir
}

#[tokio::test]
async fn test_load_corpus_walks_directories_and_skips_unsupported() {
    let dir = corpus_dir();
    let mut manager = InputManager::new();
    let documents = manager.load_corpus(&[dir.path().to_path_buf()]).await.unwrap();

    let names: Vec<String> = documents
        .iter()
        .map(|d| d.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["catalogue.md", "trends.txt"]);
    assert_eq!(documents[0].file_type, FileType::Markdown);
    assert!(!documents[0].content.contains('#'));
    assert!(documents[0].content.contains("Lunch card"));
}

#[tokio::test]
async fn test_missing_document_directory() {
    let mut manager = InputManager::new();
    let result = manager.load_corpus(&[PathBuf::from("/definitely/not/here")]).await;
    assert!(matches!(result, Err(RetentionError::InvalidInput(_))));
}

#[tokio::test]
async fn test_engine_answers_from_relevant_chunk() {
    let dir = corpus_dir();
    let documents = InputManager::new()
        .load_corpus(&[dir.path().to_path_buf()])
        .await
        .unwrap();

    let chunker = SentenceChunker::new(60, 0).unwrap();
    let llm = Arc::new(CapturingLlm::default());
    let engine = RetrievalQueryEngine::build(&documents, &chunker, Arc::new(TermEmbedder), llm.clone(), 1).unwrap();
    assert!(engine.chunk_count() >= 3);

    let answer = collect_fragments(engine.query("Is there a fitness benefit?").await.unwrap())
        .await
        .unwrap();
    assert_eq!(answer, "answer");

    let prompt = llm.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Fitness stipend"));
    assert!(!prompt.contains("Median salary"));
}

#[test]
fn test_empty_corpus_cannot_build_engine() {
    let chunker = SentenceChunker::new(60, 0).unwrap();
    let result = RetrievalQueryEngine::build(
        &[],
        &chunker,
        Arc::new(TermEmbedder),
        Arc::new(CapturingLlm::default()),
        3,
    );
    assert!(matches!(result, Err(RetentionError::UpstreamUnavailable(_))));
}

fn config_with_documents_dir(dir: PathBuf) -> Config {
    let mut config = Config::default();
    config.retrieval.documents_dir = dir;
    config
}

#[tokio::test]
async fn test_docs_flag_used_when_configured_directory_is_missing() {
    let home = tempfile::tempdir().unwrap();
    let docs = tempfile::tempdir().unwrap();
    std::fs::write(docs.path().join("policy.txt"), "Remote work is allowed three days a week.").unwrap();

    let config = config_with_documents_dir(home.path().join("never-created"));
    let roots = corpus_roots(&config, &[docs.path().to_path_buf()]).unwrap();
    assert_eq!(roots, vec![docs.path().to_path_buf()]);

    let documents = InputManager::new().load_corpus(&roots).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].content.contains("three days a week"));
}

#[test]
fn test_configured_directory_comes_first_when_present() {
    let configured = tempfile::tempdir().unwrap();
    let docs = tempfile::tempdir().unwrap();
    let config = config_with_documents_dir(configured.path().to_path_buf());

    let roots = corpus_roots(&config, &[docs.path().to_path_buf(), configured.path().to_path_buf()]).unwrap();
    assert_eq!(roots, vec![configured.path().to_path_buf(), docs.path().to_path_buf()]);
}

#[test]
fn test_no_corpus_directory_is_unavailable() {
    let home = tempfile::tempdir().unwrap();
    let config = config_with_documents_dir(home.path().join("never-created"));
    let result = corpus_roots(&config, &[]);
    assert!(matches!(result, Err(RetentionError::UpstreamUnavailable(_))));
}
