//! Error handling for the retention advisor

use crate::pipeline::stage::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetentionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Text processing error: {0}")]
    Processing(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Attrition model error: {0}")]
    Model(String),

    #[error("{stage} stage query failed: {reason}")]
    StageQueryFailure { stage: Stage, reason: String },

    #[error("Recommendation pipeline timed out after {elapsed_ms}ms (budget {budget_ms}ms)")]
    PipelineTimeout { elapsed_ms: u64, budget_ms: u64 },

    #[error("Document query service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("A recommendation run is already in progress")]
    RunInProgress,

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, RetentionError>;

impl From<reqwest::Error> for RetentionError {
    fn from(err: reqwest::Error) -> Self {
        RetentionError::Network(err.to_string())
    }
}

impl From<printpdf::Error> for RetentionError {
    fn from(err: printpdf::Error) -> Self {
        RetentionError::OutputFormatting(err.to_string())
    }
}
