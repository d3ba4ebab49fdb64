//! Configuration management for the retention advisor

use crate::error::{Result, RetentionError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub pipeline: PipelineConfig,
    pub attrition: AttritionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Connect timeout and longest silence allowed while a response streams
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub documents_dir: PathBuf,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttritionConfig {
    pub model_path: Option<PathBuf>,
    pub high_risk_threshold: f64,
    pub display_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
    Html,
    Pdf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("retention-advisor");

        Self {
            llm: LlmConfig {
                base_url: "https://integrate.api.nvidia.com/v1".to_string(),
                model: "meta/llama-3.1-70b-instruct".to_string(),
                api_key_env: "NVIDIA_API_KEY".to_string(),
                max_tokens: 1024,
                temperature: 0.2,
                request_timeout_secs: 60,
            },
            retrieval: RetrievalConfig {
                documents_dir: data_dir.join("documents"),
                embedding_model: "minishlab/potion-base-8M".to_string(),
                chunk_size: 1024,
                chunk_overlap: 128,
                top_k: 5,
            },
            pipeline: PipelineConfig { timeout_secs: 120 },
            attrition: AttritionConfig {
                model_path: None,
                high_risk_threshold: 0.5,
                display_limit: 15,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                output_dir: PathBuf::from("."),
            },
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the platform config dir.
    /// A missing file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| RetentionError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RetentionError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("retention-advisor")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.chunk_size <= self.retrieval.chunk_overlap {
            return Err(RetentionError::Configuration(format!(
                "retrieval.chunk_size ({}) must be greater than retrieval.chunk_overlap ({})",
                self.retrieval.chunk_size, self.retrieval.chunk_overlap
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(RetentionError::Configuration("retrieval.top_k must be at least 1".to_string()));
        }
        if self.pipeline.timeout_secs == 0 {
            return Err(RetentionError::Configuration("pipeline.timeout_secs must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.attrition.high_risk_threshold) {
            return Err(RetentionError::Configuration(
                "attrition.high_risk_threshold must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.timeout_secs)
    }

    /// Reads the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.llm.api_key_env).map_err(|_| {
            RetentionError::Configuration(format!(
                "environment variable {} is not set",
                self.llm.api_key_env
            ))
        })
    }
}
