//! Reference corpus loading

use crate::error::{Result, RetentionError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Extracted text of one reference document
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub file_type: FileType,
    pub content: String,
}

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if let Some(cached_text) = self.cache.get(path) {
            info!("Using cached text for: {}", path.display());
            return Ok(cached_text.clone());
        }

        if !path.exists() {
            return Err(RetentionError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(RetentionError::UnsupportedFormat(format!(
                    "Unsupported file type for: {}",
                    path.display()
                )));
            }
        };

        self.cache.insert(path.to_path_buf(), text.clone());

        Ok(text)
    }

    /// Load every supported document under the given directories.
    ///
    /// Unsupported files are skipped; directories are walked recursively
    /// in sorted order so the corpus is reproducible.
    pub async fn load_corpus(&mut self, roots: &[PathBuf]) -> Result<Vec<SourceDocument>> {
        let mut files = Vec::new();
        for root in roots {
            if !root.exists() {
                return Err(RetentionError::InvalidInput(format!(
                    "Document directory does not exist: {}",
                    root.display()
                )));
            }
            collect_files(root, &mut files)?;
        }

        let mut documents = Vec::new();
        for path in files {
            let file_type = FileType::from_path(&path);
            if !file_type.is_supported() {
                warn!("Skipping unsupported document: {}", path.display());
                continue;
            }

            let content = self.extract_text(&path).await?;
            if content.trim().is_empty() {
                warn!("Document has no extractable text: {}", path.display());
                continue;
            }
            documents.push(SourceDocument {
                path,
                file_type,
                content,
            });
        }

        info!("Loaded {} reference documents", documents.len());
        Ok(documents)
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn collect_files(path: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_file() {
        out.push(path.to_path_buf());
        return Ok(());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for entry in entries {
        collect_files(&entry, out)?;
    }
    Ok(())
}
