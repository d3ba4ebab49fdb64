//! CLI interface for the retention advisor

use crate::config::OutputFormat;
use crate::hr::tables::DatasetPaths;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "retention-advisor")]
#[command(about = "Employee attrition insights and retention recommendations")]
#[command(long_about = "Score attrition risk from HR tables and generate retention recommendations \
    with an LLM grounded in your compensation trends and benefits documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// HR tables shared by the data-driven commands
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Employee profiles CSV
    #[arg(short, long)]
    pub employees: PathBuf,

    /// Performance reviews CSV
    #[arg(long)]
    pub reviews: Option<PathBuf>,

    /// Benefits enrollment CSV
    #[arg(long)]
    pub benefits: Option<PathBuf>,

    /// Engagement survey CSV
    #[arg(long)]
    pub survey: Option<PathBuf>,
}

impl DatasetArgs {
    pub fn paths(&self) -> DatasetPaths<'_> {
        DatasetPaths {
            employees: Some(self.employees.as_path()),
            reviews: self.reviews.as_deref(),
            benefits: self.benefits.as_deref(),
            survey: self.survey.as_deref(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_file_extension(&self.employees, &["csv"])?;
        for path in [&self.reviews, &self.benefits, &self.survey].into_iter().flatten() {
            validate_file_extension(path, &["csv"])?;
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate retention recommendations for one employee
    Recommend {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Employee ID to analyze
        #[arg(short = 'i', long)]
        employee_id: i64,

        /// Additional reference document directories
        #[arg(short, long)]
        docs: Vec<PathBuf>,

        /// Pipeline timeout in seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output format: console, json, markdown, html, pdf
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file; a directory gets a generated file name
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Print the textual snapshot of one employee
    Snapshot {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Employee ID
        #[arg(short = 'i', long)]
        employee_id: i64,
    },

    /// Rank employees by predicted attrition risk
    Dashboard {
        /// Employee profiles CSV
        #[arg(short, long)]
        employees: PathBuf,

        /// Attrition model JSON (overrides config)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Number of employees to list
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ask a free-form question about the first employees in the dataset
    Ask {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// The question
        question: String,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "html" => Ok(OutputFormat::Html),
        "pdf" => Ok(OutputFormat::Pdf),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, html, pdf",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err(format!("File has no extension: {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_recommend() {
        let cli = Cli::parse_from([
            "retention-advisor",
            "recommend",
            "--employees",
            "employees.csv",
            "--survey",
            "survey.csv",
            "-i",
            "42",
            "--docs",
            "trends",
            "--docs",
            "benefits",
        ]);
        match cli.command {
            Commands::Recommend {
                dataset,
                employee_id,
                docs,
                ..
            } => {
                assert_eq!(employee_id, 42);
                assert_eq!(docs.len(), 2);
                assert!(dataset.reviews.is_none());
                assert!(dataset.validate().is_ok());
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_output_format_aliases() {
        assert_eq!(parse_output_format("MD"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("docx").is_err());
    }

    #[test]
    fn test_rejects_non_csv_tables() {
        assert!(validate_file_extension(Path::new("staff.xlsx"), &["csv"]).is_err());
        assert!(validate_file_extension(Path::new("staff"), &["csv"]).is_err());
    }
}
