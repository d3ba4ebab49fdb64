//! Retention advisor: attrition insights and LLM-backed retention recommendations

use clap::Parser;
use colored::Colorize;
use futures::StreamExt;
use log::{error, info, warn};
use retention_advisor::cli::{self, Cli, Commands, ConfigAction, DatasetArgs};
use retention_advisor::config::{Config, OutputFormat};
use retention_advisor::error::{Result, RetentionError};
use retention_advisor::hr::attrition::{rank_by_risk, workforce_metrics, AttritionPredictor, LinearAttritionModel};
use retention_advisor::hr::snapshot::EmployeeSnapshotBuilder;
use retention_advisor::hr::tables::{load_employees, HrDataset};
use retention_advisor::llm::client::OpenAiCompatClient;
use retention_advisor::llm::query::{ask_about_snapshots, RetrievalQueryEngine, QA_SNAPSHOT_LIMIT};
use retention_advisor::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use retention_advisor::output::RecommendationReport;
use retention_advisor::pipeline::{IndicatifProgress, RecommendationPipeline};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    let config_path = cli.config.unwrap_or_else(Config::config_path);
    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Recommend {
            dataset,
            employee_id,
            docs,
            timeout,
            output,
            save,
        } => recommend(&config, &dataset, employee_id, &docs, timeout, output.as_deref(), save).await,

        Commands::Snapshot { dataset, employee_id } => {
            dataset.validate().map_err(RetentionError::InvalidInput)?;
            let data = HrDataset::load(&dataset.paths())?;
            let snapshot = EmployeeSnapshotBuilder::new(&data).build_for_id(employee_id)?;
            println!("{}", snapshot);
            Ok(())
        }

        Commands::Dashboard { employees, model, limit } => {
            cli::validate_file_extension(&employees, &["csv"]).map_err(RetentionError::InvalidInput)?;
            let predictor = load_attrition_model(&config, model.as_deref())?.ok_or_else(|| {
                RetentionError::Configuration(
                    "no attrition model configured; pass --model or set attrition.model_path".to_string(),
                )
            })?;

            let employees = load_employees(&employees)?;
            let ranked = rank_by_risk(&employees, &predictor);
            let metrics = workforce_metrics(&employees, &ranked, config.attrition.high_risk_threshold);

            let generator = ReportGenerator::with_options(config.output.color_output, true, true, true);
            print!(
                "{}",
                generator
                    .console()
                    .format_dashboard(&ranked, &metrics, limit.unwrap_or(config.attrition.display_limit))
            );
            Ok(())
        }

        Commands::Ask { dataset, question } => ask(&config, &dataset, &question).await,

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let text = toml::to_string_pretty(&config)
                    .map_err(|e| RetentionError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("{}\n", format!("Configuration ({})", config_path.display()).bold());
                println!("{}", text);
                Ok(())
            }
            Some(ConfigAction::Reset) => {
                Config::default().save_to(config_path)?;
                println!("{} {}", "Configuration reset:".green(), config_path.display());
                Ok(())
            }
            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
                Ok(())
            }
        },
    }
}

async fn recommend(
    config: &Config,
    dataset: &DatasetArgs,
    employee_id: i64,
    docs: &[PathBuf],
    timeout: Option<u64>,
    output: Option<&str>,
    save: Option<PathBuf>,
) -> Result<()> {
    dataset.validate().map_err(RetentionError::InvalidInput)?;
    let format = match output {
        Some(f) => cli::parse_output_format(f).map_err(RetentionError::InvalidInput)?,
        None => config.output.format,
    };

    let data = HrDataset::load(&dataset.paths())?;
    let snapshot = EmployeeSnapshotBuilder::new(&data).build_for_id(employee_id)?;
    println!("{} {} (ID {})", "Employee:".bold(), snapshot.employee_name, snapshot.employee_id);

    info!("Building document query engine");
    let engine = RetrievalQueryEngine::from_config(config, docs).await?;

    let budget = timeout.map(Duration::from_secs).unwrap_or_else(|| config.pipeline_timeout());
    let pipeline =
        RecommendationPipeline::new(Arc::new(engine), Arc::new(IndicatifProgress::new())).with_timeout(budget);

    let start = Instant::now();
    let raw = pipeline.run_pipeline(snapshot.as_str()).await?;
    let mut report = RecommendationReport::new(
        &snapshot,
        &raw,
        &config.llm.model,
        start.elapsed().as_millis() as u64,
    );

    if let (Some(model), Some(profile)) = (load_attrition_model(config, None)?, data.employee(employee_id)) {
        report = report.with_attrition_probability(model.predict(profile));
    }
    if report.is_empty() {
        warn!("Every stage returned empty output for employee {}", employee_id);
    }

    let generator = ReportGenerator::with_options(config.output.color_output, true, true, true);
    let target = match save {
        Some(path) if path.is_dir() => Some(path.join(suggest_filename(format, &report.employee_name, false))),
        Some(path) => Some(path),
        None if format == OutputFormat::Pdf => Some(
            config
                .output
                .output_dir
                .join(suggest_filename(format, &report.employee_name, false)),
        ),
        None => None,
    };

    match target {
        Some(path) => {
            save_report_to_file(&generator.render(&report, format)?, &path)?;
            println!("{} {}", "Report saved to".green(), path.display());
        }
        None => println!("{}", generator.generate_report(&report, format)?),
    }
    Ok(())
}

async fn ask(config: &Config, dataset: &DatasetArgs, question: &str) -> Result<()> {
    dataset.validate().map_err(RetentionError::InvalidInput)?;
    let data = HrDataset::load(&dataset.paths())?;
    let builder = EmployeeSnapshotBuilder::new(&data);
    let snapshots = data
        .employees
        .iter()
        .take(QA_SNAPSHOT_LIMIT)
        .map(|employee| builder.build(std::slice::from_ref(employee)))
        .collect::<Result<Vec<_>>>()?;

    let client = OpenAiCompatClient::from_config(config)?;
    let mut stream = ask_about_snapshots(&client, &snapshots, question).await?;

    let mut stdout = std::io::stdout();
    while let Some(fragment) = stream.next().await {
        write!(stdout, "{}", fragment?)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn load_attrition_model(config: &Config, explicit: Option<&Path>) -> Result<Option<LinearAttritionModel>> {
    match explicit.or(config.attrition.model_path.as_deref()) {
        Some(path) => Ok(Some(LinearAttritionModel::from_file(path)?)),
        None => Ok(None),
    }
}
