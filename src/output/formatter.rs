//! Report formatters: console, JSON, Markdown, HTML and PDF

use crate::config::OutputFormat;
use crate::error::{Result, RetentionError};
use crate::hr::attrition::{RiskEntry, WorkforceMetrics};
use crate::output::pdf::render_pdf;
use crate::output::report::RecommendationReport;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

/// Text formatters; PDF is binary and goes through [`ReportGenerator::render`]
pub trait OutputFormatter {
    fn format_report(&self, report: &RecommendationReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

pub struct HtmlFormatter {
    include_styles: bool,
}

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    {% if include_styles %}
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 860px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .header { border-bottom: 3px solid #007acc; padding-bottom: 16px; margin-bottom: 24px; }
        .risk { display: inline-block; padding: 6px 14px; border-radius: 16px; font-weight: bold; color: white; background: #dc3545; }
        .recommendation p { margin: 12px 0; }
        .degraded { background: #fff3cd; padding: 12px; border-radius: 6px; }
        .metadata { background: #e9ecef; padding: 12px; border-radius: 6px; margin-top: 30px; font-size: 0.9em; }
    </style>
    {% endif %}
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{{ title }}</h1>
            <p>Employee ID {{ employee_id }}{% if has_probability %} <span class="risk">Attrition risk {{ probability_pct }}</span>{% endif %}</p>
        </div>
        <div class="recommendation">
            {% if paragraphs.is_empty() %}
            <p class="degraded">No recommendation could be generated for this employee.</p>
            {% endif %}
            {% for paragraph in paragraphs %}
            <p>{{ paragraph }}</p>
            {% endfor %}
        </div>
        <div class="metadata">
            <p>Generated {{ generated_at }} by retention-advisor v{{ version }} using {{ llm_model }} ({{ processing_time_ms }}ms)</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate {
    include_styles: bool,
    title: String,
    employee_id: i64,
    has_probability: bool,
    probability_pct: String,
    paragraphs: Vec<String>,
    generated_at: String,
    version: String,
    llm_model: String,
    processing_time_ms: u64,
}

fn percent(probability: f64) -> String {
    format!("{:.0}%", probability * 100.0)
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn risk_color(probability: f64) -> Color {
        match probability {
            p if p >= 0.75 => Color::BrightRed,
            p if p >= 0.5 => Color::Red,
            p if p >= 0.25 => Color::Yellow,
            _ => Color::Green,
        }
    }

    /// Top-`limit` attrition table followed by workforce metrics
    pub fn format_dashboard(&self, ranked: &[RiskEntry], metrics: &WorkforceMetrics, limit: usize) -> String {
        let mut output = String::new();

        output.push_str(&self.format_header("WORKFORCE OVERVIEW", 1));
        output.push_str(&format!(
            "Headcount: {} | Full-time: {} | Part-time: {} | High risk: {}\n",
            metrics.headcount,
            metrics.full_time,
            metrics.part_time,
            self.colorize(&metrics.high_risk.to_string(), Color::Red)
        ));

        output.push_str(&self.format_header("Employees at risk of attrition", 2));
        output.push_str(&format!(
            "{:>6}  {:<28} {:<20} {:<24} {:>6}\n",
            "ID", "Name", "Department", "Role", "Risk"
        ));
        for entry in ranked.iter().take(limit) {
            let risk = format!("{:>6}", percent(entry.probability));
            output.push_str(&format!(
                "{:>6}  {:<28} {:<20} {:<24} {}\n",
                entry.employee_id,
                truncate(&entry.full_name, 28),
                truncate(&entry.department, 20),
                truncate(&entry.role, 24),
                self.colorize(&risk, Self::risk_color(entry.probability))
            ));
        }
        output
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RecommendationReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&report.title().to_uppercase(), 1));
        output.push_str(&format!(
            "Generated: {} | Model: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.llm_model,
            report.metadata.processing_time_ms
        ));

        if let Some(probability) = report.attrition_probability {
            output.push_str(&format!(
                "Attrition probability: {}\n",
                self.colorize(&percent(probability), Self::risk_color(probability))
            ));
        }

        output.push_str(&self.format_header("Recommendations", 2));
        if report.is_empty() {
            output.push_str(&self.colorize(
                "No recommendation could be generated; every analysis stage came back empty.\n",
                Color::Yellow,
            ));
        } else {
            for paragraph in report.paragraphs() {
                output.push_str(paragraph);
                output.push_str("\n\n");
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RecommendationReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &RecommendationReport) -> Result<String> {
        let mut output = format!("# {}\n\n", report.title());

        if self.include_metadata {
            output.push_str(&format!(
                "**Employee ID:** {} | **Generated:** {} | **Model:** `{}`\n\n",
                report.employee_id,
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.llm_model
            ));
        }

        if let Some(probability) = report.attrition_probability {
            output.push_str(&format!("**Attrition probability:** {}\n\n", percent(probability)));
        }

        output.push_str("## Recommendations\n\n");
        if report.is_empty() {
            output.push_str("_No recommendation could be generated._\n");
        }
        for paragraph in report.paragraphs() {
            output.push_str(paragraph);
            output.push_str("\n\n");
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl HtmlFormatter {
    pub fn new(include_styles: bool) -> Self {
        Self { include_styles }
    }

    fn create_template_data(&self, report: &RecommendationReport) -> HtmlTemplate {
        HtmlTemplate {
            include_styles: self.include_styles,
            title: report.title(),
            employee_id: report.employee_id,
            has_probability: report.attrition_probability.is_some(),
            probability_pct: report.attrition_probability.map(percent).unwrap_or_default(),
            paragraphs: report.paragraphs().into_iter().map(str::to_string).collect(),
            generated_at: report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            version: report.metadata.version.clone(),
            llm_model: report.metadata.llm_model.clone(),
            processing_time_ms: report.metadata.processing_time_ms,
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &RecommendationReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| RetentionError::OutputFormatting(e.to_string()))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true, true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_metadata: bool, include_html_styles: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            html_formatter: HtmlFormatter::new(include_html_styles),
        }
    }

    /// Text rendering; PDF is rejected since it is binary
    pub fn generate_report(&self, report: &RecommendationReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
            OutputFormat::Html => self.html_formatter.format_report(report),
            OutputFormat::Pdf => Err(RetentionError::OutputFormatting(
                "PDF output is binary; use render() instead".to_string(),
            )),
        }
    }

    /// Bytes ready to be written to a file, for any format
    pub fn render(&self, report: &RecommendationReport, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Pdf => render_pdf(report),
            other => Ok(self.generate_report(report, other)?.into_bytes()),
        }
    }

    pub fn console(&self) -> &ConsoleFormatter {
        &self.console_formatter
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &[u8], file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

/// File name derived from the employee's display name
pub fn suggest_filename(format: OutputFormat, employee_name: &str, timestamp: bool) -> String {
    let mut base_name: String = employee_name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    while base_name.contains("__") {
        base_name = base_name.replace("__", "_");
    }
    let base_name = match base_name.trim_matches('_') {
        "" => "employee",
        trimmed => trimmed,
    };

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
        OutputFormat::Pdf => "pdf",
    };
    format!("{}_recommendations{}.{}", base_name, timestamp_suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::tests::sample_report;

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false).format_report(&sample_report()).unwrap();
        assert!(output.contains("RETENTION RECOMMENDATIONS FOR JANE DOE"));
        assert!(output.contains("Attrition probability: 82%"));
        assert!(output.contains("Flexible hours"));
    }

    #[test]
    fn test_console_reports_degraded_run() {
        let mut report = sample_report();
        report.recommendation.clear();
        let output = ConsoleFormatter::new(false).format_report(&report).unwrap();
        assert!(output.contains("No recommendation could be generated"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = sample_report();
        let json = JsonFormatter::new(false).format_report(&report).unwrap();
        let parsed: RecommendationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.employee_name, report.employee_name);
        assert_eq!(parsed.recommendation, report.recommendation);
        assert_eq!(parsed.metadata, report.metadata);
        assert!((parsed.attrition_probability.unwrap() - 0.82).abs() < 1e-9);
    }

    #[test]
    fn test_markdown_sections() {
        let output = MarkdownFormatter::new(true).format_report(&sample_report()).unwrap();
        assert!(output.starts_with("# Retention recommendations for Jane Doe"));
        assert!(output.contains("## Recommendations"));
        assert!(output.contains("**Employee ID:** 7"));
    }

    #[test]
    fn test_html_escapes_generated_text() {
        let mut report = sample_report();
        report.recommendation = "Offer <b>bonus</b> & training".to_string();
        let html = HtmlFormatter::new(false).format_report(&report).unwrap();
        assert!(html.contains("&lt;b&gt;bonus"));
        assert!(!html.contains("<style>"));
        assert!(html.contains("Attrition risk 82%"));
    }

    #[test]
    fn test_pdf_is_rejected_as_text() {
        let generator = ReportGenerator::with_options(false, true, true, false);
        assert!(generator.generate_report(&sample_report(), OutputFormat::Pdf).is_err());
        let bytes = generator.render(&sample_report(), OutputFormat::Pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_suggest_filename_from_display_name() {
        assert_eq!(
            suggest_filename(OutputFormat::Pdf, "Jane  O'Doe", false),
            "jane_o_doe_recommendations.pdf"
        );
        assert_eq!(suggest_filename(OutputFormat::Markdown, "  ", false), "employee_recommendations.md");
    }

    #[test]
    fn test_dashboard_lists_top_entries() {
        let ranked = vec![
            RiskEntry {
                employee_id: 3,
                full_name: "Ann Lee".to_string(),
                department: "Sales".to_string(),
                role: "Account Manager".to_string(),
                probability: 0.91,
            },
            RiskEntry {
                employee_id: 1,
                full_name: "Bo Chen".to_string(),
                department: "IT".to_string(),
                role: "Engineer".to_string(),
                probability: 0.12,
            },
        ];
        let metrics = WorkforceMetrics {
            headcount: 2,
            full_time: 1,
            part_time: 1,
            high_risk: 1,
        };
        let output = ConsoleFormatter::new(false).format_dashboard(&ranked, &metrics, 1);
        assert!(output.contains("Ann Lee"));
        assert!(!output.contains("Bo Chen"));
        assert!(output.contains("High risk: 1"));
    }
}
