//! CSV loading for the HR tables

use crate::error::{Result, RetentionError};
use crate::hr::columns::canonical_headers;
use crate::hr::records::*;
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Session-scoped HR tables.
///
/// Satellite tables are `None` when they were not supplied at all, which is
/// different from a supplied table with no rows for a given employee.
#[derive(Debug, Clone, Default)]
pub struct HrDataset {
    pub employees: Vec<EmployeeProfile>,
    pub reviews: Option<Vec<PerformanceReviewRecord>>,
    pub benefits: Option<Vec<BenefitEnrollment>>,
    pub survey: Option<Vec<EngagementSurveyResponse>>,
}

/// File locations for a dataset load
#[derive(Debug, Clone, Default)]
pub struct DatasetPaths<'a> {
    pub employees: Option<&'a Path>,
    pub reviews: Option<&'a Path>,
    pub benefits: Option<&'a Path>,
    pub survey: Option<&'a Path>,
}

impl HrDataset {
    pub fn new(employees: Vec<EmployeeProfile>) -> Result<Self> {
        let mut seen = HashSet::new();
        for employee in &employees {
            if !seen.insert(employee.employee_id) {
                return Err(RetentionError::InvalidInput(format!(
                    "duplicate Employee ID {} in employee table",
                    employee.employee_id
                )));
            }
        }

        Ok(Self {
            employees,
            reviews: None,
            benefits: None,
            survey: None,
        })
    }

    pub fn with_reviews(mut self, reviews: Vec<PerformanceReviewRecord>) -> Self {
        self.reviews = Some(reviews);
        self
    }

    pub fn with_benefits(mut self, benefits: Vec<BenefitEnrollment>) -> Self {
        self.benefits = Some(benefits);
        self
    }

    pub fn with_survey(mut self, survey: Vec<EngagementSurveyResponse>) -> Self {
        self.survey = Some(survey);
        self
    }

    /// Load every table that has a path; the employee table is required
    pub fn load(paths: &DatasetPaths<'_>) -> Result<Self> {
        let employee_path = paths
            .employees
            .ok_or_else(|| RetentionError::InvalidInput("employee table is required".to_string()))?;

        let mut dataset = Self::new(load_employees(employee_path)?)?;

        if let Some(path) = paths.reviews {
            dataset.reviews = Some(load_reviews(path)?);
        }
        if let Some(path) = paths.benefits {
            dataset.benefits = Some(load_benefits(path)?);
        }
        if let Some(path) = paths.survey {
            dataset.survey = Some(load_survey(path)?);
        }

        info!(
            "Loaded {} employees (reviews: {}, benefits: {}, survey: {})",
            dataset.employees.len(),
            availability(&dataset.reviews),
            availability(&dataset.benefits),
            availability(&dataset.survey),
        );

        Ok(dataset)
    }

    /// All profile rows with the given id (zero or one for a valid table)
    pub fn rows_for(&self, employee_id: i64) -> Vec<EmployeeProfile> {
        self.employees
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .cloned()
            .collect()
    }

    pub fn employee(&self, employee_id: i64) -> Option<&EmployeeProfile> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }
}

fn availability<T>(table: &Option<Vec<T>>) -> String {
    match table {
        Some(rows) => format!("{} rows", rows.len()),
        None => "not supplied".to_string(),
    }
}

pub fn load_employees(path: &Path) -> Result<Vec<EmployeeProfile>> {
    load_table(path, EMPLOYEE_COLUMNS, "Employee")
}

pub fn load_reviews(path: &Path) -> Result<Vec<PerformanceReviewRecord>> {
    let rows: Vec<PerformanceReviewRecord> = load_table(path, REVIEW_COLUMNS, "Performance review")?;
    check_scores(rows.iter().map(|r| (r.employee_id, r.score)), "Performance review")?;
    Ok(rows)
}

pub fn load_benefits(path: &Path) -> Result<Vec<BenefitEnrollment>> {
    load_table(path, BENEFIT_COLUMNS, "Benefits")
}

pub fn load_survey(path: &Path) -> Result<Vec<EngagementSurveyResponse>> {
    let rows: Vec<EngagementSurveyResponse> = load_table(path, SURVEY_COLUMNS, "Engagement survey")?;
    check_scores(rows.iter().map(|r| (r.employee_id, r.score)), "Engagement survey")?;
    Ok(rows)
}

fn check_scores(scores: impl Iterator<Item = (i64, u8)>, table: &str) -> Result<()> {
    for (employee_id, score) in scores {
        if !is_valid_score(score) {
            return Err(RetentionError::InvalidInput(format!(
                "{} score {} for employee {} is outside 1-5",
                table, score, employee_id
            )));
        }
    }
    Ok(())
}

fn load_table<T: DeserializeOwned>(path: &Path, expected: &[&str], table: &str) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(RetentionError::InvalidInput(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    let mut raw = String::new();
    std::fs::File::open(path)?.read_to_string(&mut raw)?;
    let rows = parse_table(&raw, expected, table)?;
    info!("Read {} {} rows from {}", rows.len(), table.to_lowercase(), path.display());
    Ok(rows)
}

/// Parses CSV text whose headers are mapped onto `expected`
pub fn parse_table<T: DeserializeOwned>(raw: &str, expected: &[&str], table: &str) -> Result<Vec<T>> {
    let delimiter = sniff_delimiter(raw);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let canonical = canonical_headers(&headers, expected, table)?;
    reader.set_headers(csv::StringRecord::from(canonical));

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("{} row {} could not be parsed: {}", table, idx + 1, e);
                return Err(RetentionError::Csv(e));
            }
        }
    }
    Ok(rows)
}

/// Picks the most frequent of `,`, `;` and tab in the header line
fn sniff_delimiter(raw: &str) -> u8 {
    let header = raw.lines().next().unwrap_or_default();
    let mut best = (b',', header.bytes().filter(|b| *b == b',').count());
    for candidate in [b';', b'\t'] {
        let count = header.bytes().filter(|b| *b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}
