//! Attrition probability scoring
//!
//! The trained classifier is consumed as an opaque [`AttritionPredictor`].
//! [`LinearAttritionModel`] evaluates exported logistic-regression
//! coefficients over the engineered feature set.

use crate::error::{Result, RetentionError};
use crate::hr::records::EmployeeProfile;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub trait AttritionPredictor: Send + Sync {
    /// Probability in [0, 1] that the employee leaves
    fn predict(&self, employee: &EmployeeProfile) -> f64;
}

/// Named feature values for one employee
pub fn engineer_features(e: &EmployeeProfile) -> BTreeMap<String, f64> {
    let tenure_years = e.tenure.max(1.0);
    let mut features = BTreeMap::new();

    features.insert("Age".to_string(), e.age as f64);
    features.insert("Tenure".to_string(), e.tenure);
    features.insert("Years of Experience".to_string(), e.years_of_experience);
    features.insert("Starting Salary".to_string(), e.starting_salary);
    features.insert("Current Salary".to_string(), e.current_salary);
    features.insert("Average Monthly Working Hours".to_string(), e.average_monthly_working_hours);
    features.insert("Last Performance Review Score".to_string(), e.last_performance_review_score);
    features.insert("Promotion History".to_string(), e.promotion_history as f64);
    features.insert("Months in Role".to_string(), e.months_in_role as f64);
    features.insert(
        "Salary Raise Per Year".to_string(),
        (e.current_salary - e.starting_salary) / tenure_years,
    );
    features.insert(
        "Promotion Frequency".to_string(),
        e.promotion_history as f64 / tenure_years,
    );

    for (column, value) in [
        ("Gender", &e.gender),
        ("Department", &e.department),
        ("Role", &e.role),
        ("Location", &e.location),
        ("Contract", &e.contract),
    ] {
        features.insert(format!("{}={}", column, value), 1.0);
    }

    features
}

/// Logistic model over [`engineer_features`]; absent features contribute zero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearAttritionModel {
    pub intercept: f64,
    pub weights: BTreeMap<String, f64>,
    /// Per-feature (mean, std) applied before weighting
    #[serde(default)]
    pub scaling: BTreeMap<String, (f64, f64)>,
}

impl LinearAttritionModel {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&content)?;
        if let Some((name, _)) = model.scaling.iter().find(|(_, (_, std))| *std <= 0.0) {
            return Err(RetentionError::Model(format!(
                "feature '{}' has a non-positive scale",
                name
            )));
        }
        info!(
            "Loaded attrition model with {} weights from {}",
            model.weights.len(),
            path.display()
        );
        Ok(model)
    }

    fn logit(&self, features: &BTreeMap<String, f64>) -> f64 {
        self.weights.iter().fold(self.intercept, |acc, (name, weight)| {
            let raw = features.get(name).copied().unwrap_or(0.0);
            let value = match self.scaling.get(name) {
                Some((mean, std)) => (raw - mean) / std,
                None => raw,
            };
            acc + weight * value
        })
    }
}

impl AttritionPredictor for LinearAttritionModel {
    fn predict(&self, employee: &EmployeeProfile) -> f64 {
        let z = self.logit(&engineer_features(employee));
        1.0 / (1.0 + (-z).exp())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskEntry {
    pub employee_id: i64,
    pub full_name: String,
    pub department: String,
    pub role: String,
    pub probability: f64,
}

/// Employees sorted by descending attrition probability (ties keep table order)
pub fn rank_by_risk(employees: &[EmployeeProfile], predictor: &dyn AttritionPredictor) -> Vec<RiskEntry> {
    let mut ranked: Vec<RiskEntry> = employees
        .iter()
        .map(|e| RiskEntry {
            employee_id: e.employee_id,
            full_name: e.full_name.clone(),
            department: e.department.clone(),
            role: e.role.clone(),
            probability: predictor.predict(e).clamp(0.0, 1.0),
        })
        .collect();
    ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    ranked
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkforceMetrics {
    pub headcount: usize,
    pub full_time: usize,
    pub part_time: usize,
    pub high_risk: usize,
}

pub fn workforce_metrics(employees: &[EmployeeProfile], ranked: &[RiskEntry], high_risk_threshold: f64) -> WorkforceMetrics {
    let contract_is = |label: &str| {
        employees
            .iter()
            .filter(|e| e.contract.to_lowercase().replace([' ', '_'], "-") == label)
            .count()
    };

    WorkforceMetrics {
        headcount: employees.len(),
        full_time: contract_is("full-time"),
        part_time: contract_is("part-time"),
        high_risk: ranked.iter().filter(|r| r.probability >= high_risk_threshold).count(),
    }
}
