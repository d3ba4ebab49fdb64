//! Recommendation report handed to the formatters

use crate::hr::snapshot::EmployeeSnapshot;
use crate::output::postprocess::clean;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub employee_id: i64,
    pub employee_name: String,
    /// Predicted probability of leaving, when an attrition model is configured
    pub attrition_probability: Option<f64>,
    /// Post-processed recommendation text
    pub recommendation: String,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub llm_model: String,
    pub processing_time_ms: u64,
    pub version: String,
}

impl RecommendationReport {
    /// Wraps raw pipeline output; the text is cleaned here
    pub fn new(snapshot: &EmployeeSnapshot, raw_recommendation: &str, llm_model: &str, processing_time_ms: u64) -> Self {
        Self {
            employee_id: snapshot.employee_id,
            employee_name: snapshot.employee_name.clone(),
            attrition_probability: None,
            recommendation: clean(raw_recommendation),
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                llm_model: llm_model.to_string(),
                processing_time_ms,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    pub fn with_attrition_probability(mut self, probability: f64) -> Self {
        self.attrition_probability = Some(probability.clamp(0.0, 1.0));
        self
    }

    pub fn title(&self) -> String {
        format!("Retention recommendations for {}", self.employee_name)
    }

    /// True when every stage degraded and nothing was generated
    pub fn is_empty(&self) -> bool {
        self.recommendation.trim().is_empty()
    }

    /// Recommendation split into non-empty paragraphs
    pub fn paragraphs(&self) -> Vec<&str> {
        self.recommendation
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}
