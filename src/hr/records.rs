//! Row types for the four HR tables

use serde::{Deserialize, Deserializer, Serialize};

/// Core HR record, one per employee. `employee_id` joins the satellite tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    #[serde(rename = "Employee ID")]
    pub employee_id: i64,
    #[serde(rename = "Full Name")]
    pub full_name: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Tenure")]
    pub tenure: f64,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Starting Salary")]
    pub starting_salary: f64,
    #[serde(rename = "Current Salary")]
    pub current_salary: f64,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "Years of Experience")]
    pub years_of_experience: f64,
    #[serde(rename = "Average Monthly Working Hours")]
    pub average_monthly_working_hours: f64,
    #[serde(rename = "Months in Role")]
    pub months_in_role: u32,
    #[serde(rename = "Promotion History")]
    pub promotion_history: u32,
    #[serde(rename = "Last Performance Review Score")]
    pub last_performance_review_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReviewRecord {
    #[serde(rename = "Employee ID")]
    pub employee_id: i64,
    #[serde(rename = "Fiscal Quarter")]
    pub fiscal_quarter: String,
    #[serde(rename = "Score")]
    pub score: u8,
    #[serde(rename = "Performance Review Summary")]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitEnrollment {
    #[serde(rename = "Employee ID")]
    pub employee_id: i64,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Enrollment Status", deserialize_with = "deserialize_flag")]
    pub enrolled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSurveyResponse {
    #[serde(rename = "Employee ID")]
    pub employee_id: i64,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Score")]
    pub score: u8,
    #[serde(rename = "Comment")]
    pub comment: String,
}

/// Canonical column names per table, in the order the loader reports them.
pub const EMPLOYEE_COLUMNS: &[&str] = &[
    "Employee ID",
    "Full Name",
    "Gender",
    "Age",
    "Tenure",
    "Role",
    "Department",
    "Starting Salary",
    "Current Salary",
    "Location",
    "Contract",
    "Years of Experience",
    "Average Monthly Working Hours",
    "Months in Role",
    "Promotion History",
    "Last Performance Review Score",
];
pub const REVIEW_COLUMNS: &[&str] = &["Employee ID", "Fiscal Quarter", "Score", "Performance Review Summary"];
pub const BENEFIT_COLUMNS: &[&str] = &["Employee ID", "Category", "Enrollment Status"];
pub const SURVEY_COLUMNS: &[&str] = &["Employee ID", "Question", "Score", "Comment"];

/// Scores on review and survey rows live on a 1-5 scale
pub fn is_valid_score(score: u8) -> bool {
    (1..=5).contains(&score)
}

/// Accepts the boolean spellings that show up in exported HR sheets
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "enrolled" => Ok(true),
        "false" | "no" | "n" | "0" | "not enrolled" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid enrollment status: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_flag_spellings() {
        let data = "Employee ID,Category,Enrollment Status\n1,Fitness,True\n1,Lunch Card,no\n2,Learning,1\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<BenefitEnrollment> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].enrolled);
        assert!(!rows[1].enrolled);
        assert!(rows[2].enrolled);
    }

    #[test]
    fn test_invalid_enrollment_flag_is_rejected() {
        let data = "Employee ID,Category,Enrollment Status\n1,Fitness,maybe\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let result: std::result::Result<Vec<BenefitEnrollment>, _> = reader.deserialize().collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_score_range() {
        assert!(is_valid_score(1));
        assert!(is_valid_score(5));
        assert!(!is_valid_score(0));
        assert!(!is_valid_score(6));
    }
}
