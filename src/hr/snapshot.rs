//! Textual employee snapshot used as LLM context
//!
//! The snapshot is a fixed template: profile block, then performance
//! reviews, benefits enrollment and engagement survey. Each satellite
//! section either lists the employee's rows or carries
//! [`NO_DATA_SENTINEL`], so prompts always tell the model explicitly
//! when data is missing.

use crate::error::{Result, RetentionError};
use crate::hr::records::*;
use crate::hr::tables::HrDataset;
use std::fmt::Write;

/// Body of a satellite section with no rows for the employee
pub const NO_DATA_SENTINEL: &str = "No data available for the selected employee.";

pub const REVIEWS_HEADING: &str = "Previous Performance Reviews of the employee:";
pub const BENEFITS_HEADING: &str = "Benefits Enrollment of the employee:";
pub const SURVEY_HEADING: &str = "Engagement Survey Responses of the employee:";

/// Composed profile text for one employee; built per request, never cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeSnapshot {
    pub employee_id: i64,
    pub employee_name: String,
    text: String,
}

impl EmployeeSnapshot {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Display for EmployeeSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Builds snapshots against the satellite tables of one dataset
pub struct EmployeeSnapshotBuilder<'a> {
    reviews: Option<&'a [PerformanceReviewRecord]>,
    benefits: Option<&'a [BenefitEnrollment]>,
    survey: Option<&'a [EngagementSurveyResponse]>,
    dataset: &'a HrDataset,
}

impl<'a> EmployeeSnapshotBuilder<'a> {
    pub fn new(dataset: &'a HrDataset) -> Self {
        Self {
            reviews: dataset.reviews.as_deref(),
            benefits: dataset.benefits.as_deref(),
            survey: dataset.survey.as_deref(),
            dataset,
        }
    }

    /// Build from a pre-filtered selection that must hold exactly one row
    pub fn build(&self, rows: &[EmployeeProfile]) -> Result<EmployeeSnapshot> {
        let profile = match rows {
            [single] => single,
            [] => {
                return Err(RetentionError::InvalidInput(
                    "no employee row selected for the snapshot".to_string(),
                ))
            }
            many => {
                return Err(RetentionError::InvalidInput(format!(
                    "expected exactly one employee row, got {}",
                    many.len()
                )))
            }
        };

        let mut text = profile_block(profile);
        text.push('\n');
        text.push_str(&self.reviews_section(profile.employee_id));
        text.push('\n');
        text.push_str(&self.benefits_section(profile.employee_id));
        text.push('\n');
        text.push_str(&self.survey_section(profile.employee_id));

        Ok(EmployeeSnapshot {
            employee_id: profile.employee_id,
            employee_name: profile.full_name.clone(),
            text,
        })
    }

    pub fn build_for_id(&self, employee_id: i64) -> Result<EmployeeSnapshot> {
        let rows = self.dataset.rows_for(employee_id);

        if rows.is_empty() {
            return Err(RetentionError::InvalidInput(format!(
                "employee {} not found",
                employee_id
            )));
        }
        self.build(&rows)
    }

    fn reviews_section(&self, employee_id: i64) -> String {
        section(
            REVIEWS_HEADING,
            self.reviews.map(|rows| {
                rows.iter()
                    .filter(|r| r.employee_id == employee_id)
                    .map(|r| {
                        format!(
                            "- Fiscal Quarter: {}\n  Score: {}\n  Summary: {}\n",
                            r.fiscal_quarter, r.score, r.summary
                        )
                    })
                    .collect()
            }),
        )
    }

    fn benefits_section(&self, employee_id: i64) -> String {
        section(
            BENEFITS_HEADING,
            self.benefits.map(|rows| {
                rows.iter()
                    .filter(|b| b.employee_id == employee_id)
                    .map(|b| {
                        let status = if b.enrolled { "Enrolled" } else { "Not enrolled" };
                        format!("- {}: {}\n", b.category, status)
                    })
                    .collect()
            }),
        )
    }

    fn survey_section(&self, employee_id: i64) -> String {
        section(
            SURVEY_HEADING,
            self.survey.map(|rows| {
                rows.iter()
                    .filter(|s| s.employee_id == employee_id)
                    .map(|s| {
                        format!(
                            "- Question: {}\n  Score: {}\n  Comment: {}\n",
                            s.question, s.score, s.comment
                        )
                    })
                    .collect()
            }),
        )
    }
}

/// `None` entries (table unavailable) and empty entries both become the sentinel
fn section(heading: &str, entries: Option<Vec<String>>) -> String {
    match entries {
        Some(entries) if !entries.is_empty() => format!("{}\n{}", heading, entries.concat()),
        _ => format!("{}\n{}\n", heading, NO_DATA_SENTINEL),
    }
}

fn profile_block(p: &EmployeeProfile) -> String {
    let mut out = String::new();
    // Infallible for String
    let _ = writeln!(
        out,
        "The employee {} is a {} at {} department with high risk of attrition.",
        p.full_name, p.role, p.department
    );
    out.push('\n');
    out.push_str("Below is more information about the employee:\n");
    let _ = writeln!(out, "- Tenure: {} year(s)", p.tenure);
    let _ = writeln!(out, "- Age: {}", p.age);
    let _ = writeln!(out, "- Years of Experience: {}", p.years_of_experience);
    let _ = writeln!(out, "- Starting Salary: {}", p.starting_salary);
    let _ = writeln!(out, "- Current Salary: {}", p.current_salary);
    let _ = writeln!(out, "- Average Monthly Working Hours: {}", p.average_monthly_working_hours);
    let _ = writeln!(out, "- Last Performance Review Score: {}", p.last_performance_review_score);
    let _ = writeln!(out, "- Number of Promotions: {}", p.promotion_history);
    let _ = writeln!(out, "- Months in Role: {}", p.months_in_role);
    let _ = writeln!(out, "- Location: {}", p.location);
    let _ = writeln!(out, "- Contract: {}", p.contract);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: i64, name: &str) -> EmployeeProfile {
        EmployeeProfile {
            employee_id: id,
            full_name: name.to_string(),
            gender: "Female".to_string(),
            age: 34,
            tenure: 3.0,
            role: "Account Executive".to_string(),
            department: "Sales".to_string(),
            starting_salary: 52000.0,
            current_salary: 58000.0,
            location: "Remote".to_string(),
            contract: "Full-Time".to_string(),
            years_of_experience: 8.0,
            average_monthly_working_hours: 182.5,
            months_in_role: 20,
            promotion_history: 1,
            last_performance_review_score: 3.5,
        }
    }

    fn dataset() -> HrDataset {
        HrDataset::new(vec![profile(1, "Jane Doe"), profile(2, "John Roe")])
            .unwrap()
            .with_reviews(vec![PerformanceReviewRecord {
                employee_id: 1,
                fiscal_quarter: "Q3".to_string(),
                score: 4,
                summary: "Exceeded quota".to_string(),
            }])
            .with_benefits(vec![
                BenefitEnrollment {
                    employee_id: 1,
                    category: "Fitness".to_string(),
                    enrolled: false,
                },
                BenefitEnrollment {
                    employee_id: 1,
                    category: "Insurance".to_string(),
                    enrolled: true,
                },
            ])
    }

    #[test]
    fn test_profile_fields_in_fixed_order() {
        let data = dataset();
        let snapshot = EmployeeSnapshotBuilder::new(&data).build_for_id(1).unwrap();
        let text = snapshot.as_str();

        let markers = [
            "The employee Jane Doe is a Account Executive at Sales department",
            "- Tenure: 3 year(s)",
            "- Age: 34",
            "- Years of Experience: 8",
            "- Starting Salary: 52000",
            "- Current Salary: 58000",
            "- Average Monthly Working Hours: 182.5",
            "- Last Performance Review Score: 3.5",
            "- Number of Promotions: 1",
            "- Months in Role: 20",
            "- Location: Remote",
            "- Contract: Full-Time",
            REVIEWS_HEADING,
            BENEFITS_HEADING,
            SURVEY_HEADING,
        ];
        let positions: Vec<usize> = markers
            .iter()
            .map(|m| text.find(m).unwrap_or_else(|| panic!("missing {:?}", m)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_one_section_per_source() {
        let data = dataset();
        let text = EmployeeSnapshotBuilder::new(&data).build_for_id(1).unwrap().into_text();

        assert!(text.contains("- Fiscal Quarter: Q3"));
        assert!(text.contains("- Fitness: Not enrolled"));
        assert!(text.contains("- Insurance: Enrolled"));
        // Survey table was never supplied
        assert_eq!(text.matches(NO_DATA_SENTINEL).count(), 1);
        assert_eq!(text.matches(REVIEWS_HEADING).count(), 1);
        assert_eq!(text.matches(BENEFITS_HEADING).count(), 1);
        assert_eq!(text.matches(SURVEY_HEADING).count(), 1);
    }

    #[test]
    fn test_zero_matching_rows_use_sentinel() {
        let data = dataset();
        let text = EmployeeSnapshotBuilder::new(&data).build_for_id(2).unwrap().into_text();
        assert_eq!(text.matches(NO_DATA_SENTINEL).count(), 3);
        assert!(!text.contains("Fiscal Quarter"));
    }

    #[test]
    fn test_deterministic() {
        let data = dataset();
        let builder = EmployeeSnapshotBuilder::new(&data);
        assert_eq!(builder.build_for_id(1).unwrap(), builder.build_for_id(1).unwrap());
    }

    #[test]
    fn test_rejects_zero_or_many_rows() {
        let data = dataset();
        let builder = EmployeeSnapshotBuilder::new(&data);
        assert!(matches!(builder.build(&[]), Err(RetentionError::InvalidInput(_))));
        let two = vec![profile(1, "Jane Doe"), profile(2, "John Roe")];
        assert!(matches!(builder.build(&two), Err(RetentionError::InvalidInput(_))));
        assert!(matches!(builder.build_for_id(99), Err(RetentionError::InvalidInput(_))));
    }
}
