//! Prompt templates for the retention analyses

use crate::pipeline::stage::Stage;

const RULE: &str = "-----------------------------------";

const COMPENSATION_TEMPLATE: &str = r#"Answer the following questions to the best of your ability and provided data:

1. How does current salary of this employee compare to the industry benchmark?
2. Consider starting and current salary of the employee. How does the salary growth compare to industry standard?
-----------------------------------
The employee with high risk of attrition is:
{snapshot}"#;

const REVIEWS_TEMPLATE: &str = r#"Analyze performance reviews of the employee and provide insights on retention recommendations.

1. Based on the performance reviews, what are the key strengths and areas of improvement for the employee?
2. How do the performance reviews align with the attrition risk?
-----------------------------------
The employee with high risk of attrition is:
{snapshot}"#;

const BENEFITS_TEMPLATE: &str = r#"Analyze the benefits enrollment of the employee and provide insights on retention recommendations.

1. Are there any benefits that the employee is not utilizing?
2. Are there any benefits that could be offered to improve employee satisfaction and retention?
Use the benefits documentation for reference.
-----------------------------------
The employee with high risk of attrition is:
{snapshot}"#;

const SURVEY_TEMPLATE: &str = r#"Analyze the engagement survey responses of the employee and provide insights on retention recommendations.

1. What are the key factors affecting employee engagement and satisfaction?
2. Are there any areas of improvement based on the survey responses?
-----------------------------------
The employee with high risk of attrition is:
{snapshot}"#;

const SYNTHESIS_INSTRUCTIONS: &str = r#"Based on the analysis of compensation, performance reviews, benefits enrollment, and engagement survey responses,
provide a comprehensive retention recommendation for the employee.

For each recommendation you make, provide a rationale about why you're making this recommendation
(e.g. employee's compensation is below industry benchmark, or employee raised concerns about long hours in the engagement survey).

Do not provide recommendation if you are not able to support it with data from analysis.

Keep your recommendations concise and to the point."#;

/// Prompt for one of the four analysis stages; `None` for synthesis,
/// which is built from the analyses instead of the snapshot
pub fn render_stage_prompt(stage: Stage, snapshot: &str) -> Option<String> {
    let template = match stage {
        Stage::Compensation => COMPENSATION_TEMPLATE,
        Stage::Reviews => REVIEWS_TEMPLATE,
        Stage::Benefits => BENEFITS_TEMPLATE,
        Stage::Survey => SURVEY_TEMPLATE,
        Stage::Synthesis => return None,
    };
    Some(template.replace("{snapshot}", snapshot))
}

/// Synthesis prompt; analyses are inserted verbatim, empty ones included
pub fn render_synthesis_prompt(analyses: &[(Stage, &str)]) -> String {
    let mut prompt = String::from(SYNTHESIS_INSTRUCTIONS);
    for (stage, text) in analyses {
        prompt.push('\n');
        prompt.push_str(RULE);
        prompt.push('\n');
        prompt.push_str(stage.analysis_label());
        prompt.push_str(": ");
        prompt.push_str(text);
    }
    prompt
}

/// Wraps retrieved context around a question
pub fn render_context_qa(context: &str, question: &str) -> String {
    format!(
        "We have provided context information below.\n\
         ---------------------\n\
         {}\n\
         ---------------------\n\
         Given this information, please answer the question: {}\n",
        context, question
    )
}
