//! Recommendation pipeline stages

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Compensation,
    Reviews,
    Benefits,
    Survey,
    Synthesis,
}

impl Stage {
    pub const FIRST: Stage = Stage::Compensation;

    /// The four analysis stages, in execution order
    pub const ANALYSES: [Stage; 4] = [Stage::Compensation, Stage::Reviews, Stage::Benefits, Stage::Survey];

    /// Progress checkpoint reported when the stage starts
    pub fn progress_percent(self) -> u8 {
        match self {
            Stage::Compensation => 0,
            Stage::Reviews => 25,
            Stage::Benefits => 50,
            Stage::Survey => 75,
            Stage::Synthesis => 99,
        }
    }

    pub fn progress_label(self) -> &'static str {
        match self {
            Stage::Compensation => "Analyzing compensation data...",
            Stage::Reviews => "Analyzing performance reviews...",
            Stage::Benefits => "Analyzing employee benefits...",
            Stage::Survey => "Analyzing survey results...",
            Stage::Synthesis => "Summarizing...",
        }
    }

    /// Label heading the stage's text inside the synthesis prompt
    pub fn analysis_label(self) -> &'static str {
        match self {
            Stage::Compensation => "Compensation analysis",
            Stage::Reviews => "Performance reviews analysis",
            Stage::Benefits => "Benefits enrollment analysis",
            Stage::Survey => "Engagement survey analysis",
            Stage::Synthesis => "Retention recommendation",
        }
    }

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Compensation => Some(Stage::Reviews),
            Stage::Reviews => Some(Stage::Benefits),
            Stage::Benefits => Some(Stage::Survey),
            Stage::Survey => Some(Stage::Synthesis),
            Stage::Synthesis => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Compensation => "Compensation",
            Stage::Reviews => "Reviews",
            Stage::Benefits => "Benefits",
            Stage::Survey => "Survey",
            Stage::Synthesis => "Synthesis",
        };
        f.write_str(name)
    }
}

/// Full text produced by one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub stage: Stage,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_linear() {
        let mut chain = vec![Stage::FIRST];
        while let Some(next) = chain.last().and_then(|s| s.next()) {
            chain.push(next);
        }
        assert_eq!(
            chain,
            vec![Stage::Compensation, Stage::Reviews, Stage::Benefits, Stage::Survey, Stage::Synthesis]
        );
    }

    #[test]
    fn test_checkpoints_increase() {
        let checkpoints: Vec<u8> = Stage::ANALYSES
            .iter()
            .chain(std::iter::once(&Stage::Synthesis))
            .map(|s| s.progress_percent())
            .collect();
        assert_eq!(checkpoints, vec![0, 25, 50, 75, 99]);
    }
}
