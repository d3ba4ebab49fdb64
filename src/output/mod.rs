//! Recommendation post-processing and report rendering

pub mod formatter;
pub mod pdf;
pub mod postprocess;
pub mod report;

pub use postprocess::clean;
pub use report::RecommendationReport;
