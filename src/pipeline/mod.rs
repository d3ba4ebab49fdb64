//! Staged recommendation generation

pub mod progress;
pub mod runner;
pub mod stage;

pub use progress::{IndicatifProgress, NoopProgress, ProgressReporter};
pub use runner::{PipelineRunState, RecommendationPipeline};
pub use stage::{AnalysisResult, Stage};
