//! Five-stage retention recommendation pipeline

use crate::error::{Result, RetentionError};
use crate::llm::prompts::{render_stage_prompt, render_synthesis_prompt};
use crate::llm::query::DocumentQueryService;
use crate::pipeline::progress::ProgressReporter;
use crate::pipeline::stage::{AnalysisResult, Stage};
use futures::StreamExt;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_PIPELINE_TIMEOUT: Duration = Duration::from_secs(120);

/// Accumulated stage outputs of one run
#[derive(Debug, Clone)]
pub struct PipelineRunState {
    snapshot: String,
    results: BTreeMap<Stage, String>,
}

impl PipelineRunState {
    pub fn new(snapshot: &str) -> Self {
        Self {
            snapshot: snapshot.to_string(),
            results: BTreeMap::new(),
        }
    }

    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn record(&mut self, result: AnalysisResult) {
        self.results.insert(result.stage, result.text);
    }

    /// Text of a finished stage; empty if the stage degraded or has not run
    pub fn text(&self, stage: Stage) -> &str {
        self.results.get(&stage).map(String::as_str).unwrap_or("")
    }

    /// The four analyses in stage order, degraded ones included
    pub fn analyses(&self) -> Vec<(Stage, &str)> {
        Stage::ANALYSES.iter().map(|&stage| (stage, self.text(stage))).collect()
    }

    pub fn degraded_stages(&self) -> Vec<Stage> {
        self.results
            .iter()
            .filter(|(_, text)| text.is_empty())
            .map(|(stage, _)| *stage)
            .collect()
    }

    pub fn into_recommendation(mut self) -> String {
        self.results.remove(&Stage::Synthesis).unwrap_or_default()
    }
}

struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RetentionError::RunInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct RecommendationPipeline {
    service: Arc<dyn DocumentQueryService>,
    progress: Arc<dyn ProgressReporter>,
    timeout: Duration,
    running: AtomicBool,
}

impl RecommendationPipeline {
    pub fn new(service: Arc<dyn DocumentQueryService>, progress: Arc<dyn ProgressReporter>) -> Self {
        Self {
            service,
            progress,
            timeout: DEFAULT_PIPELINE_TIMEOUT,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run all five stages for `snapshot` within the configured timeout
    pub async fn run_pipeline(&self, snapshot: &str) -> Result<String> {
        self.run_pipeline_with_timeout(snapshot, self.timeout).await
    }

    pub async fn run_pipeline_with_timeout(&self, snapshot: &str, budget: Duration) -> Result<String> {
        let _guard = RunGuard::acquire(&self.running)?;
        self.service.ensure_ready()?;

        let start = Instant::now();
        let outcome = tokio::time::timeout(budget, self.run_stages(snapshot)).await;
        self.progress.clear();

        match outcome {
            Ok(state) => {
                let degraded = state.degraded_stages();
                if !degraded.is_empty() {
                    warn!("Run completed with degraded stages: {:?}", degraded);
                }
                info!("Recommendation pipeline finished in {:.2?}", start.elapsed());
                Ok(state.into_recommendation())
            }
            Err(_) => {
                let err = RetentionError::PipelineTimeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                    budget_ms: budget.as_millis() as u64,
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    async fn run_stages(&self, snapshot: &str) -> PipelineRunState {
        let mut state = PipelineRunState::new(snapshot);

        let mut stage = Some(Stage::FIRST);
        while let Some(current) = stage {
            let prompt = match render_stage_prompt(current, state.snapshot()) {
                Some(prompt) => prompt,
                None => render_synthesis_prompt(&state.analyses()),
            };
            let result = self.run_stage(current, &prompt).await;
            state.record(result);
            stage = current.next();
        }
        state
    }

    async fn run_stage(&self, stage: Stage, prompt: &str) -> AnalysisResult {
        self.progress.report(stage.progress_percent(), stage.progress_label());
        debug!("{} stage started ({} char prompt)", stage, prompt.len());

        let text = match self.query_stage(stage, prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("{}; continuing with empty output", e);
                String::new()
            }
        };
        AnalysisResult { stage, text }
    }

    async fn query_stage(&self, stage: Stage, prompt: &str) -> Result<String> {
        let failure = |reason: String| RetentionError::StageQueryFailure { stage, reason };

        let mut stream = self.service.query(prompt).await.map_err(|e| failure(e.to_string()))?;

        let mut text = String::new();
        let mut fragments = 0usize;
        while let Some(fragment) = stream.next().await {
            let fragment = fragment.map_err(|e| failure(format!("stream interrupted: {}", e)))?;
            text.push_str(&fragment);
            fragments += 1;
        }

        if text.is_empty() {
            return Err(failure("empty response".to_string()));
        }

        debug!("{} stage finished: {} fragments, {} chars", stage, fragments, text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_orders_analyses() {
        let mut state = PipelineRunState::new("snapshot");
        state.record(AnalysisResult {
            stage: Stage::Survey,
            text: "survey".to_string(),
        });
        state.record(AnalysisResult {
            stage: Stage::Compensation,
            text: "comp".to_string(),
        });

        let analyses = state.analyses();
        assert_eq!(analyses[0], (Stage::Compensation, "comp"));
        assert_eq!(analyses[1], (Stage::Reviews, ""));
        assert_eq!(analyses[3], (Stage::Survey, "survey"));
        assert_eq!(state.into_recommendation(), "");
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _guard = RunGuard::acquire(&flag).unwrap();
            assert!(matches!(RunGuard::acquire(&flag), Err(RetentionError::RunInProgress)));
        }
        assert!(RunGuard::acquire(&flag).is_ok());
    }
}
