//! Enhancement pipeline.
//!
//! Runs enhancers strictly in sequence: each stage's output response is
//! the next stage's input, so reranking sees deduplicated and compressed
//! text rather than raw chunks. A failing stage is logged and degrades to
//! passing its input through; a single enhancer must never fail the
//! overall retrieval.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::domain::models::RagResponse;
use crate::services::rag::ResponseEnhancer;

/// What one stage did to the response.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: String,
    pub results_in: usize,
    pub results_out: usize,
    pub elapsed_ms: u128,
    /// True when the stage failed and its input was passed through.
    pub degraded: bool,
}

/// An ordered, configurable sequence of response enhancers.
#[derive(Clone, Default)]
pub struct EnhancementPipeline {
    enhancers: Vec<Arc<dyn ResponseEnhancer>>,
}

impl EnhancementPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enhancer(mut self, enhancer: Arc<dyn ResponseEnhancer>) -> Self {
        self.enhancers.push(enhancer);
        self
    }

    pub fn len(&self) -> usize {
        self.enhancers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enhancers.is_empty()
    }

    /// Run every stage in order, collecting per-stage reports.
    pub async fn run(&self, mut response: RagResponse) -> (RagResponse, Vec<StageReport>) {
        let mut reports = Vec::with_capacity(self.enhancers.len());

        for enhancer in &self.enhancers {
            if let Some(estimate) = enhancer.estimate_impact(&response) {
                debug!(
                    stage = enhancer.name(),
                    quality_gain = estimate.quality_gain,
                    latency_ms = estimate.latency_ms,
                    token_cost = estimate.token_cost,
                    recommendation = ?estimate.recommendation,
                    "Stage impact estimate"
                );
            }

            let results_in = response.results.len();
            let start = Instant::now();
            let (next, degraded) = match enhancer.enhance(response.clone()).await {
                Ok(next) => (next, false),
                Err(err) => {
                    warn!(
                        stage = enhancer.name(),
                        error = %err,
                        "Enhancement stage failed, passing response through"
                    );
                    (response.clone(), true)
                }
            };

            reports.push(StageReport {
                stage: enhancer.name().to_string(),
                results_in,
                results_out: next.results.len(),
                elapsed_ms: start.elapsed().as_millis(),
                degraded,
            });
            response = next;
        }

        (response, reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Chunk, RagRequest, Retrievable, ScoredRetrievable};
    use crate::services::rag::DeduplicationEnhancer;
    use async_trait::async_trait;

    struct Failing;

    #[async_trait]
    impl ResponseEnhancer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn enhance(&self, _response: RagResponse) -> anyhow::Result<RagResponse> {
            anyhow::bail!("stage exploded")
        }
    }

    struct Tagging(&'static str);

    #[async_trait]
    impl ResponseEnhancer for Tagging {
        fn name(&self) -> &str {
            self.0
        }

        async fn enhance(&self, response: RagResponse) -> anyhow::Result<RagResponse> {
            let results = response.results.clone();
            Ok(response.enhanced(self.0, results))
        }
    }

    fn response() -> RagResponse {
        RagResponse::new(
            RagRequest::new("q"),
            "test",
            vec![
                ScoredRetrievable::new(Retrievable::Chunk(Chunk::new("a", "text a")), 0.9),
                ScoredRetrievable::new(Retrievable::Chunk(Chunk::new("a", "text a")), 0.7),
            ],
        )
    }

    #[tokio::test]
    async fn stages_run_in_registration_order() {
        let pipeline = EnhancementPipeline::new()
            .with_enhancer(Arc::new(Tagging("first")))
            .with_enhancer(Arc::new(Tagging("second")))
            .with_enhancer(Arc::new(Tagging("third")));

        let (out, reports) = pipeline.run(response()).await;

        assert_eq!(out.enhancement_trail, vec!["first", "second", "third"]);
        let stages: Vec<&str> = reports.iter().map(|r| r.stage.as_str()).collect();
        assert_eq!(stages, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn a_failing_stage_degrades_to_passthrough() {
        let pipeline = EnhancementPipeline::new()
            .with_enhancer(Arc::new(DeduplicationEnhancer::new()))
            .with_enhancer(Arc::new(Failing))
            .with_enhancer(Arc::new(Tagging("after")));

        let (out, reports) = pipeline.run(response()).await;

        // Dedup collapsed the duplicate, the failing stage changed
        // nothing, and the final stage still ran.
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.enhancement_trail, vec!["dedup", "after"]);
        assert!(reports[1].degraded);
        assert!(!reports[0].degraded);
        assert!(!reports[2].degraded);
    }

    #[tokio::test]
    async fn reports_track_result_counts() {
        let pipeline =
            EnhancementPipeline::new().with_enhancer(Arc::new(DeduplicationEnhancer::new()));

        let (_, reports) = pipeline.run(response()).await;

        assert_eq!(reports[0].results_in, 2);
        assert_eq!(reports[0].results_out, 1);
    }

    #[tokio::test]
    async fn empty_pipeline_is_identity() {
        let pipeline = EnhancementPipeline::new();
        let input = response();
        let (out, reports) = pipeline.run(input.clone()).await;
        assert_eq!(out, input);
        assert!(reports.is_empty());
    }
}
