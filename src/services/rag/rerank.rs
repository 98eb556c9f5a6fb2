//! Reranking enhancer.
//!
//! Scores the top results with one model call and blends the returned
//! relevance with the original similarity. Skipped entirely for small
//! result sets, and degrades to a no-op when the scoring call fails:
//! a broken reranker must not fail the retrieval.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::models::{
    ImpactEstimate, OutputSpec, RagResponse, Recommendation, RerankConfig, ScoredRetrievable,
};
use crate::services::prompt_runner::PromptRunner;
use crate::services::rag::ResponseEnhancer;

/// How much of each result's text goes into the scoring prompt.
const SCORING_EXCERPT_CHARS: usize = 500;

/// Blends model-assigned relevance into result ordering.
pub struct RerankingEnhancer {
    runner: PromptRunner,
    config: RerankConfig,
}

impl RerankingEnhancer {
    pub fn new(runner: PromptRunner, config: RerankConfig) -> Self {
        let runner = match &config.model {
            Some(model) => {
                let options = runner.options().clone().with_model(model.clone());
                runner.with_options(options)
            }
            None => runner,
        };
        Self { runner, config }
    }

    fn scoring_prompt(&self, response: &RagResponse, top: usize) -> String {
        let items = response.results[..top]
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let excerpt: String = result
                    .retrievable
                    .embeddable_value()
                    .chars()
                    .take(SCORING_EXCERPT_CHARS)
                    .collect();
                format!("[{i}] {excerpt}")
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Rate the relevance of each passage to the query on a scale of 0.0 to 1.0.\n\
             Query: {}\n\nPassages:\n{items}\n\n\
             Respond with a JSON array of exactly {top} numbers, one per passage, in order.",
            response.request.query
        )
    }

    /// Parse the scoring call's JSON array into per-result scores.
    fn parse_scores(value: &Value, expected: usize) -> Option<Vec<f64>> {
        let array = value.as_array()?;
        if array.len() != expected {
            return None;
        }
        array.iter().map(Value::as_f64).collect()
    }

    fn blend(&self, original: f64, llm: f64) -> f64 {
        (self.config.original_weight * original + self.config.llm_weight * llm).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl ResponseEnhancer for RerankingEnhancer {
    fn name(&self) -> &str {
        "rerank"
    }

    async fn enhance(&self, response: RagResponse) -> anyhow::Result<RagResponse> {
        let count = response.results.len();
        if count <= self.config.skip_threshold {
            debug!(count, threshold = self.config.skip_threshold, "Reranking skipped");
            return Ok(response);
        }

        let top = self.config.top_n.min(count);
        let prompt = self.scoring_prompt(&response, top);

        let options = self.runner.options().clone().with_temperature(0.0);
        let scored = self
            .runner
            .clone()
            .with_options(options)
            .create_object(&prompt, &OutputSpec::of("RelevanceScores"))
            .await;

        let scores = match scored {
            Ok(value) => match Self::parse_scores(&value, top) {
                Some(scores) => scores,
                None => {
                    warn!("Reranking scores were malformed, passing response through");
                    return Ok(response);
                }
            },
            Err(err) => {
                warn!(error = %err, "Reranking call failed, passing response through");
                return Ok(response);
            }
        };

        let mut results: Vec<ScoredRetrievable> = response.results.clone();
        for (result, llm_score) in results.iter_mut().zip(scores.iter()) {
            result.score = self.blend(result.score, llm_score.clamp(0.0, 1.0));
        }
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(response.enhanced(self.name(), results))
    }

    fn estimate_impact(&self, response: &RagResponse) -> Option<ImpactEstimate> {
        let count = response.results.len();
        if count <= self.config.skip_threshold {
            return Some(ImpactEstimate {
                quality_gain: 0.0,
                latency_ms: 0,
                token_cost: 0,
                recommendation: Recommendation::Skip,
            });
        }
        let top = self.config.top_n.min(count) as u64;
        Some(ImpactEstimate {
            quality_gain: 0.2,
            latency_ms: 800,
            token_cost: top * (SCORING_EXCERPT_CHARS as u64 / 4),
            recommendation: Recommendation::Apply,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Chunk, RagRequest, Retrievable};
    use crate::infrastructure::model::MockModelClient;
    use std::sync::Arc;

    fn hit(id: &str, score: f64) -> ScoredRetrievable {
        ScoredRetrievable::new(
            Retrievable::Chunk(Chunk::new(id, format!("passage {id}"))),
            score,
        )
    }

    fn response(n: usize) -> RagResponse {
        let results = (0..n)
            .map(|i| hit(&format!("r{i}"), 0.5 + i as f64 * 0.01))
            .collect();
        RagResponse::new(RagRequest::new("what is rust"), "test", results)
    }

    fn enhancer(client: Arc<MockModelClient>) -> RerankingEnhancer {
        RerankingEnhancer::new(PromptRunner::new(client), RerankConfig::default())
    }

    #[tokio::test]
    async fn small_result_sets_skip_the_model_entirely() {
        let client = Arc::new(MockModelClient::new());
        let input = response(3);

        let out = enhancer(client.clone()).enhance(input.clone()).await.unwrap();

        assert_eq!(out, input);
        assert_eq!(client.call_count().await, 0);
    }

    #[tokio::test]
    async fn results_reorder_by_blended_score() {
        // Model reverses the original preference: last passage scores 1.0.
        let client = Arc::new(MockModelClient::with_responses(vec![
            "[0.0, 0.2, 0.4, 0.6, 1.0]".to_string(),
        ]));
        let input = response(5);

        let out = enhancer(client.clone()).enhance(input).await.unwrap();

        assert_eq!(client.call_count().await, 1);
        assert_eq!(out.results[0].retrievable.id(), "r4");
        // blend: 0.3 * 0.54 + 0.7 * 1.0
        assert!((out.results[0].score - 0.862).abs() < 1e-9);
        let mut sorted = out.results.clone();
        sorted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        assert_eq!(out.results, sorted);
        assert_eq!(out.enhancement_trail, vec!["rerank"]);
    }

    #[tokio::test]
    async fn failed_scoring_degrades_to_passthrough() {
        let client = Arc::new(MockModelClient::failing("model unavailable"));
        let input = response(6);

        let out = enhancer(client).enhance(input.clone()).await.unwrap();
        assert_eq!(out, input);
        assert!(out.enhancement_trail.is_empty());
    }

    #[tokio::test]
    async fn malformed_scores_degrade_to_passthrough() {
        // Wrong arity: three scores for five passages.
        let client = Arc::new(MockModelClient::with_responses(vec![
            "[0.1, 0.2, 0.3]".to_string(),
        ]));
        let input = response(5);

        let out = enhancer(client).enhance(input.clone()).await.unwrap();
        assert_eq!(out, input);
    }
}
