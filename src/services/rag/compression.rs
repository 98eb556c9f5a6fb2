//! Compression enhancer.
//!
//! Rewrites over-length chunks with one query-aware model call each,
//! under bounded parallelism. Chunks at or under the threshold pass
//! through untouched, and a failed per-chunk call degrades to the
//! original chunk rather than failing the stage.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::models::{
    CompressionConfig, ImpactEstimate, RagResponse, Recommendation, Retrievable,
    ScoredRetrievable,
};
use crate::services::parallel::parallel_map;
use crate::services::prompt_runner::PromptRunner;
use crate::services::rag::ResponseEnhancer;

/// Question-aware summarization of over-length chunks.
#[derive(Clone)]
pub struct CompressionEnhancer {
    runner: PromptRunner,
    config: CompressionConfig,
}

impl CompressionEnhancer {
    pub fn new(runner: PromptRunner, config: CompressionConfig) -> Self {
        let runner = match &config.model {
            Some(model) => {
                let options = runner.options().clone().with_model(model.clone());
                runner.with_options(options)
            }
            None => runner,
        };
        Self { runner, config }
    }

    fn eligible(&self, result: &ScoredRetrievable) -> bool {
        matches!(
            &result.retrievable,
            Retrievable::Chunk(chunk) if chunk.text.len() > self.config.max_chars
        )
    }

    fn compression_prompt(&self, query: &str, text: &str) -> String {
        let target_chars =
            (text.len() as f64 * self.config.target_ratio).round() as usize;
        format!(
            "Compress the following passage to roughly {target_chars} characters, \
             keeping every detail relevant to this question and dropping the rest.\n\
             Question: {query}\n\nPassage:\n{text}"
        )
    }

    async fn compress_one(&self, query: &str, result: ScoredRetrievable) -> ScoredRetrievable {
        let Retrievable::Chunk(chunk) = &result.retrievable else {
            return result;
        };

        let prompt = self.compression_prompt(query, &chunk.text);
        match self.runner.generate_text(&prompt).await {
            Ok(compressed) if !compressed.trim().is_empty() => {
                let mut rewritten = chunk.clone();
                rewritten
                    .metadata
                    .insert("compressed".to_string(), json!(true));
                rewritten
                    .metadata
                    .insert("original_chars".to_string(), json!(chunk.text.len()));
                rewritten.text = compressed.trim().to_string();
                ScoredRetrievable::new(Retrievable::Chunk(rewritten), result.score)
            }
            Ok(_) => {
                warn!(chunk = %chunk.id, "Compression returned empty text, keeping original");
                result
            }
            Err(err) => {
                warn!(chunk = %chunk.id, error = %err, "Compression call failed, keeping original");
                result
            }
        }
    }
}

#[async_trait]
impl ResponseEnhancer for CompressionEnhancer {
    fn name(&self) -> &str {
        "compression"
    }

    async fn enhance(&self, response: RagResponse) -> anyhow::Result<RagResponse> {
        let eligible = response.results.iter().filter(|r| self.eligible(r)).count();
        if eligible == 0 {
            return Ok(response);
        }
        debug!(eligible, "Compressing over-length chunks");

        let query = response.request.query.clone();
        let this = self.clone();
        let results = parallel_map(
            response.results.clone(),
            self.config.max_concurrent,
            move |result| {
                let this = this.clone();
                let query = query.clone();
                async move {
                    if this.eligible(&result) {
                        this.compress_one(&query, result).await
                    } else {
                        result
                    }
                }
            },
        )
        .await;

        Ok(response.enhanced(self.name(), results))
    }

    fn estimate_impact(&self, response: &RagResponse) -> Option<ImpactEstimate> {
        let eligible: Vec<usize> = response
            .results
            .iter()
            .filter(|r| self.eligible(r))
            .map(|r| r.retrievable.embeddable_value().len())
            .collect();
        if eligible.is_empty() {
            return Some(ImpactEstimate {
                quality_gain: 0.0,
                latency_ms: 0,
                token_cost: 0,
                recommendation: Recommendation::Skip,
            });
        }
        let chars: usize = eligible.iter().sum();
        Some(ImpactEstimate {
            quality_gain: 0.15,
            latency_ms: 1_200,
            token_cost: (chars / 4) as u64,
            recommendation: Recommendation::Conditional,
        })
    }
}
