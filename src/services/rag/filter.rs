//! Filtering enhancer.
//!
//! Applies the request's own constraints to the result list: hits under
//! the similarity threshold are dropped, and when a label filter is set,
//! labeled hits outside it are dropped. Unlabeled hits always pass a
//! label filter.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::models::{
    ImpactEstimate, RagResponse, Recommendation, Retrievable, ScoredRetrievable,
};
use crate::services::rag::ResponseEnhancer;

/// Enforces the request's similarity threshold and label filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEnhancer;

impl FilterEnhancer {
    pub fn new() -> Self {
        Self
    }

    fn passes(result: &ScoredRetrievable, threshold: f64, labels: Option<&[String]>) -> bool {
        if result.score < threshold {
            return false;
        }
        let Some(wanted) = labels else {
            return true;
        };
        match item_labels(&result.retrievable) {
            None => true,
            Some(labels) => labels.iter().any(|l| wanted.contains(l)),
        }
    }
}

/// Labels on a hit: entity labels, or a chunk's `labels` metadata entry.
fn item_labels(retrievable: &Retrievable) -> Option<Vec<String>> {
    match retrievable {
        Retrievable::Entity(entity) => {
            if entity.labels.is_empty() {
                None
            } else {
                Some(entity.labels.clone())
            }
        }
        Retrievable::Chunk(chunk) => chunk.metadata.get("labels").and_then(|value| {
            let labels: Vec<String> = value
                .as_array()?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            if labels.is_empty() {
                None
            } else {
                Some(labels)
            }
        }),
    }
}

#[async_trait]
impl ResponseEnhancer for FilterEnhancer {
    fn name(&self) -> &str {
        "filter"
    }

    async fn enhance(&self, response: RagResponse) -> anyhow::Result<RagResponse> {
        let threshold = response.request.similarity_threshold;
        let labels = response.request.labels.clone();

        let kept: Vec<ScoredRetrievable> = response
            .results
            .iter()
            .filter(|r| Self::passes(r, threshold, labels.as_deref()))
            .cloned()
            .collect();

        if kept.len() == response.results.len() {
            return Ok(response);
        }
        Ok(response.enhanced(self.name(), kept))
    }

    fn estimate_impact(&self, response: &RagResponse) -> Option<ImpactEstimate> {
        let threshold = response.request.similarity_threshold;
        let labels = response.request.labels.clone();
        let dropped = response
            .results
            .iter()
            .filter(|r| !Self::passes(r, threshold, labels.as_deref()))
            .count();
        Some(ImpactEstimate {
            quality_gain: if response.results.is_empty() {
                0.0
            } else {
                dropped as f64 / response.results.len() as f64
            },
            latency_ms: 0,
            token_cost: 0,
            recommendation: if dropped > 0 {
                Recommendation::Apply
            } else {
                Recommendation::Skip
            },
        })
    }
}
