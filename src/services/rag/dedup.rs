//! Deduplicating enhancer.
//!
//! Drops results with repeated ids or near-identical text (normalized by
//! case and whitespace). The first occurrence keeps its position and
//! takes the highest score seen among its duplicates.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::models::{ImpactEstimate, RagResponse, Recommendation, ScoredRetrievable};
use crate::services::rag::ResponseEnhancer;

/// Removes duplicate retrieval hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeduplicationEnhancer;

impl DeduplicationEnhancer {
    pub fn new() -> Self {
        Self
    }

    fn duplicate_count(response: &RagResponse) -> usize {
        let mut ids: HashMap<String, ()> = HashMap::new();
        let mut texts: HashMap<String, ()> = HashMap::new();
        let mut duplicates = 0;
        for result in &response.results {
            let id_seen = ids
                .insert(result.retrievable.id().to_string(), ())
                .is_some();
            let text_seen = texts.insert(text_key(result), ()).is_some();
            if id_seen || text_seen {
                duplicates += 1;
            }
        }
        duplicates
    }
}

/// Case- and whitespace-insensitive text key.
fn text_key(result: &ScoredRetrievable) -> String {
    result
        .retrievable
        .embeddable_value()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl ResponseEnhancer for DeduplicationEnhancer {
    fn name(&self) -> &str {
        "dedup"
    }

    async fn enhance(&self, response: RagResponse) -> anyhow::Result<RagResponse> {
        let mut kept: Vec<ScoredRetrievable> = Vec::with_capacity(response.results.len());
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut by_text: HashMap<String, usize> = HashMap::new();

        for result in &response.results {
            let id = result.retrievable.id().to_string();
            let text = text_key(result);

            let existing = by_id.get(&id).or_else(|| by_text.get(&text)).copied();

            match existing {
                Some(index) => {
                    // Duplicate: the survivor takes the best score.
                    if result.score > kept[index].score {
                        kept[index].score = result.score;
                    }
                }
                None => {
                    by_id.insert(id, kept.len());
                    by_text.insert(text, kept.len());
                    kept.push(result.clone());
                }
            }
        }

        if kept.len() == response.results.len() {
            return Ok(response);
        }
        Ok(response.enhanced(self.name(), kept))
    }

    fn estimate_impact(&self, response: &RagResponse) -> Option<ImpactEstimate> {
        let duplicates = Self::duplicate_count(response);
        Some(ImpactEstimate {
            quality_gain: if response.results.is_empty() {
                0.0
            } else {
                duplicates as f64 / response.results.len() as f64
            },
            latency_ms: 0,
            token_cost: 0,
            recommendation: if duplicates > 0 {
                Recommendation::Apply
            } else {
                Recommendation::Skip
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Chunk, RagRequest, Retrievable};

    fn hit(id: &str, text: &str, score: f64) -> ScoredRetrievable {
        ScoredRetrievable::new(Retrievable::Chunk(Chunk::new(id, text)), score)
    }

    fn response(results: Vec<ScoredRetrievable>) -> RagResponse {
        RagResponse::new(RagRequest::new("query"), "test", results)
    }

    #[tokio::test]
    async fn repeated_ids_collapse_to_the_best_score() {
        let input = response(vec![
            hit("a", "first text", 0.4),
            hit("b", "second text", 0.9),
            hit("a", "first text again", 0.8),
        ]);

        let out = DeduplicationEnhancer::new().enhance(input).await.unwrap();
        assert_eq!(out.results.len(), 2);
        assert_eq!(out.results[0].retrievable.id(), "a");
        assert!((out.results[0].score - 0.8).abs() < f64::EPSILON);
        assert_eq!(out.enhancement_trail, vec!["dedup"]);
    }

    #[tokio::test]
    async fn near_identical_text_is_collapsed() {
        let input = response(vec![
            hit("a", "The Same   Text", 0.5),
            hit("b", "the same text", 0.6),
        ]);

        let out = DeduplicationEnhancer::new().enhance(input).await.unwrap();
        assert_eq!(out.results.len(), 1);
        assert_eq!(out.results[0].retrievable.id(), "a");
        assert!((out.results[0].score - 0.6).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn clean_responses_pass_through_untouched() {
        let input = response(vec![hit("a", "one", 0.5), hit("b", "two", 0.4)]);
        let out = DeduplicationEnhancer::new().enhance(input.clone()).await.unwrap();
        assert_eq!(out, input);
        assert!(out.enhancement_trail.is_empty());
    }

    #[test]
    fn impact_recommends_skip_when_clean() {
        let input = response(vec![hit("a", "one", 0.5)]);
        let estimate = DeduplicationEnhancer::new().estimate_impact(&input).unwrap();
        assert_eq!(estimate.recommendation, Recommendation::Skip);
    }
}
