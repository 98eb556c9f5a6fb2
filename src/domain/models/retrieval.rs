//! Retrieval domain models.
//!
//! Everything a retrieval service hands back is a [`Retrievable`] with a
//! stable id and an embeddable string. Responses are immutable; each
//! enhancement stage produces a new response copy recording its name in
//! the enhancement trail.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A bounded unit of retrievable text derived from document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    /// Section or document this chunk was cut from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Chunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: HashMap::new(),
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A fact-like entity record from a structured source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    pub id: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntityData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            labels: Vec::new(),
            properties: HashMap::new(),
            description: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Anything a retrieval service can return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Retrievable {
    Chunk(Chunk),
    Entity(EntityData),
}

impl Retrievable {
    pub fn id(&self) -> &str {
        match self {
            Self::Chunk(chunk) => &chunk.id,
            Self::Entity(entity) => &entity.id,
        }
    }

    /// The string used for similarity search and reranking.
    pub fn embeddable_value(&self) -> String {
        match self {
            Self::Chunk(chunk) => chunk.text.clone(),
            Self::Entity(entity) => match &entity.description {
                Some(description) => description.clone(),
                None => {
                    let props: Vec<String> = entity
                        .properties
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect();
                    format!("{} {}", entity.labels.join(" "), props.join(" "))
                        .trim()
                        .to_string()
                }
            },
        }
    }
}

/// One retrieval hit: a retrievable with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRetrievable {
    pub retrievable: Retrievable,
    /// Similarity in [0, 1]; higher is more relevant.
    pub score: f64,
}

impl ScoredRetrievable {
    pub fn new(retrievable: Retrievable, score: f64) -> Self {
        Self { retrievable, score }
    }
}

/// A retrieval request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagRequest {
    pub query: String,

    /// Minimum similarity for a hit to count, in [0, 1].
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Result-count cap.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Restrict hits to these entity labels, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

fn default_similarity_threshold() -> f64 {
    0.7
}

const fn default_top_k() -> usize {
    8
}

impl RagRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            similarity_threshold: default_similarity_threshold(),
            top_k: default_top_k(),
            labels: None,
        }
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }
}

/// A retrieval response: the originating request plus ordered hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    pub request: RagRequest,
    /// Name of the service that produced the hits.
    pub service: String,
    pub results: Vec<ScoredRetrievable>,
    /// Names of the enhancers applied so far, in order.
    #[serde(default)]
    pub enhancement_trail: Vec<String>,
}

impl RagResponse {
    pub fn new(request: RagRequest, service: impl Into<String>, results: Vec<ScoredRetrievable>) -> Self {
        Self {
            request,
            service: service.into(),
            results,
            enhancement_trail: Vec::new(),
        }
    }

    /// New response copy with replaced results, recording the enhancer.
    pub fn enhanced(&self, enhancer: &str, results: Vec<ScoredRetrievable>) -> Self {
        let mut trail = self.enhancement_trail.clone();
        trail.push(enhancer.to_string());
        Self {
            request: self.request.clone(),
            service: self.service.clone(),
            results,
            enhancement_trail: trail,
        }
    }
}

/// Recommendation attached to an impact estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Apply,
    Skip,
    Conditional,
}

/// Advisory estimate of what an enhancement stage would buy.
///
/// Logged for telemetry; never gates whether the stage runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    /// Expected quality gain in [0, 1].
    pub quality_gain: f64,
    pub latency_ms: u64,
    pub token_cost: u64,
    pub recommendation: Recommendation,
}
