//! RAG response enhancement.
//!
//! Pluggable transforms applied to a retrieval response before it is used
//! for generation, composed by [`EnhancementPipeline`] in strict order.

pub mod compression;
pub mod dedup;
pub mod filter;
pub mod pipeline;
pub mod rerank;

use async_trait::async_trait;

use crate::domain::models::{ImpactEstimate, RagResponse};

pub use compression::CompressionEnhancer;
pub use dedup::DeduplicationEnhancer;
pub use filter::FilterEnhancer;
pub use pipeline::{EnhancementPipeline, StageReport};
pub use rerank::RerankingEnhancer;

/// A single enhancement stage.
#[async_trait]
pub trait ResponseEnhancer: Send + Sync {
    /// Stable stage name, recorded in the response's enhancement trail.
    fn name(&self) -> &str;

    /// Transform a response into its enhanced successor.
    ///
    /// Implementations that degrade internally (for example on a failed
    /// model call) should return the input unchanged rather than erroring;
    /// errors that do surface are caught by the pipeline and also degrade
    /// to pass-through.
    async fn enhance(&self, response: RagResponse) -> anyhow::Result<RagResponse>;

    /// Advisory estimate of what this stage would buy on this response.
    ///
    /// Used for logging and telemetry only; never gates execution.
    fn estimate_impact(&self, _response: &RagResponse) -> Option<ImpactEstimate> {
        None
    }
}
