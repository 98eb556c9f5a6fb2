//! Model invocation port.
//!
//! The narrow seam to whatever actually talks to a language model. The
//! core never imports a provider SDK; it sends messages and options
//! through this trait and gets text back.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{LlmOptions, Message};

/// Errors from a model invocation.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model call timed out after {0}s")]
    Timeout(u64),

    #[error("Model call was interrupted")]
    Interrupted,

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Model output could not be parsed: {0}")]
    MalformedOutput(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl ModelError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Timeouts, interruptions, rate limits and malformed output are all
    /// transient; provider errors are treated as permanent.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Interrupted | Self::RateLimited(_) | Self::MalformedOutput(_)
        )
    }
}

/// Port trait for model invocation.
///
/// Implementations must be `Send + Sync` for concurrent use across tokio
/// tasks. Structured outputs are produced by the caller parsing the
/// returned text; the port itself only moves strings.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Perform one model call and return the completion text.
    async fn complete(&self, messages: &[Message], options: &LlmOptions)
        -> Result<String, ModelError>;
}
