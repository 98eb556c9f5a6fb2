//! Mock model client for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::models::{LlmOptions, Message};
use crate::domain::ports::{ModelClient, ModelError};

/// One scripted reply.
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    /// Permanent failure (not retried).
    Fail(String),
    /// Transient failure (retried by the caller's policy).
    FailTransient(String),
}

/// A recorded model invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub options: LlmOptions,
}

impl RecordedCall {
    /// Full prompt text, all messages concatenated.
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Mock model client with scripted responses and a call log.
///
/// Scripted responses are consumed in order; once the script runs out the
/// default response is returned.
pub struct MockModelClient {
    script: Arc<RwLock<VecDeque<MockReply>>>,
    default_reply: MockReply,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_reply: MockReply::Text("ok".to_string()),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Client that replies with the given texts in order.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            script: Arc::new(RwLock::new(
                responses.into_iter().map(MockReply::Text).collect(),
            )),
            default_reply: MockReply::Text("ok".to_string()),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Client whose every call fails permanently.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_reply: MockReply::Fail(error.into()),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Queue one more scripted reply.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.script.write().await.push_back(MockReply::Text(text.into()));
    }

    /// Queue a transient failure, then recovery happens via later replies.
    pub async fn push_transient_failure(&self, error: impl Into<String>) {
        self.script
            .write()
            .await
            .push_back(MockReply::FailTransient(error.into()));
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: &LlmOptions,
    ) -> Result<String, ModelError> {
        self.calls.write().await.push(RecordedCall {
            messages: messages.to_vec(),
            options: options.clone(),
        });

        let reply = self
            .script
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(error) => Err(ModelError::Provider(error)),
            MockReply::FailTransient(error) => Err(ModelError::RateLimited(error)),
        }
    }
}
