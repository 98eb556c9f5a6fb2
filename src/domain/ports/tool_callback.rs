//! Tool callback port.
//!
//! A tool callback is a named, schema-described function the model may
//! invoke during generation. The core only groups, deduplicates and
//! forwards them; execution semantics belong to the implementation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from a tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool input did not match the schema: {0}")]
    InvalidInput(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),
}

/// Port trait for a callable tool.
#[async_trait]
pub trait ToolCallback: Send + Sync {
    /// Unique tool name; duplicates across groups are collapsed by name.
    fn name(&self) -> &str;

    /// JSON schema of the tool's input object.
    fn input_schema(&self) -> Value;

    /// Execute the tool against validated input.
    async fn call(&self, input: &Value) -> Result<String, ToolError>;
}

impl fmt::Debug for dyn ToolCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ToolCallback({})", self.name())
    }
}

/// A named group of tool callbacks.
#[derive(Clone, Default)]
pub struct ToolGroup {
    pub name: String,
    pub tools: Vec<Arc<dyn ToolCallback>>,
}

impl ToolGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn ToolCallback>) -> Self {
        self.tools.push(tool);
        self
    }
}

impl fmt::Debug for ToolGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolGroup")
            .field("name", &self.name)
            .field("tools", &self.tools.len())
            .finish()
    }
}
