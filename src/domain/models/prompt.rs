//! Prompt and model-call value objects.
//!
//! Business logic never invokes the model directly. An action or condition
//! handler that needs a model call returns the `Prompt` variant of its
//! outcome, carrying a [`PromptRequest`] that the invoker converts into a
//! real call. The request can therefore never escape the invoker boundary:
//! it is data, not control flow.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::domain::models::sketch::TypeSketch;
use crate::domain::ports::ToolCallback;

/// Message role in a model conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a model conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Parameters controlling a model invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmOptions {
    /// Model identifier, substrate-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Per-call timeout override in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Additional substrate-specific parameters.
    #[serde(flatten, default)]
    pub extra: HashMap<String, Value>,
}

impl LlmOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Merge with ambient options: explicitly-set fields win over ambient
    /// ones.
    pub fn or(&self, ambient: &Self) -> Self {
        Self {
            model: self.model.clone().or_else(|| ambient.model.clone()),
            temperature: self.temperature.or(ambient.temperature),
            max_tokens: self.max_tokens.or(ambient.max_tokens),
            timeout_secs: self.timeout_secs.or(ambient.timeout_secs),
            extra: {
                let mut merged = ambient.extra.clone();
                merged.extend(self.extra.clone());
                merged
            },
        }
    }
}

/// Shape of the value a model call is expected to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Logical type name the result binds to.
    pub type_name: String,

    /// Optional structural sketch, used to render a few-shot JSON example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sketch: Option<TypeSketch>,
}

impl OutputSpec {
    pub fn of(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            sketch: None,
        }
    }

    pub fn with_sketch(mut self, sketch: TypeSketch) -> Self {
        self.sketch = Some(sketch);
        self
    }
}

/// A model call described by business logic and performed by the invoker.
#[derive(Clone)]
pub struct PromptRequest {
    /// The user-level prompt text.
    pub prompt: String,

    /// Options for this call; fields left unset fall back to the ambient
    /// context options.
    pub options: Option<LlmOptions>,

    /// Expected output shape.
    pub output: OutputSpec,

    /// Named tool groups required for this call, merged with context-level
    /// groups at invocation time.
    pub tool_groups: Vec<String>,

    /// Literal tool callbacks carried with the request.
    pub tools: Vec<Arc<dyn ToolCallback>>,

    /// When false, a failed model call yields no value instead of an error.
    pub require_result: bool,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>, output: OutputSpec) -> Self {
        Self {
            prompt: prompt.into(),
            options: None,
            output,
            tool_groups: Vec::new(),
            tools: Vec::new(),
            require_result: true,
        }
    }

    pub fn with_options(mut self, options: LlmOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_tool_group(mut self, group: impl Into<String>) -> Self {
        self.tool_groups.push(group.into());
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn ToolCallback>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn optional_result(mut self) -> Self {
        self.require_result = false;
        self
    }
}

impl fmt::Debug for PromptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptRequest")
            .field("prompt", &self.prompt)
            .field("options", &self.options)
            .field("output", &self.output)
            .field("tool_groups", &self.tool_groups)
            .field("tools", &self.tools.len())
            .field("require_result", &self.require_result)
            .finish()
    }
}

/// What an action handler produced: a value, or a request for a model call.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// The handler computed the result itself.
    Direct(Value),
    /// The handler wants the invoker to perform a model call and bind its
    /// structured result as the action's return value.
    Prompt(PromptRequest),
}

impl ActionOutcome {
    /// Wrap any serializable value as a direct outcome.
    pub fn value<T: Serialize>(value: &T) -> anyhow::Result<Self> {
        Ok(Self::Direct(serde_json::to_value(value)?))
    }
}

impl From<PromptRequest> for ActionOutcome {
    fn from(request: PromptRequest) -> Self {
        Self::Prompt(request)
    }
}

/// What a condition handler produced: a verdict, or a model call whose
/// yes/no answer becomes the verdict.
#[derive(Debug, Clone)]
pub enum ConditionOutcome {
    Direct(bool),
    Prompt(PromptRequest),
}

impl From<bool> for ConditionOutcome {
    fn from(verdict: bool) -> Self {
        Self::Direct(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_merge_prefers_explicit_fields() {
        let ambient = LlmOptions::default()
            .with_model("ambient-model")
            .with_temperature(0.7);
        let explicit = LlmOptions::default().with_model("explicit-model");

        let merged = explicit.or(&ambient);
        assert_eq!(merged.model.as_deref(), Some("explicit-model"));
        assert_eq!(merged.temperature, Some(0.7));
    }

    #[test]
    fn prompt_request_defaults_to_requiring_a_result() {
        let req = PromptRequest::new("summarize", OutputSpec::of("Summary"));
        assert!(req.require_result);
        assert!(!req.optional_result().require_result);
    }

    #[test]
    fn outcome_value_serializes() {
        let out = ActionOutcome::value(&42).unwrap();
        match out {
            ActionOutcome::Direct(v) => assert_eq!(v, serde_json::json!(42)),
            ActionOutcome::Prompt(_) => panic!("expected direct"),
        }
    }
}
