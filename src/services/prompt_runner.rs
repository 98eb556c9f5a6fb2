//! Prompt runner: the long-lived façade over the model port.
//!
//! A runner is immutable per configuration: every `with_*` call returns a
//! new runner, so configured instances can be shared freely. All model
//! calls go through the configured retry policy and timeout.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::domain::models::{LlmOptions, Message, OutputSpec};
use crate::domain::ports::{ModelClient, ModelError, TemplateRenderer, ToolCallback, ToolGroup};
use crate::services::exemplar::ExemplarGenerator;
use crate::services::retry::{with_timeout, RetryPolicy};

/// Immutable-per-configuration model-call façade.
#[derive(Clone)]
pub struct PromptRunner {
    client: Arc<dyn ModelClient>,
    options: LlmOptions,
    tools: Vec<Arc<dyn ToolCallback>>,
    contributors: Vec<String>,
    generator: Option<Arc<ExemplarGenerator>>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl PromptRunner {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            options: LlmOptions::default(),
            tools: Vec::new(),
            contributors: Vec::new(),
            generator: None,
            renderer: None,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_options(mut self, options: LlmOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a tool, deduplicating by name; the earlier registration wins.
    pub fn with_tool(mut self, tool: Arc<dyn ToolCallback>) -> Self {
        if !self.tools.iter().any(|t| t.name() == tool.name()) {
            self.tools.push(tool);
        }
        self
    }

    pub fn with_tools(mut self, tools: Vec<Arc<dyn ToolCallback>>) -> Self {
        for tool in tools {
            self = self.with_tool(tool);
        }
        self
    }

    pub fn with_tool_group(self, group: &ToolGroup) -> Self {
        self.with_tools(group.tools.clone())
    }

    /// Add a system-prompt contributor.
    pub fn with_contributor(mut self, contributor: impl Into<String>) -> Self {
        self.contributors.push(contributor.into());
        self
    }

    /// Attach an exemplar generator for few-shot output examples.
    pub fn with_generator(mut self, generator: Arc<ExemplarGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn options(&self) -> &LlmOptions {
        &self.options
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Ask the model for a structured value of the given shape.
    pub async fn create_object(
        &self,
        prompt: &str,
        output: &OutputSpec,
    ) -> Result<Value, ModelError> {
        let messages = self.build_messages(prompt, Some(output));
        debug!(output_type = %output.type_name, "Requesting structured object from model");
        self.retry
            .execute(|| async {
                let text = self.complete_once(&messages).await?;
                extract_json(&text)
            })
            .await
    }

    /// Render a named template, then ask for a structured value.
    pub async fn create_object_from_template(
        &self,
        template: &str,
        variables: &HashMap<String, Value>,
        output: &OutputSpec,
    ) -> Result<Value, ModelError> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| ModelError::Provider("no template renderer configured".to_string()))?;
        let prompt = renderer
            .render(template, variables)
            .map_err(|err| ModelError::Provider(err.to_string()))?;
        self.create_object(&prompt, output).await
    }

    /// Ask the model a yes/no question.
    pub async fn evaluate_condition(&self, prompt: &str) -> Result<bool, ModelError> {
        let mut messages = self.build_messages(prompt, None);
        messages.insert(
            0,
            Message::system("Answer with a single word: yes or no."),
        );
        self.retry
            .execute(|| async {
                let text = self.complete_once(&messages).await?;
                parse_verdict(&text)
            })
            .await
    }

    /// Plain text completion (no structured binding).
    pub async fn generate_text(&self, prompt: &str) -> Result<String, ModelError> {
        let messages = self.build_messages(prompt, None);
        self.retry
            .execute(|| async { self.complete_once(&messages).await })
            .await
    }

    async fn complete_once(&self, messages: &[Message]) -> Result<String, ModelError> {
        let limit = Duration::from_secs(
            self.options.timeout_secs.unwrap_or(self.timeout.as_secs()),
        );
        with_timeout(limit, self.client.complete(messages, &self.options)).await
    }

    fn build_messages(&self, prompt: &str, output: Option<&OutputSpec>) -> Vec<Message> {
        let mut system_parts: Vec<String> = self.contributors.clone();

        if !self.tools.is_empty() {
            let manifest = self
                .tools
                .iter()
                .map(|t| format!("- {}: {}", t.name(), t.input_schema()))
                .collect::<Vec<_>>()
                .join("\n");
            system_parts.push(format!("Available tools:\n{manifest}"));
        }

        if let Some(spec) = output {
            system_parts.push(format!(
                "Respond with a single JSON value of type {}. No prose.",
                spec.type_name
            ));
            if let (Some(generator), Some(sketch)) = (&self.generator, &spec.sketch) {
                if let Ok(example) = generator.synthesize(sketch) {
                    system_parts.push(format!("Example of the expected shape:\n{example}"));
                }
            }
        }

        let mut messages = Vec::new();
        if !system_parts.is_empty() {
            messages.push(Message::system(system_parts.join("\n\n")));
        }
        messages.push(Message::user(prompt));
        messages
    }
}

impl fmt::Debug for PromptRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptRunner")
            .field("options", &self.options)
            .field("tools", &self.tools.len())
            .field("contributors", &self.contributors.len())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Pull the first JSON value out of a completion.
///
/// Completions wrapped in prose are tolerated by slicing from the first
/// opening brace/bracket to the last matching close. Text with no JSON
/// structure at all binds as a plain string.
fn extract_json(text: &str) -> Result<Value, ModelError> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                    return Ok(value);
                }
                let snippet: String = trimmed[start..=end].chars().take(200).collect();
                return Err(ModelError::MalformedOutput(format!(
                    "unparseable JSON in completion: {snippet}"
                )));
            }
        }
    }

    if trimmed.is_empty() {
        return Err(ModelError::MalformedOutput("empty completion".to_string()));
    }
    Ok(Value::String(trimmed.to_string()))
}

/// Parse a yes/no completion.
fn parse_verdict(text: &str) -> Result<bool, ModelError> {
    let first = text
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    match first.as_str() {
        "yes" | "true" => Ok(true),
        "no" | "false" => Ok(false),
        other => Err(ModelError::MalformedOutput(format!(
            "expected yes/no, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_handles_plain_objects() {
        let value = extract_json(r#"{"stars": 5}"#).unwrap();
        assert_eq!(value["stars"], 5);
    }

    #[test]
    fn extract_json_slices_out_of_prose() {
        let value = extract_json("Sure! Here you go: {\"stars\": 4} Hope that helps.").unwrap();
        assert_eq!(value["stars"], 4);
    }

    #[test]
    fn extract_json_falls_back_to_string() {
        let value = extract_json("a plain answer").unwrap();
        assert_eq!(value, Value::String("a plain answer".to_string()));
    }

    #[test]
    fn extract_json_rejects_broken_structures() {
        assert!(extract_json("{not json").is_err());
        assert!(extract_json("").is_err());
    }

    #[test]
    fn verdict_parsing() {
        assert!(parse_verdict("Yes.").unwrap());
        assert!(parse_verdict("  yes, definitely").unwrap());
        assert!(!parse_verdict("No").unwrap());
        assert!(!parse_verdict("false").unwrap());
        assert!(parse_verdict("maybe").is_err());
    }
}
