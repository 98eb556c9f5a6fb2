//! Template rendering port.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

/// Errors from template rendering.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template '{template}' references undefined variable '{variable}'")]
    UndefinedVariable { template: String, variable: String },
}

/// Port trait for rendering named prompt templates.
pub trait TemplateRenderer: Send + Sync {
    /// Render the named template with the given variables.
    fn render(
        &self,
        template: &str,
        variables: &HashMap<String, Value>,
    ) -> Result<String, TemplateError>;
}
