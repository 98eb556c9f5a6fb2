//! Static in-memory template renderer.
//!
//! The minimal in-tree implementation of the `TemplateRenderer` port:
//! named templates with `{variable}` substitution. Real deployments can
//! plug in anything that satisfies the port.

use std::collections::HashMap;

use serde_json::Value;

use crate::domain::ports::{TemplateError, TemplateRenderer};

/// Renders templates held in an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateRenderer {
    templates: HashMap<String, String>,
}

impl StaticTemplateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(name.into(), body.into());
        self
    }
}

/// Render a JSON value without quoting plain strings.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl TemplateRenderer for StaticTemplateRenderer {
    fn render(
        &self,
        template: &str,
        variables: &HashMap<String, Value>,
    ) -> Result<String, TemplateError> {
        let body = self
            .templates
            .get(template)
            .ok_or_else(|| TemplateError::UnknownTemplate(template.to_string()))?;

        let mut out = String::with_capacity(body.len());
        let mut rest = body.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                rest = "";
                break;
            };
            let name = &after[..close];
            match variables.get(name) {
                Some(value) => out.push_str(&render_value(value)),
                None => {
                    return Err(TemplateError::UndefinedVariable {
                        template: template.to_string(),
                        variable: name.to_string(),
                    });
                }
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
