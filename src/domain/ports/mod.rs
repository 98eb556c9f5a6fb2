//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the trait interfaces the core consumes but never
//! implements beyond test doubles:
//! - `ModelClient`: model invocation
//! - `ToolCallback`: schema-described functions exposed to the model
//! - `TemplateRenderer`: prompt template rendering
//!
//! These contracts keep the domain independent of any provider SDK,
//! web framework or persistence layer.

pub mod model_client;
pub mod template;
pub mod tool_callback;

pub use model_client::{ModelClient, ModelError};
pub use template::{TemplateError, TemplateRenderer};
pub use tool_callback::{ToolCallback, ToolError, ToolGroup};
