//! Operant - Goal-Directed Agent Orchestration Core
//!
//! Operant is the planning and model-call core of an agentic system:
//! typed actions, conditions and goals registered into planning scopes,
//! parameter binding against a shared blackboard, prompt-request
//! interception, and a RAG response-enhancement pipeline.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, port traits and errors
//! - **Service Layer** (`services`): Discovery, invocation, chunking,
//!   enhancement and concurrency utilities
//! - **Infrastructure Layer** (`infrastructure`): Config loading and the
//!   test doubles shipped in-tree
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use operant::domain::models::TypeManifest;
//! use operant::services::{ExemplarGenerator, DomainTypeRegistry, MetadataReader};
//!
//! let generator = Arc::new(ExemplarGenerator::new(Arc::new(DomainTypeRegistry::new())));
//! let reader = MetadataReader::new(generator);
//! let scope = reader.read(&TypeManifest::new("Writer"));
//! ```

pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DiscoveryError, InvokeError};
pub use domain::models::{
    Action, ActionOutcome, Agent, AgentScope, Condition, Config, Goal, PromptRequest,
    RagRequest, RagResponse, TypeManifest,
};
pub use domain::ports::{ModelClient, ModelError, TemplateRenderer, ToolCallback, ToolGroup};
pub use infrastructure::{ConfigLoader, MockModelClient, StaticTemplateRenderer};
pub use services::{
    ActionInvoker, Blackboard, ContentChunker, EnhancementPipeline, ExemplarGenerator,
    MetadataReader, OperationContext, PromptRunner, ResponseEnhancer, RetryPolicy, WindowStore,
};
