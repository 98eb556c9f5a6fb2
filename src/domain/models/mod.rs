pub mod action;
pub mod agent;
pub mod condition;
pub mod config;
pub mod document;
pub mod goal;
pub mod manifest;
pub mod prompt;
pub mod retrieval;
pub mod sketch;

pub use action::{
    Action, ActionHandler, ActionMetadata, IoBinding, ParamResolution, DEFAULT_BINDING,
};
pub use agent::{Agent, AgentMarker, AgentScope, ScopeOutput};
pub use condition::{Condition, ConditionHandler, ConditionMetadata};
pub use config::{
    ChunkerConfig, CompressionConfig, Config, LlmConfig, RerankConfig, RetryConfig, StoreConfig,
};
pub use document::{ContainerSection, LeafSection, Section};
pub use goal::{ran_marker, Goal};
pub use manifest::{
    AchievesGoal, ActionDraft, ConditionDraft, ParamDraft, ParamKind, TypeManifest,
};
pub use prompt::{
    ActionOutcome, ConditionOutcome, LlmOptions, Message, OutputSpec, PromptRequest, Role,
};
pub use retrieval::{
    Chunk, EntityData, ImpactEstimate, RagRequest, RagResponse, Recommendation, Retrievable,
    ScoredRetrievable,
};
pub use sketch::{FieldSketch, TypeSketch};
