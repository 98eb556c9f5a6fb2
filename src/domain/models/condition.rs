//! Condition domain model.
//!
//! A condition is a named boolean predicate over process state, evaluated
//! (never mutated) during planning.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::models::action::ParamResolution;
use crate::domain::models::prompt::ConditionOutcome;

/// Declarative description of a condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionMetadata {
    /// Globally unique qualified name: `<type>.<method>`.
    pub name: String,

    /// Evaluation cost used by the planner.
    pub cost: f64,
}

/// Handler invoked with resolved arguments in declared parameter order.
pub type ConditionHandler =
    Arc<dyn Fn(&[Value]) -> anyhow::Result<ConditionOutcome> + Send + Sync>;

/// An evaluable condition: immutable metadata plus its handler.
#[derive(Clone)]
pub struct Condition {
    pub metadata: ConditionMetadata,
    /// Per-parameter resolution rules, in declared order.
    pub params: Vec<ParamResolution>,
    handler: ConditionHandler,
}

impl Condition {
    pub fn new(
        metadata: ConditionMetadata,
        params: Vec<ParamResolution>,
        handler: ConditionHandler,
    ) -> Self {
        Self {
            metadata,
            params,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Run the handler against already-resolved arguments.
    pub fn call(&self, args: &[Value]) -> anyhow::Result<ConditionOutcome> {
        (self.handler)(args)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("metadata", &self.metadata)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
