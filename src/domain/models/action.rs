//! Action domain model.
//!
//! An action is a named, invocable unit of work with declared input and
//! output bindings. Metadata is built once at registration time and is
//! immutable afterwards; the paired handler is invoked (never mutated)
//! many times during planning and execution.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::models::prompt::ActionOutcome;
use crate::domain::ports::ToolGroup;

/// Sentinel binding name meaning "bind by type, not by name".
pub const DEFAULT_BINDING: &str = "it";

/// A (variable-name, type-name) pair locating a value on the blackboard.
///
/// The default name is a sentinel that switches lookup to by-type; an
/// explicit name forces name-based lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IoBinding {
    pub name: String,
    pub type_name: String,
}

impl IoBinding {
    /// Binding resolved by type alone.
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            name: DEFAULT_BINDING.to_string(),
            type_name: type_name.into(),
        }
    }

    /// Binding resolved by explicit variable name.
    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn is_default_name(&self) -> bool {
        self.name == DEFAULT_BINDING
    }
}

impl fmt::Display for IoBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.type_name)
    }
}

/// How the invoker resolves one declared parameter at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamResolution {
    /// Operation-context parameter: injected by the invoker, never bound
    /// from the blackboard and never part of the declared inputs.
    Context,
    /// Bound from the blackboard by name or type.
    Input { binding: IoBinding, required: bool },
}

/// Declarative, serializable description of an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionMetadata {
    /// Globally unique qualified name: `<type>.<method>`.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Inputs read from the blackboard (context parameters excluded).
    pub inputs: Vec<IoBinding>,

    /// Where the result is written, if the action produces one.
    pub output: Option<IoBinding>,

    /// Condition names that must hold before this action is eligible.
    pub preconditions: Vec<String>,

    /// Condition names established by running this action.
    pub postconditions: Vec<String>,

    /// Planning cost of running this action.
    pub cost: f64,

    /// Planning value of having run this action.
    pub value: f64,

    /// Whether the planner may schedule this action more than once.
    pub can_rerun: bool,

    /// Tool groups that must be available when this action runs.
    pub tool_groups: Vec<String>,
}

/// Handler invoked with resolved arguments in declared parameter order.
///
/// A handler either computes a value directly or describes the model call
/// it needs via [`ActionOutcome::Prompt`]; it never invokes the model
/// itself.
pub type ActionHandler = Arc<dyn Fn(&[Value]) -> anyhow::Result<ActionOutcome> + Send + Sync>;

/// An executable action: immutable metadata plus its handler.
#[derive(Clone)]
pub struct Action {
    pub metadata: ActionMetadata,
    /// Per-parameter resolution rules, in declared order.
    pub params: Vec<ParamResolution>,
    /// Tool groups contributed by domain-typed parameters at discovery
    /// time, in addition to the named groups in the metadata.
    pub tools: Vec<ToolGroup>,
    handler: ActionHandler,
}

impl Action {
    pub fn new(metadata: ActionMetadata, params: Vec<ParamResolution>, handler: ActionHandler) -> Self {
        Self {
            metadata,
            params,
            tools: Vec::new(),
            handler,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolGroup>) -> Self {
        self.tools = tools;
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    /// Run the handler against already-resolved arguments.
    pub fn call(&self, args: &[Value]) -> anyhow::Result<ActionOutcome> {
        (self.handler)(args)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("metadata", &self.metadata)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
