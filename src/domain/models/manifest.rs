//! Type manifests: the registration-side input to metadata discovery.
//!
//! Where the original design scanned annotations at runtime, registration
//! produces a manifest per type: its markers plus drafts of every action,
//! condition and goal it declares. The metadata reader turns a manifest
//! into executable planning metadata by a pure, deterministic set of rules.

use crate::domain::models::action::ActionHandler;
use crate::domain::models::agent::AgentMarker;
use crate::domain::models::condition::ConditionHandler;
use crate::domain::models::goal::Goal;

/// Declared role of one handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Operation context, injected by the invoker.
    Context,
    /// Plain value bound from the blackboard.
    Value { type_name: String },
    /// Domain type bound from the blackboard; may contribute tool
    /// callbacks discovered through the domain-type registry.
    Domain { type_name: String },
}

/// One declared parameter of an action or condition method.
#[derive(Debug, Clone)]
pub struct ParamDraft {
    pub kind: ParamKind,
    /// Explicit binding name; absent means bind by type.
    pub name: Option<String>,
    /// Required parameters fail fast when unbound at invocation time.
    pub required: bool,
}

impl ParamDraft {
    pub fn context() -> Self {
        Self {
            kind: ParamKind::Context,
            name: None,
            required: false,
        }
    }

    pub fn value(type_name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::Value {
                type_name: type_name.into(),
            },
            name: None,
            required: true,
        }
    }

    pub fn domain(type_name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::Domain {
                type_name: type_name.into(),
            },
            name: None,
            required: true,
        }
    }

    /// Force name-based lookup under the parameter's own name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Type name for bindable parameters; `None` for context.
    pub fn type_name(&self) -> Option<&str> {
        match &self.kind {
            ParamKind::Context => None,
            ParamKind::Value { type_name } | ParamKind::Domain { type_name } => Some(type_name),
        }
    }
}

/// Marker on an action that also achieves a goal.
#[derive(Debug, Clone)]
pub struct AchievesGoal {
    pub description: String,
    pub value: f64,
}

impl AchievesGoal {
    pub fn new(description: impl Into<String>, value: f64) -> Self {
        Self {
            description: description.into(),
            value,
        }
    }
}

/// Draft of one action method, as registered.
#[derive(Clone)]
pub struct ActionDraft {
    pub method: String,
    pub description: String,
    pub params: Vec<ParamDraft>,
    /// Type name of the produced value, if any.
    pub output_type: Option<String>,
    pub preconditions: Vec<String>,
    pub postconditions: Vec<String>,
    pub cost: f64,
    pub value: f64,
    pub can_rerun: bool,
    pub tool_groups: Vec<String>,
    /// Present when running this action achieves a goal.
    pub achieves: Option<AchievesGoal>,
    pub handler: ActionHandler,
}

impl ActionDraft {
    pub fn new(
        method: impl Into<String>,
        description: impl Into<String>,
        handler: ActionHandler,
    ) -> Self {
        Self {
            method: method.into(),
            description: description.into(),
            params: Vec::new(),
            output_type: None,
            preconditions: Vec::new(),
            postconditions: Vec::new(),
            cost: 0.0,
            value: 0.0,
            can_rerun: false,
            tool_groups: Vec::new(),
            achieves: None,
            handler,
        }
    }

    pub fn with_param(mut self, param: ParamDraft) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_output(mut self, type_name: impl Into<String>) -> Self {
        self.output_type = Some(type_name.into());
        self
    }

    pub fn with_precondition(mut self, condition: impl Into<String>) -> Self {
        self.preconditions.push(condition.into());
        self
    }

    pub fn with_postcondition(mut self, condition: impl Into<String>) -> Self {
        self.postconditions.push(condition.into());
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn rerunnable(mut self) -> Self {
        self.can_rerun = true;
        self
    }

    pub fn with_tool_group(mut self, group: impl Into<String>) -> Self {
        self.tool_groups.push(group.into());
        self
    }

    pub fn achieves(mut self, goal: AchievesGoal) -> Self {
        self.achieves = Some(goal);
        self
    }
}

/// Draft of one condition method, as registered.
#[derive(Clone)]
pub struct ConditionDraft {
    pub method: String,
    pub cost: f64,
    pub params: Vec<ParamDraft>,
    pub handler: ConditionHandler,
}

impl ConditionDraft {
    pub fn new(method: impl Into<String>, handler: ConditionHandler) -> Self {
        Self {
            method: method.into(),
            cost: 0.0,
            params: Vec::new(),
            handler,
        }
    }

    pub fn with_param(mut self, param: ParamDraft) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }
}

/// Everything one type declares: markers plus method drafts.
#[derive(Clone, Default)]
pub struct TypeManifest {
    pub type_name: String,
    /// Class-level agent marker.
    pub agent: Option<AgentMarker>,
    /// Class-level bare-scope marker. Mutually exclusive with `agent`.
    pub scope_marker: bool,
    pub actions: Vec<ActionDraft>,
    pub conditions: Vec<ConditionDraft>,
    /// Goals declared directly (the goal-returning-getter form).
    pub goals: Vec<Goal>,
}

impl TypeManifest {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn as_agent(mut self, marker: AgentMarker) -> Self {
        self.agent = Some(marker);
        self
    }

    pub fn as_scope(mut self) -> Self {
        self.scope_marker = true;
        self
    }

    pub fn with_action(mut self, action: ActionDraft) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_condition(mut self, condition: ConditionDraft) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    /// Whether the type carries either agentic marker.
    pub fn is_agentic(&self) -> bool {
        self.agent.is_some() || self.scope_marker
    }
}
