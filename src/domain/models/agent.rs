//! Agent and planning-scope domain models.
//!
//! The metadata reader produces one of these from a type manifest: a full
//! `Agent` when the manifest carries the agent marker, or a bare
//! `AgentScope` (conditions, actions and goals only) when it carries the
//! scope marker.

use serde::{Deserialize, Serialize};

use crate::domain::models::action::Action;
use crate::domain::models::condition::Condition;
use crate::domain::models::goal::Goal;

/// Class-level agent marker: identity carried by a full agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMarker {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub tool_groups: Vec<String>,
}

impl AgentMarker {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: "0.1.0".to_string(),
            tool_groups: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_tool_group(mut self, group: impl Into<String>) -> Self {
        self.tool_groups.push(group.into());
        self
    }
}

/// The executable planning scope discovered from one type: its conditions,
/// actions and goals.
#[derive(Debug, Clone, Default)]
pub struct AgentScope {
    /// Name of the type the scope was read from.
    pub type_name: String,
    pub actions: Vec<Action>,
    pub conditions: Vec<Condition>,
    pub goals: Vec<Goal>,
}

impl AgentScope {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.conditions.is_empty() && self.goals.is_empty()
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name() == name)
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.name() == name)
    }

    pub fn goal(&self, name: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.name == name)
    }
}

/// A full agent: identity plus its planning scope.
#[derive(Debug, Clone)]
pub struct Agent {
    pub name: String,
    pub description: String,
    pub version: String,
    pub tool_groups: Vec<String>,
    pub scope: AgentScope,
}

/// What the metadata reader produced for a manifest.
#[derive(Debug, Clone)]
pub enum ScopeOutput {
    Agent(Agent),
    Scope(AgentScope),
}

impl ScopeOutput {
    pub fn scope(&self) -> &AgentScope {
        match self {
            Self::Agent(agent) => &agent.scope,
            Self::Scope(scope) => scope,
        }
    }
}
