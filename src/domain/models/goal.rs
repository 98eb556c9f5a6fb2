//! Goal domain model.
//!
//! A goal is a desired end-state with a value (priority) and a set of
//! precondition names that must hold for it to count as satisfied. Goals
//! come from two places: declared goal drafts on a manifest, and actions
//! carrying an achieves-goal marker, for which satisfaction means "this
//! action has run".

use serde::{Deserialize, Serialize};

/// Name of the condition recording that an action has run.
pub fn ran_marker(action_name: &str) -> String {
    format!("ran:{action_name}")
}

/// A desired end-state guiding the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Globally unique name.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Numeric priority; higher goals are pursued first.
    pub value: f64,

    /// Type name of the value that satisfies this goal, if satisfaction is
    /// type-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satisfied_by: Option<String>,

    /// Condition names that must all hold for the goal to be satisfied.
    pub preconditions: Vec<String>,
}

impl Goal {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value: 0.0,
            satisfied_by: None,
            preconditions: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn satisfied_by(mut self, type_name: impl Into<String>) -> Self {
        self.satisfied_by = Some(type_name.into());
        self
    }

    pub fn with_precondition(mut self, condition: impl Into<String>) -> Self {
        self.preconditions.push(condition.into());
        self
    }

    /// Synthesize the goal achieved by running the named action.
    pub fn achieved_by(action_name: &str, description: impl Into<String>, value: f64) -> Self {
        Self {
            name: action_name.to_string(),
            description: description.into(),
            value,
            satisfied_by: None,
            preconditions: vec![ran_marker(action_name)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn achieved_by_links_satisfaction_to_the_action_run() {
        let goal = Goal::achieved_by("writer.publish", "Publish the report", 1.0);
        assert_eq!(goal.preconditions, vec!["ran:writer.publish".to_string()]);
        assert_eq!(goal.name, "writer.publish");
    }

    #[test]
    fn builder_accumulates_preconditions() {
        let goal = Goal::new("done", "All work finished")
            .with_value(2.0)
            .with_precondition("ran:a")
            .with_precondition("ran:b");
        assert_eq!(goal.preconditions.len(), 2);
        assert!((goal.value - 2.0).abs() < f64::EPSILON);
    }
}
