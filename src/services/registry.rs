//! Metadata discovery: type manifests in, executable planning scopes out.
//!
//! Discovery runs during application bring-up over many unrelated types,
//! so it must never block startup: manifest-level validation failures are
//! logged and yield no result, and a single malformed action is skipped
//! without dooming its siblings. Only the per-action builders fail fast,
//! and those failures stay inside this module.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::errors::{DiscoveryError, DiscoveryResult};
use crate::domain::models::{
    Action, ActionDraft, ActionMetadata, Agent, AgentScope, Condition, ConditionDraft,
    ConditionMetadata, Goal, IoBinding, ParamDraft, ParamKind, ParamResolution, ScopeOutput,
    TypeManifest,
};
use crate::domain::ports::ToolGroup;
use crate::services::exemplar::ExemplarGenerator;

/// Reads planning metadata out of type manifests.
pub struct MetadataReader {
    generator: Arc<ExemplarGenerator>,
}

impl MetadataReader {
    pub fn new(generator: Arc<ExemplarGenerator>) -> Self {
        Self { generator }
    }

    /// Produce the planning scope a manifest declares.
    ///
    /// Returns `None` when the type is not agentic, fails validation, or
    /// declares nothing usable. Never returns an error: discovery happens
    /// during startup scanning and must not block it.
    pub fn read(&self, manifest: &TypeManifest) -> Option<ScopeOutput> {
        if !manifest.is_agentic() {
            debug!(type_name = %manifest.type_name, "Type carries no agentic marker, skipping");
            return None;
        }

        if let Err(err) = Self::validate_markers(manifest) {
            warn!(
                type_name = %manifest.type_name,
                error = %err,
                "Manifest failed validation, skipping"
            );
            return None;
        }

        let mut scope = AgentScope {
            type_name: manifest.type_name.clone(),
            ..AgentScope::default()
        };
        let mut seen_names: Vec<String> = Vec::new();

        for draft in &manifest.actions {
            match self.build_action(&manifest.type_name, draft, &seen_names) {
                Ok(action) => {
                    seen_names.push(action.name().to_string());
                    if let Some(achieves) = &draft.achieves {
                        let goal = Goal {
                            satisfied_by: draft.output_type.clone(),
                            ..Goal::achieved_by(
                                action.name(),
                                achieves.description.clone(),
                                achieves.value,
                            )
                        };
                        scope.goals.push(goal);
                    }
                    scope.actions.push(action);
                }
                Err(err) => {
                    warn!(
                        type_name = %manifest.type_name,
                        method = %draft.method,
                        error = %err,
                        "Skipping malformed action"
                    );
                }
            }
        }

        for draft in &manifest.conditions {
            match Self::build_condition(&manifest.type_name, draft) {
                Ok(condition) => scope.conditions.push(condition),
                Err(err) => {
                    warn!(
                        type_name = %manifest.type_name,
                        method = %draft.method,
                        error = %err,
                        "Skipping malformed condition"
                    );
                }
            }
        }

        scope.goals.extend(manifest.goals.iter().cloned());

        if scope.is_empty() {
            warn!(
                type_name = %manifest.type_name,
                "Type declares no actions, conditions or goals, skipping"
            );
            return None;
        }

        match &manifest.agent {
            Some(marker) => Some(ScopeOutput::Agent(Agent {
                name: marker.name.clone(),
                description: marker.description.clone(),
                version: marker.version.clone(),
                tool_groups: marker.tool_groups.clone(),
                scope,
            })),
            None => Some(ScopeOutput::Scope(scope)),
        }
    }

    /// Marker-level validation. Failures here are logged by `read`, never
    /// propagated: they abort discovery for one manifest only.
    fn validate_markers(manifest: &TypeManifest) -> DiscoveryResult<()> {
        if manifest.agent.is_some() && manifest.scope_marker {
            return Err(DiscoveryError::ConflictingMarkers(
                manifest.type_name.clone(),
            ));
        }
        if let Some(marker) = &manifest.agent {
            if marker.description.trim().is_empty() {
                return Err(DiscoveryError::BlankDescription(format!(
                    "agent marker of {}",
                    manifest.type_name
                )));
            }
        }
        Ok(())
    }

    /// Build one executable action from its draft. Fails fast on blank
    /// descriptions, duplicate names and ambiguous bindings.
    pub fn build_action(
        &self,
        type_name: &str,
        draft: &ActionDraft,
        existing_names: &[String],
    ) -> DiscoveryResult<Action> {
        let name = format!("{type_name}.{}", draft.method);

        if draft.description.trim().is_empty() {
            return Err(DiscoveryError::BlankDescription(name));
        }
        if existing_names.contains(&name) {
            return Err(DiscoveryError::DuplicateAction(name));
        }

        let params = resolve_params(&name, &draft.params)?;
        let inputs = params
            .iter()
            .filter_map(|p| match p {
                ParamResolution::Context => None,
                ParamResolution::Input { binding, .. } => Some(binding.clone()),
            })
            .collect();

        // Domain-typed parameters may expose tool callbacks; discover them
        // on a synthesized exemplar, never on live data.
        let mut tools: Vec<ToolGroup> = Vec::new();
        for param in &draft.params {
            if let ParamKind::Domain { type_name } = &param.kind {
                if let Some(group) = self.generator.tools_for(type_name)? {
                    if !tools.iter().any(|g| g.name == group.name) {
                        tools.push(group);
                    }
                }
            }
        }

        let metadata = ActionMetadata {
            name,
            description: draft.description.clone(),
            inputs,
            output: draft
                .output_type
                .as_ref()
                .map(|type_name| IoBinding::of_type(type_name.clone())),
            preconditions: draft.preconditions.clone(),
            postconditions: draft.postconditions.clone(),
            cost: draft.cost,
            value: draft.value,
            can_rerun: draft.can_rerun,
            tool_groups: draft.tool_groups.clone(),
        };

        Ok(Action::new(metadata, params, draft.handler.clone()).with_tools(tools))
    }

    /// Build one condition from its draft.
    fn build_condition(type_name: &str, draft: &ConditionDraft) -> DiscoveryResult<Condition> {
        let name = format!("{type_name}.{}", draft.method);
        let params = resolve_params(&name, &draft.params)?;
        Ok(Condition::new(
            ConditionMetadata {
                name,
                cost: draft.cost,
            },
            params,
            draft.handler.clone(),
        ))
    }
}

/// Turn parameter drafts into resolution rules, enforcing the ambiguity
/// rule: two or more same-typed bindable parameters require explicit
/// names on all of them.
fn resolve_params(
    owner: &str,
    drafts: &[ParamDraft],
) -> DiscoveryResult<Vec<ParamResolution>> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for draft in drafts {
        if let Some(type_name) = draft.type_name() {
            *counts.entry(type_name).or_default() += 1;
        }
    }

    let mut params = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match draft.type_name() {
            None => params.push(ParamResolution::Context),
            Some(type_name) => {
                let ambiguous = counts.get(type_name).copied().unwrap_or(0) > 1;
                let binding = match &draft.name {
                    Some(name) => IoBinding::named(name.clone(), type_name),
                    None if ambiguous => {
                        return Err(DiscoveryError::AmbiguousBinding {
                            action: owner.to_string(),
                            type_name: type_name.to_string(),
                        });
                    }
                    None => IoBinding::of_type(type_name),
                };
                params.push(ParamResolution::Input {
                    binding,
                    required: draft.required,
                });
            }
        }
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AchievesGoal, ActionOutcome, AgentMarker};
    use crate::services::exemplar::DomainTypeRegistry;
    use serde_json::json;

    fn reader() -> MetadataReader {
        MetadataReader::new(Arc::new(ExemplarGenerator::new(Arc::new(
            DomainTypeRegistry::new(),
        ))))
    }

    fn noop_action(method: &str) -> ActionDraft {
        ActionDraft::new(method, "Does something useful", Arc::new(|_| {
            Ok(ActionOutcome::Direct(json!(null)))
        }))
    }

    #[test]
    fn non_agentic_types_yield_nothing() {
        let manifest = TypeManifest::new("Plain").with_action(noop_action("run"));
        assert!(reader().read(&manifest).is_none());
    }

    #[test]
    fn conflicting_markers_yield_nothing() {
        let manifest = TypeManifest::new("Confused")
            .as_agent(AgentMarker::new("confused", "An agent"))
            .as_scope()
            .with_action(noop_action("run"));
        assert!(reader().read(&manifest).is_none());
    }

    #[test]
    fn blank_agent_description_yields_nothing() {
        let manifest = TypeManifest::new("Mute")
            .as_agent(AgentMarker::new("mute", "   "))
            .with_action(noop_action("run"));
        assert!(reader().read(&manifest).is_none());
    }

    #[test]
    fn empty_scope_yields_nothing() {
        let manifest = TypeManifest::new("Hollow").as_scope();
        assert!(reader().read(&manifest).is_none());
    }

    #[test]
    fn agent_marker_produces_a_full_agent() {
        let manifest = TypeManifest::new("Writer")
            .as_agent(AgentMarker::new("writer", "Writes reports").with_version("1.2.0"))
            .with_action(noop_action("draft"));

        match reader().read(&manifest) {
            Some(ScopeOutput::Agent(agent)) => {
                assert_eq!(agent.name, "writer");
                assert_eq!(agent.version, "1.2.0");
                assert_eq!(agent.scope.actions.len(), 1);
                assert_eq!(agent.scope.actions[0].name(), "Writer.draft");
            }
            other => panic!("expected an agent, got {other:?}"),
        }
    }

    #[test]
    fn malformed_action_is_skipped_but_siblings_survive() {
        let manifest = TypeManifest::new("Mixed")
            .as_scope()
            .with_action(ActionDraft::new("bad", "  ", Arc::new(|_| {
                Ok(ActionOutcome::Direct(json!(null)))
            })))
            .with_action(noop_action("good"));

        let output = reader().read(&manifest).unwrap();
        let scope = output.scope();
        assert_eq!(scope.actions.len(), 1);
        assert_eq!(scope.actions[0].name(), "Mixed.good");
    }

    #[test]
    fn duplicate_action_names_are_rejected() {
        let manifest = TypeManifest::new("Echo")
            .as_scope()
            .with_action(noop_action("run"))
            .with_action(noop_action("run"));

        let output = reader().read(&manifest).unwrap();
        assert_eq!(output.scope().actions.len(), 1);
    }

    #[test]
    fn same_typed_unnamed_params_fail_discovery() {
        let draft = noop_action("merge")
            .with_param(ParamDraft::value("Report"))
            .with_param(ParamDraft::value("Report"));

        let err = reader()
            .build_action("Merger", &draft, &[])
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::AmbiguousBinding { .. }));
    }

    #[test]
    fn same_typed_params_succeed_with_explicit_names() {
        let draft = noop_action("merge")
            .with_param(ParamDraft::value("Report").named("left"))
            .with_param(ParamDraft::value("Report").named("right"));

        let action = reader().build_action("Merger", &draft, &[]).unwrap();
        assert_eq!(action.metadata.inputs.len(), 2);
        assert_eq!(action.metadata.inputs[0].name, "left");
        assert_eq!(action.metadata.inputs[1].name, "right");
    }

    #[test]
    fn achieves_marker_synthesizes_a_goal() {
        let manifest = TypeManifest::new("Writer").as_scope().with_action(
            noop_action("publish")
                .with_output("Publication")
                .achieves(AchievesGoal::new("Report is published", 5.0)),
        );

        let output = reader().read(&manifest).unwrap();
        let scope = output.scope();
        assert_eq!(scope.goals.len(), 1);
        let goal = &scope.goals[0];
        assert_eq!(goal.preconditions, vec!["ran:Writer.publish".to_string()]);
        assert_eq!(goal.satisfied_by.as_deref(), Some("Publication"));
        assert!((goal.value - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn context_params_are_not_inputs() {
        let draft = noop_action("summarize")
            .with_param(ParamDraft::context())
            .with_param(ParamDraft::value("Report"));

        let action = reader().build_action("Writer", &draft, &[]).unwrap();
        assert_eq!(action.metadata.inputs.len(), 1);
        assert_eq!(action.params.len(), 2);
        assert_eq!(action.params[0], ParamResolution::Context);
    }
}
