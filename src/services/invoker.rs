//! Action invocation: parameter binding and model-call interception.
//!
//! The invoker resolves each declared input from the blackboard, runs the
//! handler, and pattern-matches the outcome. A `Prompt` outcome is not a
//! failure: the invoker builds a prompt runner from the current context
//! (merging request-level tools with ambient ones, request options over
//! ambient options) and performs the model call, returning its result as
//! if the handler had computed it directly. A prompt request is therefore
//! fully handled at this boundary and never reaches a caller.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::domain::errors::InvokeError;
use crate::domain::models::{
    Action, ActionOutcome, Condition, ConditionOutcome, ParamResolution, PromptRequest,
};
use crate::domain::ports::ToolGroup;
use crate::services::blackboard::Blackboard;
use crate::services::prompt_runner::PromptRunner;

/// Everything an invocation runs against: shared state, ambient tool
/// groups, and the base prompt runner carrying ambient model options.
#[derive(Clone)]
pub struct OperationContext {
    pub blackboard: Arc<Blackboard>,
    pub tool_groups: Vec<ToolGroup>,
    pub runner: PromptRunner,
}

impl OperationContext {
    pub fn new(blackboard: Arc<Blackboard>, runner: PromptRunner) -> Self {
        Self {
            blackboard,
            tool_groups: Vec::new(),
            runner,
        }
    }

    pub fn with_tool_group(mut self, group: ToolGroup) -> Self {
        self.tool_groups.push(group);
        self
    }
}

/// Executes previously-built actions and conditions against live state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionInvoker;

impl ActionInvoker {
    pub fn new() -> Self {
        Self
    }

    /// Invoke an action: bind inputs, run the handler, intercept prompt
    /// requests. On success the result is committed to the blackboard
    /// under the action's output binding and the action's run is
    /// recorded.
    pub async fn invoke_action(
        &self,
        action: &Action,
        ctx: &OperationContext,
    ) -> Result<Option<Value>, InvokeError> {
        let args = resolve_args(action.name(), &action.params, &ctx.blackboard)?;

        let outcome = action.call(&args).map_err(|source| {
            error!(action = %action.name(), error = %source, "Action handler failed");
            InvokeError::Action {
                action: action.name().to_string(),
                source,
            }
        })?;

        match outcome {
            ActionOutcome::Direct(value) => {
                commit(action, ctx, &value);
                Ok(Some(value))
            }
            ActionOutcome::Prompt(request) => {
                debug!(action = %action.name(), "Action requested a model call");
                let runner = runner_for(ctx, &action.tools, &action.metadata.tool_groups, &request);
                match runner.create_object(&request.prompt, &request.output).await {
                    Ok(value) => {
                        commit(action, ctx, &value);
                        Ok(Some(value))
                    }
                    Err(source) if !request.require_result => {
                        warn!(
                            action = %action.name(),
                            error = %source,
                            "Optional model call failed, yielding no value"
                        );
                        Ok(None)
                    }
                    Err(source) => Err(InvokeError::Model {
                        action: action.name().to_string(),
                        source,
                    }),
                }
            }
        }
    }

    /// Evaluate a condition: same binding rules, same interception
    /// pattern, boolean verdict.
    pub async fn invoke_condition(
        &self,
        condition: &Condition,
        ctx: &OperationContext,
    ) -> Result<bool, InvokeError> {
        let args = resolve_args(condition.name(), &condition.params, &ctx.blackboard)?;

        let outcome = condition.call(&args).map_err(|source| {
            error!(condition = %condition.name(), error = %source, "Condition handler failed");
            InvokeError::Action {
                action: condition.name().to_string(),
                source,
            }
        })?;

        match outcome {
            ConditionOutcome::Direct(verdict) => Ok(verdict),
            ConditionOutcome::Prompt(request) => {
                debug!(condition = %condition.name(), "Condition requested a model call");
                let runner = runner_for(ctx, &[], &[], &request);
                match runner.evaluate_condition(&request.prompt).await {
                    Ok(verdict) => Ok(verdict),
                    Err(source) if !request.require_result => {
                        warn!(
                            condition = %condition.name(),
                            error = %source,
                            "Optional model call failed, treating condition as unmet"
                        );
                        Ok(false)
                    }
                    Err(source) => Err(InvokeError::Model {
                        action: condition.name().to_string(),
                        source,
                    }),
                }
            }
        }
    }
}

/// Resolve handler arguments in declared parameter order.
///
/// Context parameters are injected (as null placeholders; handlers do not
/// consult them since prompts travel as data). A missing required input
/// fails fast.
fn resolve_args(
    owner: &str,
    params: &[ParamResolution],
    blackboard: &Blackboard,
) -> Result<Vec<Value>, InvokeError> {
    let mut args = Vec::with_capacity(params.len());
    for param in params {
        match param {
            ParamResolution::Context => args.push(Value::Null),
            ParamResolution::Input { binding, required } => match blackboard.get(binding) {
                Some(value) => args.push(value),
                None if *required => {
                    return Err(InvokeError::MissingInput {
                        action: owner.to_string(),
                        binding: binding.name.clone(),
                        type_name: binding.type_name.clone(),
                    });
                }
                None => args.push(Value::Null),
            },
        }
    }
    Ok(args)
}

/// Derive the runner for one prompt request.
///
/// Tool preference order: tools carried on the request, then tools
/// discovered from the action's domain parameters, then ambient groups
/// named by either the action or the request. Duplicate names collapse to
/// the first occurrence. Request options override ambient ones field by
/// field.
fn runner_for(
    ctx: &OperationContext,
    action_tools: &[ToolGroup],
    action_group_names: &[String],
    request: &PromptRequest,
) -> PromptRunner {
    let mut runner = ctx.runner.clone();

    if let Some(options) = &request.options {
        let merged = options.or(runner.options());
        runner = runner.with_options(merged);
    }

    runner = runner.with_tools(request.tools.clone());
    for group in action_tools {
        runner = runner.with_tool_group(group);
    }
    for name in action_group_names.iter().chain(request.tool_groups.iter()) {
        if let Some(group) = ctx.tool_groups.iter().find(|g| &g.name == name) {
            runner = runner.with_tool_group(group);
        }
    }
    runner
}

/// Write the result and record the run.
fn commit(action: &Action, ctx: &OperationContext, value: &Value) {
    if let Some(output) = &action.metadata.output {
        ctx.blackboard.bind(output.clone(), value.clone());
    }
    ctx.blackboard.record_completion(action.name());
    for post in &action.metadata.postconditions {
        ctx.blackboard.set_condition(post.clone(), true);
    }
}
