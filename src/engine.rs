//! Workflow engine - executes one flow run end to end.
//!
//! The engine owns no business persistence. It builds the runtime graph
//! and execution context, walks the graph depth-first, dispatches nodes to
//! the condition evaluator and action executor, and records the run in the
//! execution log store (unless invoked in test mode).

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::{
    Config, FlowError, Result,
    model::FlowModel,
    runtime::{ExecutionContext, ExecutionReport, ExecutionState},
    store::{
        ExecutionLogStore,
        data::{ExecutionRecord, ExecutionStatus},
    },
    utils,
    workflow::{
        FlowGraph,
        actions::ActionExecutor,
        condition,
        node::NodeConfig,
    },
};

/// Executes flow runs against injected storage and delivery collaborators.
#[derive(Clone)]
pub struct WorkflowEngine {
    /// Execution record persistence.
    executions: Arc<dyn ExecutionLogStore>,
    /// Side-effect dispatch for action and notification nodes.
    actions: ActionExecutor,
    /// Maximum visits to one node within a single run.
    loop_limit: u32,
}

impl WorkflowEngine {
    pub fn new(
        config: &Config,
        executions: Arc<dyn ExecutionLogStore>,
        actions: ActionExecutor,
    ) -> Self {
        Self {
            executions,
            actions,
            loop_limit: config.loop_iteration_limit,
        }
    }

    /// Run one flow against a trigger payload.
    ///
    /// In test mode (`is_test`) the run executes exactly the same way but
    /// no execution record is persisted. Errors finalize the record as
    /// FAILED and propagate unchanged to the caller.
    pub async fn execute_workflow(
        &self,
        flow: &FlowModel,
        trigger_data: Value,
        is_test: bool,
    ) -> Result<ExecutionReport> {
        let execution_id = utils::longid();
        let trigger_type = trigger_data.pointer("/trigger/type").and_then(Value::as_str).unwrap_or_default().to_string();

        info!(flow_id = %flow.id, execution_id = %execution_id, trigger = %trigger_type, "workflow execution started");

        if !is_test {
            self.executions
                .create(ExecutionRecord {
                    id: execution_id.clone(),
                    flow_id: flow.id.clone(),
                    status: ExecutionStatus::Running,
                    trigger_type,
                    trigger_data: trigger_data.clone(),
                    log: Vec::new(),
                    error: None,
                    started_at: utils::time::time_millis(),
                    finished_at: None,
                })
                .await?;
        }

        let mut state = ExecutionState::new(execution_id.clone(), self.loop_limit);
        let outcome = self.run(flow, &trigger_data, &mut state).await;
        state.loops.reset();

        match outcome {
            Ok(()) => {
                if !is_test {
                    self.executions.finalize(&execution_id, true, None, state.log.clone()).await?;
                }
                info!(execution_id = %execution_id, steps = state.log.len(), "workflow execution succeeded");
                Ok(ExecutionReport {
                    execution_id,
                    log: state.log,
                })
            }
            Err(err) => {
                error!(execution_id = %execution_id, error = %err, "workflow execution failed");
                if !is_test {
                    let _ = self.executions.finalize(&execution_id, false, Some(err.to_string()), state.log.clone()).await;
                }
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        flow: &FlowModel,
        trigger_data: &Value,
        state: &mut ExecutionState,
    ) -> Result<()> {
        let graph = FlowGraph::try_from(flow)?;
        let ctx = ExecutionContext::build(trigger_data);

        let trigger_idx = graph.first_trigger().ok_or(FlowError::Definition("No trigger node found".to_string()))?;
        let trigger = graph.node(trigger_idx);
        state.log_success(&trigger.id, trigger.kind, json!({"triggered": true}));

        self.traverse(&graph, trigger_idx, &ctx, state).await
    }

    /// Depth-first traversal over an explicit work stack.
    ///
    /// Targets are pushed in reverse edge order so the first edge's branch
    /// fully executes before the next one starts, matching the order the
    /// flow author drew.
    async fn traverse(
        &self,
        graph: &FlowGraph,
        start: petgraph::graph::NodeIndex,
        ctx: &ExecutionContext,
        state: &mut ExecutionState,
    ) -> Result<()> {
        let mut stack = vec![start];

        while let Some(idx) = stack.pop() {
            let node = graph.node(idx);

            let decision = state.loops.detect(&node.id, &state.execution_path);
            if !decision.allowed {
                warn!(node = %node.id, iterations = decision.iteration, "loop limit reached, aborting run");
                return Err(FlowError::LoopLimit {
                    node_id: node.id.clone(),
                    iterations: decision.iteration,
                });
            }

            state.execution_path.push(node.id.clone());
            debug!(node = %node.id, kind = node.kind.as_ref(), "executing node");

            match &node.config {
                // Logged by the run entry point already.
                NodeConfig::Trigger(_) => {}
                NodeConfig::Condition(config) => {
                    let matched = condition::evaluate(config, ctx);
                    if matched {
                        state.log_success(&node.id, node.kind, json!({"matched": true}));
                    } else {
                        state.log_skipped(&node.id, node.kind, json!({"matched": false}));
                        // A false condition halts this branch only.
                        continue;
                    }
                }
                NodeConfig::Action(action) => match self.actions.execute(action, ctx).await {
                    Ok(result) => state.log_success(&node.id, node.kind, result.into()),
                    Err(err) => {
                        state.log_failed(&node.id, node.kind, err.to_string());
                        return Err(err);
                    }
                },
            }

            for target in graph.outgoing_targets(idx).into_iter().rev() {
                stack.push(target);
            }
        }

        Ok(())
    }
}
