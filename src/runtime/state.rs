//! Mutable per-run execution state.

use serde_json::Value;

use crate::{
    model::NodeKind,
    runtime::LoopController,
    store::data::{StepLog, StepStatus},
    utils,
};

/// State accumulated while one run traverses its flow graph.
///
/// The execution path is append-only and may hold duplicates (revisits);
/// the step log mirrors the dispatch outcomes in traversal order.
#[derive(Debug, Clone)]
pub struct ExecutionState {
    pub execution_id: String,
    pub execution_path: Vec<String>,
    pub log: Vec<StepLog>,
    pub loops: LoopController,
}

impl ExecutionState {
    pub fn new(
        execution_id: String,
        loop_limit: u32,
    ) -> Self {
        Self {
            execution_id,
            execution_path: Vec::new(),
            log: Vec::new(),
            loops: LoopController::new(loop_limit),
        }
    }

    pub fn log_success(
        &mut self,
        node_id: &str,
        node_kind: NodeKind,
        result: Value,
    ) {
        self.push_log(node_id, node_kind, StepStatus::Success, Some(result), None);
    }

    pub fn log_skipped(
        &mut self,
        node_id: &str,
        node_kind: NodeKind,
        result: Value,
    ) {
        self.push_log(node_id, node_kind, StepStatus::Skipped, Some(result), None);
    }

    pub fn log_failed(
        &mut self,
        node_id: &str,
        node_kind: NodeKind,
        error: String,
    ) {
        self.push_log(node_id, node_kind, StepStatus::Failed, None, Some(error));
    }

    fn push_log(
        &mut self,
        node_id: &str,
        node_kind: NodeKind,
        status: StepStatus,
        result: Option<Value>,
        error: Option<String>,
    ) {
        self.log.push(StepLog {
            node_id: node_id.to_string(),
            node_kind,
            status,
            result,
            error,
            timestamp: utils::time::time_millis(),
        });
    }
}

/// Result surface of a successful run.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub execution_id: String,
    pub log: Vec<StepLog>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::data::StepStatus;

    #[test]
    fn test_log_entries_keep_order() {
        let mut state = ExecutionState::new("x1".to_string(), 100);
        state.log_success("t1", NodeKind::Trigger, json!({"triggered": true}));
        state.log_skipped("c1", NodeKind::Condition, json!({"matched": false}));
        state.log_failed("a1", NodeKind::Action, "boom".to_string());

        let statuses: Vec<StepStatus> = state.log.iter().map(|l| l.status).collect();
        assert_eq!(statuses, vec![StepStatus::Success, StepStatus::Skipped, StepStatus::Failed]);
        assert_eq!(state.log[2].error.as_deref(), Some("boom"));
    }
}
