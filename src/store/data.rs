//! Persistence-facing data types shared with storage collaborators.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::NodeKind;

/// Lifecycle status of a persisted execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
}

/// Outcome of one node dispatch within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepStatus {
    Success,
    Skipped,
    Failed,
}

/// One entry of the per-run step log, appended in traversal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepLog {
    pub node_id: String,
    pub node_kind: NodeKind,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: i64,
}

/// Persisted record of one flow execution.
///
/// Created RUNNING when a run starts and finalized exactly once when it
/// ends; never written in test mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub flow_id: String,
    pub status: ExecutionStatus,
    pub trigger_type: String,
    pub trigger_data: Value,
    pub log: Vec<StepLog>,
    pub error: Option<String>,
    pub started_at: i64,
    pub finished_at: Option<i64>,
}

/// Classification of an internal notification record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum NotificationKind {
    System,
    User,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Notification record as handed to the notification store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub user_id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub priority: NotificationPriority,
    pub data: Value,
    pub created_at: i64,
}

/// A registered browser push subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: String,
    pub user_id: String,
    pub endpoint: String,
    #[serde(default)]
    pub keys: Value,
}
