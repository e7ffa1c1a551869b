use serde::{Deserialize, Serialize};

/// The unit of work a node represents.
///
/// `notification` nodes carry action configs and execute exactly like
/// `action` nodes; the distinction is cosmetic in the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Trigger,
    Condition,
    Action,
    Notification,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowNodeModel {
    pub id: String,
    pub kind: NodeKind,
    pub data: NodeData,
}
