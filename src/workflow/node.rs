//! Runtime node representation with typed configs.
//!
//! Raw node configs arrive as untyped JSON from the definition store and
//! are parsed into a tagged `NodeConfig` while the runtime graph is built.
//! Malformed or unknown configs therefore fail a run before any node
//! executes.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    FlowError, Result,
    model::{FlowModel, FlowNodeModel, NodeKind},
    workflow::{actions::ActionConfig, condition::ConditionConfig},
};

/// node id
pub type NodeId = String;

/// Static filters a trigger node applies before its flow is considered.
///
/// A present, non-empty list excludes events whose corresponding value is
/// not contained; an absent or empty list imposes no restriction.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TriggerFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement_types: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TriggerConfig {
    pub event_type: String,
    #[serde(default)]
    pub filters: TriggerFilters,
}

impl TriggerConfig {
    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "required": ["event_type"],
            "properties": {
                "event_type": { "type": "string" },
                "filters": {
                    "type": "object",
                    "properties": {
                        "product_ids": { "type": "array", "items": { "type": "string" } },
                        "store_ids": { "type": "array", "items": { "type": "string" } },
                        "movement_types": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        })
    }
}

/// Parsed node config, tagged by the node kind it belongs to.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum NodeConfig {
    Trigger(TriggerConfig),
    Condition(ConditionConfig),
    Action(ActionConfig),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub config: NodeConfig,
}

impl GraphNode {
    pub fn new(model: &FlowNodeModel) -> Result<Self> {
        let raw = &model.data.config;

        let config = match model.kind {
            NodeKind::Trigger => {
                jsonschema::validate(&TriggerConfig::schema(), raw)?;
                NodeConfig::Trigger(serde_json::from_value(raw.clone()).map_err(|e| FlowError::Node(format!("invalid trigger config on node {}: {}", model.id, e)))?)
            }
            NodeKind::Condition => NodeConfig::Condition(ConditionConfig::parse(raw).map_err(|e| FlowError::Node(format!("invalid condition config on node {}: {}", model.id, e)))?),
            NodeKind::Action | NodeKind::Notification => NodeConfig::Action(ActionConfig::parse(raw)?),
        };

        Ok(Self {
            id: model.id.clone(),
            label: model.data.label.clone(),
            kind: model.kind,
            config,
        })
    }
}

/// Parse the trigger config of a flow's first trigger node, if any.
pub fn trigger_config(flow: &FlowModel) -> Option<TriggerConfig> {
    flow.nodes
        .iter()
        .find(|n| n.kind == NodeKind::Trigger)
        .and_then(|n| serde_json::from_value(n.data.config.clone()).ok())
}
