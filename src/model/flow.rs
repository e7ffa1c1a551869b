use serde::{Deserialize, Serialize};

use crate::{
    FlowError, Result,
    model::{FlowEdgeModel, FlowNodeModel},
};

/// Lifecycle status of a stored flow definition.
///
/// Only ACTIVE flows are selected by the trigger handler. The status is
/// owned and mutated by the external definition store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum FlowStatus {
    Active,
    Inactive,
    #[default]
    Draft,
}

/// A stored automation definition: a directed graph of nodes and edges.
///
/// Immutable per run; the engine only reads flow definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: FlowStatus,
    pub tenant_id: String,
    pub nodes: Vec<FlowNodeModel>,
    pub edges: Vec<FlowEdgeModel>,
}

impl FlowModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let flow = serde_json::from_str::<FlowModel>(s);
        match flow {
            Ok(v) => Ok(v),
            Err(e) => Err(FlowError::Definition(format!("{}", e))),
        }
    }
}
