//! Runtime edge representation.

use serde::{Deserialize, Serialize};

use crate::model::FlowEdgeModel;

/// Unique identifier for an edge within a flow.
pub type EdgeId = String;

/// A directed arc of the runtime graph.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: String,
    pub target: String,
}

impl From<&FlowEdgeModel> for GraphEdge {
    fn from(model: &FlowEdgeModel) -> Self {
        Self {
            id: model.id.clone(),
            source: model.source.clone(),
            target: model.target.clone(),
        }
    }
}
