use serde::{Deserialize, Serialize};

/// A directed arc between two nodes.
///
/// Editor-facing cosmetic fields are ignored on deserialization; only the
/// ids and endpoints matter for traversal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowEdgeModel {
    pub id: String,
    pub source: String,
    pub target: String,
}
