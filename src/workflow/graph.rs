//! Runtime flow representation using a directed graph.
//!
//! Wraps the raw flow model in a petgraph structure for traversal. Nodes
//! and edges keep their definition order: node indices follow the model's
//! node array, and outgoing edges are returned in edge-array order so
//! branches execute in the order the author drew them.

use std::collections::HashMap;

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use crate::{
    FlowError, Result,
    model::{FlowModel, NodeKind},
    workflow::{
        edge::GraphEdge,
        node::{GraphNode, NodeId},
    },
};

/// Immutable runtime graph of one flow.
#[derive(Debug)]
pub struct FlowGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
}

impl FlowGraph {
    /// get node weight by index
    pub fn node(
        &self,
        idx: NodeIndex,
    ) -> &GraphNode {
        &self.graph[idx]
    }

    /// get node index by id
    pub fn find_node(
        &self,
        id: &NodeId,
    ) -> Option<NodeIndex> {
        self.graph.node_indices().find(|idx| self.graph[*idx].id.eq(id))
    }

    /// get the first trigger node in definition order
    pub fn first_trigger(&self) -> Option<NodeIndex> {
        self.graph.node_indices().find(|idx| self.graph[*idx].kind == NodeKind::Trigger)
    }

    /// get outgoing edge targets in edge definition order
    pub fn outgoing_targets(
        &self,
        idx: NodeIndex,
    ) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self.graph.edges_directed(idx, Direction::Outgoing).map(|edge_ref| (edge_ref.id().index(), edge_ref.target())).collect();
        edges.sort_by_key(|(order, _)| *order);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

impl TryFrom<&FlowModel> for FlowGraph {
    type Error = FlowError;

    fn try_from(model: &FlowModel) -> Result<Self> {
        let mut graph: DiGraph<GraphNode, GraphEdge> = DiGraph::new();

        let mut nodes = HashMap::new();

        for node in model.nodes.iter() {
            let node = GraphNode::new(node)?;
            let nid = node.id.clone();
            let node_idx = graph.add_node(node);
            nodes.insert(nid, node_idx);
        }
        for edge in model.edges.iter() {
            let edge = GraphEdge::from(edge);
            let source = nodes.get(&edge.source).ok_or(FlowError::Edge(format!("source node {} not found", edge.source)))?;
            let target = nodes.get(&edge.target).ok_or(FlowError::Edge(format!("target node {} not found", edge.target)))?;
            graph.add_edge(*source, *target, edge);
        }
        Ok(Self {
            graph,
        })
    }
}
