//! In-memory supply graph
//!
//! Nodes are unique by name; edges live in an edge list so parallel edges
//! between the same pair of suppliers are kept apart.

use super::types::{EdgeId, NodeId};
use crate::supplier::RiskTier;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Clone, Serialize)]
pub struct SupplyNode {
    pub id: NodeId,
    pub name: String,
    /// Set when the node is added for its own row; `None` for nodes only
    /// reached as a downstream tier so far
    pub tier: Option<u8>,
    pub risk: Option<RiskTier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplyEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub tier: u8,
    /// Risk of the tier-1 row the edge was derived from
    pub risk: Option<RiskTier>,
}

#[derive(Debug, Default, Clone)]
pub struct SupplyGraph {
    tiers: usize,
    nodes: Vec<SupplyNode>,
    edges: Vec<SupplyEdge>,
    by_name: HashMap<String, NodeId>,
    outgoing: Vec<Vec<EdgeId>>,
}

impl SupplyGraph {
    pub fn new(tiers: usize) -> Self {
        Self {
            tiers,
            ..Self::default()
        }
    }

    /// Requested tier depth. The builder records it but always chains two hops.
    pub fn tiers(&self) -> usize {
        self.tiers
    }

    /// Add a node or update the attributes of an existing one
    pub fn add_node(&mut self, name: &str, tier: u8, risk: Option<RiskTier>) -> NodeId {
        let id = self.ensure_node(name);
        let node = &mut self.nodes[id.0];
        node.tier = Some(tier);
        node.risk = risk;
        id
    }

    /// Node for `name`, created without attributes if absent
    pub fn ensure_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(SupplyNode {
            id,
            name: name.to_string(),
            tier: None,
            risk: None,
        });
        self.outgoing.push(Vec::new());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        tier: u8,
        risk: Option<RiskTier>,
    ) -> GraphResult<EdgeId> {
        if source.0 >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(source));
        }
        if target.0 >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(target));
        }
        let id = EdgeId(self.edges.len());
        self.edges.push(SupplyEdge {
            id,
            source,
            target,
            tier,
            risk,
        });
        self.outgoing[source.0].push(id);
        Ok(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[SupplyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SupplyEdge] {
        &self.edges
    }

    pub fn get_node(&self, id: NodeId) -> Option<&SupplyNode> {
        self.nodes.get(id.0)
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<&SupplyNode> {
        self.by_name.get(name).and_then(|id| self.get_node(*id))
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &SupplyEdge> {
        self.outgoing
            .get(id.0)
            .into_iter()
            .flatten()
            .map(move |edge_id| &self.edges[edge_id.0])
    }

    pub fn nodes_with_tier(&self, tier: u8) -> usize {
        self.nodes.iter().filter(|n| n.tier == Some(tier)).count()
    }

    pub fn edges_with_tier(&self, tier: u8) -> usize {
        self.edges.iter().filter(|e| e.tier == tier).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_node_is_upsert() {
        let mut graph = SupplyGraph::new(3);
        let a = graph.ensure_node("Supplier_A");
        assert_eq!(graph.get_node(a).unwrap().tier, None);

        let again = graph.add_node("Supplier_A", 1, Some(RiskTier::Low));
        assert_eq!(a, again);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_node(a).unwrap().tier, Some(1));
        assert_eq!(graph.get_node(a).unwrap().risk, Some(RiskTier::Low));
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut graph = SupplyGraph::new(3);
        let a = graph.ensure_node("Supplier_A");
        let b = graph.ensure_node("Supplier_B");
        graph.add_edge(a, b, 2, None).unwrap();
        graph.add_edge(a, b, 3, None).unwrap();

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.outgoing(a).count(), 2);
        assert_eq!(graph.outgoing(b).count(), 0);
    }

    #[test]
    fn test_edge_to_unknown_node() {
        let mut graph = SupplyGraph::new(3);
        let a = graph.ensure_node("Supplier_A");
        let err = graph.add_edge(a, NodeId(7), 2, None).unwrap_err();
        assert_eq!(err, GraphError::NodeNotFound(NodeId(7)));
    }
}
