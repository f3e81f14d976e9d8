//! Building forward/reverse adjacency from an edge list.

use std::collections::HashMap;

use super::{CompressedAdjacency, CompressedView, GraphError, NodeId};

/// A directed graph held as forward (CSR) and reverse (CSC) adjacency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedGraph {
    forward: CompressedAdjacency,
    reverse: CompressedAdjacency,
}

/// Mapping from original edge-list ids to dense node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRenumbering {
    to_dense: HashMap<u64, NodeId>,
    to_original: Vec<u64>,
}

impl NodeRenumbering {
    /// Dense id assigned to an original id, if it appeared in the edge list.
    pub fn dense(&self, original: u64) -> Option<NodeId> {
        self.to_dense.get(&original).copied()
    }

    /// Original id of a dense node.
    pub fn original(&self, dense: NodeId) -> Option<u64> {
        self.to_original.get(dense as usize).copied()
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.to_original.len()
    }

    /// Whether no node has been assigned.
    pub fn is_empty(&self) -> bool {
        self.to_original.is_empty()
    }

    fn assign(&mut self, original: u64) -> Result<NodeId, GraphError> {
        if let Some(&id) = self.to_dense.get(&original) {
            return Ok(id);
        }
        let next = self.to_original.len();
        let id = NodeId::try_from(next).map_err(|_| GraphError::TooManyNodes { count: next })?;
        self.to_dense.insert(original, id);
        self.to_original.push(original);
        Ok(id)
    }
}

impl DirectedGraph {
    /// Builds a graph over `num_nodes` nodes, using edge endpoints as node ids.
    ///
    /// Nodes that appear in no edge stay isolated. Parallel edges and self-loops
    /// are kept as given.
    ///
    /// # Errors
    /// Fails if an endpoint is `>= num_nodes` or the counts overflow 32-bit ids.
    pub fn from_edges(num_nodes: usize, edges: &[(NodeId, NodeId)]) -> Result<Self, GraphError> {
        let mut adjacency = vec![Vec::new(); num_nodes];
        for &(u, v) in edges {
            if u as usize >= num_nodes {
                return Err(GraphError::NeighborOutOfRange { neighbor: u, nodes: num_nodes });
            }
            adjacency[u as usize].push(v);
        }
        let forward = CompressedAdjacency::from_adjacency(&adjacency)?;
        let reverse = forward.transpose();
        Ok(Self { forward, reverse })
    }

    /// Builds a graph from arbitrary ids, renumbering nodes densely in order of
    /// first appearance (source before destination within an edge).
    ///
    /// # Errors
    /// Fails if more than `u32::MAX` distinct ids or edges appear.
    pub fn from_edge_list_renumbered(
        edges: &[(u64, u64)],
    ) -> Result<(Self, NodeRenumbering), GraphError> {
        let mut renumbering = NodeRenumbering::default();
        let mut dense = Vec::with_capacity(edges.len());
        for &(u, v) in edges {
            let du = renumbering.assign(u)?;
            let dv = renumbering.assign(v)?;
            dense.push((du, dv));
        }
        let graph = Self::from_edges(renumbering.len(), &dense)?;
        Ok((graph, renumbering))
    }

    /// Forward (out-edge) view.
    pub fn forward(&self) -> CompressedView<'_> {
        self.forward.view()
    }

    /// Reverse (in-edge) view.
    pub fn reverse(&self) -> CompressedView<'_> {
        self.reverse.view()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.forward.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.forward.edge_count()
    }
}
