//! Compressed adjacency storage (CSR for out-edges, CSC for in-edges).
//!
//! Memory layout:
//! - `index`: `Vec<Offset>` of length `n + 1`, `index[0] == 0`, monotone
//! - `neighbors`: contiguous `NodeId` array of length `index[n]`
//!
//! The same layout serves both directions: a forward (CSR) adjacency lists
//! successors, its [`transpose`](CompressedAdjacency::transpose) (CSC) lists
//! predecessors. The traversal engine only ever reads [`CompressedView`]s.

use core::ops::Range;

use super::{GraphError, NodeId, Offset};

/// Owned compressed adjacency arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedAdjacency {
    index: Vec<Offset>,
    neighbors: Vec<NodeId>,
}

impl CompressedAdjacency {
    /// Builds compressed adjacency from an adjacency list.
    ///
    /// # Errors
    /// Fails if any neighbor is out of bounds or the sizes overflow 32-bit ids.
    pub fn from_adjacency(adjacency: &[Vec<NodeId>]) -> Result<Self, GraphError> {
        let n = adjacency.len();
        check_id_space(n)?;

        let mut index = Vec::with_capacity(n + 1);
        index.push(0);
        let mut total = 0usize;
        for nbrs in adjacency {
            total += nbrs.len();
            index.push(to_offset(total)?);
        }

        let mut neighbors = Vec::with_capacity(total);
        for nbrs in adjacency {
            for &v in nbrs {
                if v as usize >= n {
                    return Err(GraphError::NeighborOutOfRange { neighbor: v, nodes: n });
                }
                neighbors.push(v);
            }
        }

        Ok(Self { index, neighbors })
    }

    /// Builds compressed adjacency directly from its parts, validating them.
    ///
    /// # Errors
    /// - [`GraphError::IndexLength`] if `index` is empty or `index[0] != 0`
    /// - [`GraphError::NonMonotoneIndex`] if offsets decrease
    /// - [`GraphError::EdgeCountMismatch`] if `index[n] != neighbors.len()`
    /// - [`GraphError::NeighborOutOfRange`] if a neighbor id is `>= n`
    pub fn from_parts(index: Vec<Offset>, neighbors: Vec<NodeId>) -> Result<Self, GraphError> {
        CompressedView::new(&index, &neighbors)?;
        Ok(Self { index, neighbors })
    }

    /// Returns the transposed adjacency (in-edges become out-edges).
    ///
    /// Within each node the transposed neighbors keep ascending source order.
    pub fn transpose(&self) -> Self {
        let n = self.node_count();
        let mut degrees = vec![0 as Offset; n];
        for &v in &self.neighbors {
            degrees[v as usize] += 1;
        }

        let mut index = Vec::with_capacity(n + 1);
        index.push(0);
        let mut running: Offset = 0;
        for d in degrees {
            running += d;
            index.push(running);
        }

        let mut write_pos: Vec<usize> = index[..n].iter().map(|&o| o as usize).collect();
        let mut neighbors = vec![0 as NodeId; self.neighbors.len()];
        for u in 0..n {
            for &v in self.view().neighbors(u) {
                let slot = &mut write_pos[v as usize];
                // `u < n` and `n` fits in `NodeId` per construction.
                #[allow(clippy::cast_possible_truncation)]
                {
                    neighbors[*slot] = u as NodeId;
                }
                *slot += 1;
            }
        }

        Self { index, neighbors }
    }

    /// Borrows the arrays as a read-only view.
    #[inline]
    pub fn view(&self) -> CompressedView<'_> {
        CompressedView {
            index: &self.index,
            neighbors: &self.neighbors,
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.index.len() - 1
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.len()
    }

    /// The offset array (`n + 1` entries).
    pub fn index(&self) -> &[Offset] {
        &self.index
    }

    /// The neighbor array.
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }
}

/// A borrowed, read-only `index[]`/`neighbors[]` pair.
///
/// This is the shape in which the traversal core consumes graphs. Views built
/// with [`CompressedView::new`] are validated; views borrowed from a
/// [`CompressedAdjacency`] are valid by construction.
#[derive(Debug, Clone, Copy)]
pub struct CompressedView<'g> {
    index: &'g [Offset],
    neighbors: &'g [NodeId],
}

impl<'g> CompressedView<'g> {
    /// Wraps raw arrays after validating the offset invariants.
    ///
    /// # Errors
    /// Same conditions as [`CompressedAdjacency::from_parts`].
    pub fn new(index: &'g [Offset], neighbors: &'g [NodeId]) -> Result<Self, GraphError> {
        if index.first() != Some(&0) {
            return Err(GraphError::IndexLength { len: index.len() });
        }
        let n = index.len() - 1;
        check_id_space(n)?;
        if let Some(node) = index.windows(2).position(|w| w[0] > w[1]) {
            return Err(GraphError::NonMonotoneIndex { node });
        }
        let last_offset = index[n];
        if last_offset as usize != neighbors.len() {
            return Err(GraphError::EdgeCountMismatch {
                last_offset,
                edges: neighbors.len(),
            });
        }
        if let Some(&neighbor) = neighbors.iter().find(|&&v| v as usize >= n) {
            return Err(GraphError::NeighborOutOfRange { neighbor, nodes: n });
        }
        Ok(Self { index, neighbors })
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.index.len() - 1
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Offset range of `node`'s neighbors inside [`raw_neighbors`](Self::raw_neighbors).
    #[inline]
    pub fn range(&self, node: usize) -> Range<usize> {
        self.index[node] as usize..self.index[node + 1] as usize
    }

    /// The neighbors of `node`.
    #[inline]
    pub fn neighbors(&self, node: usize) -> &'g [NodeId] {
        &self.neighbors[self.range(node)]
    }

    /// Number of neighbors of `node`.
    #[inline]
    pub fn degree(&self, node: usize) -> usize {
        (self.index[node + 1] - self.index[node]) as usize
    }

    /// The full neighbor array.
    #[inline]
    pub fn raw_neighbors(&self) -> &'g [NodeId] {
        self.neighbors
    }
}

fn check_id_space(n: usize) -> Result<(), GraphError> {
    if NodeId::try_from(n).is_err() {
        return Err(GraphError::TooManyNodes { count: n });
    }
    Ok(())
}

fn to_offset(total: usize) -> Result<Offset, GraphError> {
    Offset::try_from(total).map_err(|_| GraphError::TooManyNodes { count: total })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> CompressedAdjacency {
        // 0 -> 1, 0 -> 3, 1 -> 2, 3 -> 2
        CompressedAdjacency::from_adjacency(&[vec![1, 3], vec![2], vec![], vec![2]]).unwrap()
    }

    #[test]
    fn from_adjacency_lays_out_offsets() {
        let g = diamond();
        assert_eq!(g.index(), &[0, 2, 3, 3, 4]);
        assert_eq!(g.neighbors(), &[1, 3, 2, 2]);
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.view().degree(0), 2);
        assert_eq!(g.view().neighbors(2), &[] as &[NodeId]);
    }

    #[test]
    fn transpose_lists_predecessors_in_source_order() {
        let t = diamond().transpose();
        assert_eq!(t.view().neighbors(0), &[] as &[NodeId]);
        assert_eq!(t.view().neighbors(1), &[0]);
        assert_eq!(t.view().neighbors(2), &[1, 3]);
        assert_eq!(t.view().neighbors(3), &[0]);
        assert_eq!(t.transpose(), diamond());
    }

    #[test]
    fn from_parts_rejects_malformed_arrays() {
        assert!(matches!(
            CompressedAdjacency::from_parts(vec![], vec![]),
            Err(GraphError::IndexLength { len: 0 })
        ));
        assert!(matches!(
            CompressedAdjacency::from_parts(vec![1, 1], vec![0]),
            Err(GraphError::IndexLength { .. })
        ));
        assert!(matches!(
            CompressedAdjacency::from_parts(vec![0, 2, 1], vec![0, 1]),
            Err(GraphError::NonMonotoneIndex { node: 1 })
        ));
        assert!(matches!(
            CompressedAdjacency::from_parts(vec![0, 1, 2], vec![0]),
            Err(GraphError::EdgeCountMismatch { last_offset: 2, edges: 1 })
        ));
        assert!(matches!(
            CompressedAdjacency::from_parts(vec![0, 1, 1], vec![2]),
            Err(GraphError::NeighborOutOfRange { neighbor: 2, nodes: 2 })
        ));
    }

    #[test]
    fn empty_graph_is_valid() {
        let g = CompressedAdjacency::from_parts(vec![0], vec![]).unwrap();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.transpose().edge_count(), 0);
    }
}
