//! Serial reference traversals used to validate the engine.

use std::collections::VecDeque;

use super::{Depth, UNREACHED};
use crate::graph::CompressedView;

/// Queue-based BFS over out-edges.
///
/// # Panics
/// Panics if `start >= forward.node_count()`.
pub fn serial_push_bfs(forward: CompressedView<'_>, start: usize) -> Vec<Depth> {
    let n = forward.node_count();
    assert!(start < n, "start node {start} out of bounds");

    let mut depths = vec![UNREACHED; n];
    depths[start] = 0;
    let mut q = VecDeque::with_capacity(64);
    q.push_back(start);
    while let Some(u) = q.pop_front() {
        let next = depths[u] + 1;
        for &v in forward.neighbors(u) {
            let v = v as usize;
            if depths[v] == UNREACHED {
                depths[v] = next;
                q.push_back(v);
            }
        }
    }
    depths
}

/// Queue-based BFS over in-edges: for each dequeued node, every unexplored node
/// whose in-list contains it is assigned the next depth.
///
/// Quadratic in the node count; meant for small validation graphs.
///
/// # Panics
/// Panics if `start >= reverse.node_count()`.
pub fn serial_pull_bfs(reverse: CompressedView<'_>, start: usize) -> Vec<Depth> {
    let n = reverse.node_count();
    assert!(start < n, "start node {start} out of bounds");

    let mut depths = vec![UNREACHED; n];
    depths[start] = 0;
    let mut q = VecDeque::with_capacity(64);
    q.push_back(start);
    while let Some(parent) = q.pop_front() {
        for v in 0..n {
            if depths[v] != UNREACHED {
                continue;
            }
            if reverse.neighbors(v).iter().any(|&u| u as usize == parent) {
                depths[v] = depths[parent] + 1;
                q.push_back(v);
            }
        }
    }
    depths
}
