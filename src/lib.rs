//! # `dobfs` - Direction-Optimizing Breadth-First Search
//!
//! Single-source hop distances over a static, unweighted directed graph, computed
//! by an engine that switches between *push* (frontier nodes scan their
//! out-edges) and *pull* (unexplored nodes scan their in-edges for a frontier
//! parent) once per BFS level.
//!
//! ## Architecture
//!
//! A run is a fixed set of long-lived stages connected by bounded,
//! single-producer/single-consumer epoch streams:
//!
//! 1. **Controller** (`bfs::controller`):
//!    - Owns the epoch loop and the push/pull decision
//!    - Stops at the first epoch that explores no new node
//!
//! 2. **Traversal Worker** (`bfs::worker`):
//!    - Owns the double-buffered frontier and the explored set
//!    - Runs one push or pull scan per epoch and reports statistics
//!
//! 3. **Neighbor Cache** (`bfs::cache`):
//!    - Direct-mapped, fixed-width lines over the reverse adjacency array
//!    - Serves pull-phase in-list reads, with early abort
//!
//! 4. **Depth Writer** (`bfs::depth`):
//!    - Stamps each newly visited node with the current epoch
//!
//! Every stream operation takes a `&GhostToken<'brand>`: a zero-sized capability
//! branded per run, so streams and frontier sets from different runs can never
//! be wired together.
//!
//! ## Example
//!
//! ```rust
//! use dobfs::{BfsConfig, BfsEngine, DirectedGraph, SwitchPolicy, UNREACHED};
//!
//! let g = DirectedGraph::from_edges(5, &[(0, 1), (1, 2), (0, 3), (3, 2)]).unwrap();
//! for policy in [SwitchPolicy::Adaptive, SwitchPolicy::AlwaysPush, SwitchPolicy::AlwaysPull] {
//!     let config = BfsConfig::default().with_policy(policy);
//!     let engine = BfsEngine::<16>::new(g.forward(), g.reverse(), config).unwrap();
//!     assert_eq!(engine.run(0).unwrap().depths, vec![0, 1, 2, 1, UNREACHED]);
//! }
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod bfs;
pub mod concurrency;
pub mod graph;
pub mod token;

pub use bfs::{
    BfsConfig, BfsEngine, BfsError, BfsOutput, Depth, Direction, EpochStats, SwitchPolicy,
    TraversalReport, TraversalStrategy, UNREACHED,
};
pub use graph::{CompressedAdjacency, CompressedView, DirectedGraph, GraphError, NodeId};
pub use token::GhostToken;

// Compile-time layout checks.
const _: () = {
    use core::mem;

    // Tokens are ZSTs.
    assert!(mem::size_of::<GhostToken<'static>>() == 0);

    // Branded atomics are thin wrappers around the std atomic.
    assert!(
        mem::size_of::<concurrency::GhostAtomicUsize<'static>>()
            == mem::size_of::<core::sync::atomic::AtomicUsize>()
    );

    // Views are two fat pointers.
    assert!(mem::size_of::<CompressedView<'static>>() == 4 * mem::size_of::<usize>());
};
