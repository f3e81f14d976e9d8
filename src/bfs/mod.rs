//! Direction-optimizing breadth-first search.
//!
//! A run is a small pipeline of long-lived stages connected by bounded
//! [`epoch_stream`](crate::concurrency::epoch_stream)s:
//!
//! ```text
//!  controller ──direction──▶ worker ──visited──▶ depth writer
//!      ▲                      │  ▲
//!      └───────stats──────────┘  └──segments── neighbor cache
//! ```
//!
//! Each epoch is one depth level. The controller picks push or pull from the
//! previous epoch's statistics, the worker scans the graph once in that
//! direction, and the depth writer stamps every newly visited node with the
//! epoch number once the epoch's visited stream closes.

mod cache;
mod config;
mod controller;
mod depth;
mod direction;
mod engine;
mod error;
mod frontier;
mod oracle;
mod worker;

pub use cache::{CacheStats, LineSegment, NeighborCache, DEFAULT_LINE};
pub use config::{
    BfsConfig, PushKernel, SwitchPolicy, TraversalStrategy, DEFAULT_ALPHA, DEFAULT_BETA,
    DEFAULT_CACHE_LINES, DEFAULT_MAX_EPOCHS, DEFAULT_MAX_NODES, DEFAULT_UPDATE_QUEUE_DEPTH,
};
pub use direction::{CostEstimate, SwitchHeuristic};
pub use engine::BfsEngine;
pub use error::BfsError;
pub use frontier::{FrontierBuffers, VisitedSet};
pub use oracle::{serial_pull_bfs, serial_push_bfs};

use serde::Serialize;

/// Hop distance from the start node.
pub type Depth = i32;

/// Depth of a node the traversal never reached.
pub const UNREACHED: Depth = -1;

/// `edges_explored` reported by every pull epoch.
///
/// The switching heuristic only calibrates on push-side edge counts, so pull
/// epochs report this constant; [`EpochStats::edges_scanned`] carries the real
/// amount of adjacency read.
pub const PULL_EDGE_MARKER: u64 = 1;

/// Scan direction of one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Frontier nodes claim their unexplored out-neighbors.
    Push,
    /// Unexplored nodes search their in-neighbors for a frontier parent.
    Pull,
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(match self {
            Self::Push => "push",
            Self::Pull => "pull",
        })
    }
}

/// Statistics of one epoch, sent from the worker to the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EpochStats {
    /// Nodes newly explored in this epoch (the next frontier's size).
    pub nodes_updated: u64,
    /// Heuristic edge count: summed out-degree of the frontier for push,
    /// [`PULL_EDGE_MARKER`] for pull.
    pub edges_explored: u64,
    /// Adjacency entries actually read.
    pub edges_scanned: u64,
}

/// One completed epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpochRecord {
    /// 1-based epoch number; nodes updated here have this depth.
    pub epoch: usize,
    /// Direction the epoch ran in.
    pub direction: Direction,
    /// Frontier size entering the epoch.
    pub frontier: u64,
    /// What the worker reported.
    pub stats: EpochStats,
}

/// Per-run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraversalReport {
    /// Every epoch in order, including the final zero-update epoch.
    pub epochs: Vec<EpochRecord>,
    /// Neighbor-cache counters, when the cache ran with statistics enabled.
    pub cache: Option<CacheStats>,
}

impl TraversalReport {
    /// Nodes explored, including the start node.
    pub fn nodes_explored(&self) -> u64 {
        1 + self.epochs.iter().map(|e| e.stats.nodes_updated).sum::<u64>()
    }

    /// Adjacency entries read over the whole run.
    pub fn edges_scanned(&self) -> u64 {
        self.epochs.iter().map(|e| e.stats.edges_scanned).sum()
    }

    /// Number of epochs that ran in `direction`.
    pub fn epochs_in(&self, direction: Direction) -> usize {
        self.epochs.iter().filter(|e| e.direction == direction).count()
    }
}

/// Result of a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsOutput {
    /// `depths[v]` is the hop distance of `v` or [`UNREACHED`].
    pub depths: Vec<Depth>,
    /// Epoch-by-epoch summary.
    pub report: TraversalReport,
}
