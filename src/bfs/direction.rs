//! Per-epoch push/pull selection.

use super::{BfsConfig, Direction, SwitchPolicy};
use serde::Serialize;

/// Edge-work estimates behind one adaptive decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CostEstimate {
    /// Unexplored nodes a pull scan is expected to resolve productively.
    pub seen: u64,
    /// Unexplored nodes a pull scan is expected to scan in full.
    pub unseen: u64,
    /// Estimated edges read by a push epoch.
    pub push_edges: u64,
    /// Estimated edges read by a pull epoch.
    pub pull_edges: u64,
}

impl CostEstimate {
    /// The direction this estimate favors; ties go to pull.
    #[inline]
    pub fn cheaper(&self) -> Direction {
        if self.pull_edges <= self.push_edges {
            Direction::Pull
        } else {
            Direction::Push
        }
    }
}

/// Chooses the direction of the next epoch from the graph's shape and the
/// previous epoch's outcome.
///
/// `frontier` is the previous epoch's `nodes_updated` and `explored` the total
/// explored so far, start node included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchHeuristic {
    policy: SwitchPolicy,
    alpha: u64,
    beta: u64,
    nodes: u64,
    edges: u64,
}

impl SwitchHeuristic {
    /// Builds a heuristic for a graph with `nodes` nodes and `edges` edges.
    pub fn new(policy: SwitchPolicy, alpha: u64, beta: u64, nodes: u64, edges: u64) -> Self {
        Self {
            policy,
            alpha: alpha.max(1),
            beta: beta.max(1),
            nodes: nodes.max(1),
            edges,
        }
    }

    /// Builds a heuristic from the engine configuration.
    pub fn from_config(config: &BfsConfig, nodes: usize, edges: usize) -> Self {
        Self::new(
            config.strategy.policy,
            config.alpha,
            config.beta,
            nodes as u64,
            edges as u64,
        )
    }

    /// Average out-degree, rounded down.
    #[inline]
    fn avg_degree(&self) -> u64 {
        self.edges / self.nodes
    }

    /// The adaptive cost model.
    ///
    /// ```rust
    /// use dobfs::bfs::{SwitchHeuristic, SwitchPolicy};
    ///
    /// // 100 nodes, 400 edges, 10 in the frontier, 20 explored.
    /// let h = SwitchHeuristic::new(SwitchPolicy::Adaptive, 15, 18, 100, 400);
    /// let est = h.estimate(10, 20);
    /// assert_eq!(est.seen, 26);            // min(3 * 10, 80 / 3)
    /// assert_eq!(est.unseen, 54);
    /// assert_eq!(est.push_edges, 40);      // 4 * 10
    /// assert_eq!(est.pull_edges, 216 + 260); // 4 * 54 + (100 / 10) * 26
    /// ```
    pub fn estimate(&self, frontier: u64, explored: u64) -> CostEstimate {
        let frontier = frontier.max(1);
        let remaining = self.nodes.saturating_sub(explored);
        let seen = frontier.saturating_mul(3).min(remaining / 3);
        let unseen = remaining - seen;
        let degree = self.avg_degree();
        CostEstimate {
            seen,
            unseen,
            push_edges: degree.saturating_mul(frontier),
            pull_edges: degree
                .saturating_mul(unseen)
                .saturating_add((self.nodes / frontier).saturating_mul(seen)),
        }
    }

    /// Picks the next epoch's direction given the one just run.
    pub fn decide(&self, current: Direction, frontier: u64, explored: u64) -> Direction {
        match self.policy {
            SwitchPolicy::AlwaysPush => Direction::Push,
            SwitchPolicy::AlwaysPull => Direction::Pull,
            SwitchPolicy::Adaptive => self.estimate(frontier, explored).cheaper(),
            SwitchPolicy::Beamer => self.beamer(current, frontier, explored),
        }
    }

    fn beamer(&self, current: Direction, frontier: u64, explored: u64) -> Direction {
        let degree = self.avg_degree();
        match current {
            Direction::Push => {
                let m_f = degree.saturating_mul(frontier);
                let m_u = degree.saturating_mul(self.nodes.saturating_sub(explored));
                if m_f > m_u / self.alpha {
                    Direction::Pull
                } else {
                    Direction::Push
                }
            }
            Direction::Pull => {
                if frontier < self.nodes / self.beta {
                    Direction::Push
                } else {
                    Direction::Pull
                }
            }
        }
    }
}
