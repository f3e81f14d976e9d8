//! The traversal worker stage: one push or pull scan per epoch.

use core::ops::ControlFlow;
use core::sync::atomic::Ordering;

use super::cache::CacheClient;
use super::frontier::{FrontierBuffers, VisitedSet};
use super::{BfsError, Direction, EpochStats, PushKernel, TraversalStrategy, PULL_EDGE_MARKER};
use crate::concurrency::{EpochReceiver, EpochSender, RecvError, SendError};
use crate::graph::{CompressedView, NodeId};
use crate::GhostToken;

/// A command from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerCommand {
    /// Reset all state and make the node the only frontier member (depth 0).
    Seed(NodeId),
    /// Run one epoch in the given direction.
    Epoch(Direction),
}

/// Where pull scans read in-lists from.
pub(crate) trait NeighborSource {
    /// Visits `node`'s in-list in order, in one or more slices, until `visit`
    /// breaks.
    fn scan<F>(&mut self, node: usize, visit: F) -> Result<ControlFlow<()>, BfsError>
    where
        F: FnMut(&[NodeId]) -> ControlFlow<()>;
}

impl NeighborSource for CompressedView<'_> {
    #[inline]
    fn scan<F>(&mut self, node: usize, mut visit: F) -> Result<ControlFlow<()>, BfsError>
    where
        F: FnMut(&[NodeId]) -> ControlFlow<()>,
    {
        Ok(visit(self.neighbors(node)))
    }
}

impl<const LINE: usize> NeighborSource for CacheClient<'_, '_, LINE> {
    #[inline]
    fn scan<F>(&mut self, node: usize, visit: F) -> Result<ControlFlow<()>, BfsError>
    where
        F: FnMut(&[NodeId]) -> ControlFlow<()>,
    {
        CacheClient::scan(self, node, visit)
    }
}

fn gone<T>(stage: &'static str) -> impl Fn(SendError<T>) -> BfsError {
    move |_| BfsError::StageDisconnected(stage)
}

/// Owns the frontier and explored sets and scans the graph once per epoch.
pub(crate) struct TraversalWorker<'g, 'brand, S> {
    forward: CompressedView<'g>,
    reverse: CompressedView<'g>,
    frontier: FrontierBuffers<'brand>,
    explored: VisitedSet<'brand>,
    source: S,
    strategy: TraversalStrategy,
    scatter: Vec<NodeId>,
}

impl<'g, 'brand, S: NeighborSource> TraversalWorker<'g, 'brand, S> {
    pub(crate) fn new(
        forward: CompressedView<'g>,
        reverse: CompressedView<'g>,
        source: S,
        strategy: TraversalStrategy,
    ) -> Self {
        let nodes = forward.node_count();
        Self {
            forward,
            reverse,
            frontier: FrontierBuffers::new(nodes),
            explored: VisitedSet::new(nodes),
            source,
            strategy,
            scatter: Vec::new(),
        }
    }

    /// Serves controller commands until the controller hangs up.
    ///
    /// Every command's output ends with an end-of-transaction marker on the
    /// visited stream; epochs additionally send their statistics and a marker
    /// on the stats stream.
    pub(crate) fn run(
        mut self,
        commands: &EpochReceiver<'brand, WorkerCommand>,
        visited: &EpochSender<'brand, NodeId>,
        stats: &EpochSender<'brand, EpochStats>,
        token: &GhostToken<'brand>,
    ) -> Result<(), BfsError> {
        loop {
            let command = match commands.recv(token) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(RecvError) => return Ok(()),
            };
            match command {
                WorkerCommand::Seed(start) => {
                    self.seed(start as usize);
                    visited.send(start, token).map_err(gone("depth writer"))?;
                    visited.close(token).map_err(gone("depth writer"))?;
                }
                WorkerCommand::Epoch(direction) => {
                    let epoch = self.run_epoch(direction, |v| {
                        visited.send(v, token).map_err(gone("depth writer"))
                    })?;
                    visited.close(token).map_err(gone("depth writer"))?;
                    stats.send(epoch, token).map_err(gone("controller"))?;
                    stats.close(token).map_err(gone("controller"))?;
                }
            }
        }
    }

    pub(crate) fn seed(&mut self, start: usize) {
        self.explored.clear();
        self.explored.try_visit(start, Ordering::Relaxed);
        self.frontier.seed(start);
    }

    /// Scans once in `direction`, passing every newly explored node to `emit`,
    /// then swaps the frontiers.
    pub(crate) fn run_epoch<E>(&mut self, direction: Direction, mut emit: E) -> Result<EpochStats, BfsError>
    where
        E: FnMut(NodeId) -> Result<(), BfsError>,
    {
        let stats = match direction {
            Direction::Push => match self.strategy.push_kernel {
                PushKernel::VertexCentric => self.push_vertex_centric(&mut emit)?,
                PushKernel::ScatterGather => self.push_scatter_gather(&mut emit)?,
                #[cfg(feature = "parallel")]
                PushKernel::Parallel => self.push_parallel(&mut emit)?,
            },
            Direction::Pull => self.pull(&mut emit)?,
        };
        self.frontier.advance();
        tracing::trace!(%direction, ?stats, "epoch scanned");
        Ok(stats)
    }

    fn push_vertex_centric<E>(&mut self, emit: &mut E) -> Result<EpochStats, BfsError>
    where
        E: FnMut(NodeId) -> Result<(), BfsError>,
    {
        let mut stats = EpochStats::default();
        let next = self.frontier.next();
        for u in self.frontier.current().iter() {
            let neighbors = self.forward.neighbors(u);
            stats.edges_explored += neighbors.len() as u64;
            for &v in neighbors {
                if self.explored.try_visit(v as usize, Ordering::Relaxed) {
                    next.try_visit(v as usize, Ordering::Relaxed);
                    emit(v)?;
                    stats.nodes_updated += 1;
                }
            }
        }
        stats.edges_scanned = stats.edges_explored;
        Ok(stats)
    }

    fn push_scatter_gather<E>(&mut self, emit: &mut E) -> Result<EpochStats, BfsError>
    where
        E: FnMut(NodeId) -> Result<(), BfsError>,
    {
        let mut stats = EpochStats::default();
        self.scatter.clear();
        for u in self.frontier.current().iter() {
            self.scatter.extend_from_slice(self.forward.neighbors(u));
        }
        stats.edges_explored = self.scatter.len() as u64;
        stats.edges_scanned = stats.edges_explored;

        let next = self.frontier.next();
        for &v in &self.scatter {
            if self.explored.try_visit(v as usize, Ordering::Relaxed) {
                next.try_visit(v as usize, Ordering::Relaxed);
                emit(v)?;
                stats.nodes_updated += 1;
            }
        }
        Ok(stats)
    }

    #[cfg(feature = "parallel")]
    fn push_parallel<E>(&mut self, emit: &mut E) -> Result<EpochStats, BfsError>
    where
        E: FnMut(NodeId) -> Result<(), BfsError>,
    {
        use rayon::prelude::*;

        let current: Vec<usize> = self.frontier.current().iter().collect();
        let forward = self.forward;
        let explored = &self.explored;
        let claimed: Vec<(Vec<NodeId>, u64)> = current
            .par_iter()
            .map(|&u| {
                let neighbors = forward.neighbors(u);
                let won = neighbors
                    .iter()
                    .copied()
                    .filter(|&v| explored.try_visit(v as usize, Ordering::AcqRel))
                    .collect();
                (won, neighbors.len() as u64)
            })
            .collect();

        let mut stats = EpochStats::default();
        let next = self.frontier.next();
        for (won, degree) in claimed {
            stats.edges_explored += degree;
            for v in won {
                next.try_visit(v as usize, Ordering::Relaxed);
                emit(v)?;
                stats.nodes_updated += 1;
            }
        }
        stats.edges_scanned = stats.edges_explored;
        Ok(stats)
    }

    fn pull<E>(&mut self, emit: &mut E) -> Result<EpochStats, BfsError>
    where
        E: FnMut(NodeId) -> Result<(), BfsError>,
    {
        let mut stats = EpochStats {
            edges_explored: PULL_EDGE_MARKER,
            ..EpochStats::default()
        };
        let early_exit = self.strategy.early_exit;
        let current = self.frontier.current();
        let next = self.frontier.next();

        for v in 0..self.reverse.node_count() {
            if self.explored.is_visited(v) || self.reverse.degree(v) == 0 {
                continue;
            }
            let mut found = false;
            let mut scanned = 0usize;
            let _ = self.source.scan(v, |parents| {
                for (i, &u) in parents.iter().enumerate() {
                    if current.is_visited(u as usize) {
                        found = true;
                        if early_exit {
                            scanned += i + 1;
                            return ControlFlow::Break(());
                        }
                    }
                }
                scanned += parents.len();
                ControlFlow::Continue(())
            })?;
            stats.edges_scanned += scanned as u64;

            if found {
                self.explored.try_visit(v, Ordering::Relaxed);
                next.try_visit(v, Ordering::Relaxed);
                emit(v as NodeId)?;
                stats.nodes_updated += 1;
            }
        }
        Ok(stats)
    }

    #[cfg(test)]
    pub(crate) fn explored(&self) -> &VisitedSet<'brand> {
        &self.explored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DirectedGraph;

    fn diamond() -> DirectedGraph {
        // 0 -> 1 -> 2, 0 -> 3 -> 2, 4 isolated
        DirectedGraph::from_edges(5, &[(0, 1), (1, 2), (0, 3), (3, 2)]).unwrap()
    }

    fn epoch<S: NeighborSource>(
        worker: &mut TraversalWorker<'_, '_, S>,
        direction: Direction,
    ) -> (Vec<NodeId>, EpochStats) {
        let mut out = Vec::new();
        let stats = worker
            .run_epoch(direction, |v| {
                out.push(v);
                Ok(())
            })
            .unwrap();
        out.sort_unstable();
        (out, stats)
    }

    #[test]
    fn push_counts_full_out_degree() {
        let g = diamond();
        let mut w = TraversalWorker::new(g.forward(), g.reverse(), g.reverse(), TraversalStrategy::default());
        w.seed(0);
        let (level1, stats) = epoch(&mut w, Direction::Push);
        assert_eq!(level1, vec![1, 3]);
        assert_eq!(stats, EpochStats { nodes_updated: 2, edges_explored: 2, edges_scanned: 2 });

        // Both 1 and 3 reach 2; only one claims it, but both edges are counted.
        let (level2, stats) = epoch(&mut w, Direction::Push);
        assert_eq!(level2, vec![2]);
        assert_eq!(stats.nodes_updated, 1);
        assert_eq!(stats.edges_explored, 2);

        let (level3, stats) = epoch(&mut w, Direction::Push);
        assert!(level3.is_empty());
        assert_eq!(stats.nodes_updated, 0);
        assert_eq!(w.explored().count(), 4);
    }

    #[test]
    fn pull_reports_marker_and_short_circuits() {
        let g = DirectedGraph::from_edges(4, &[(0, 3), (1, 3), (2, 3), (0, 1)]).unwrap();
        let mut w = TraversalWorker::new(g.forward(), g.reverse(), g.reverse(), TraversalStrategy::default());
        w.seed(0);
        let (level1, stats) = epoch(&mut w, Direction::Pull);
        assert_eq!(level1, vec![1, 3]);
        assert_eq!(stats.nodes_updated, 2);
        assert_eq!(stats.edges_explored, PULL_EDGE_MARKER);
        // Node 1 reads its only parent; node 3 stops at parent 0.
        assert_eq!(stats.edges_scanned, 2);
    }

    #[test]
    fn pull_without_early_exit_reads_whole_lists() {
        let g = DirectedGraph::from_edges(4, &[(0, 3), (1, 3), (2, 3), (0, 1)]).unwrap();
        let strategy = TraversalStrategy {
            early_exit: false,
            ..TraversalStrategy::default()
        };
        let mut w = TraversalWorker::new(g.forward(), g.reverse(), g.reverse(), strategy);
        w.seed(0);
        let (level1, stats) = epoch(&mut w, Direction::Pull);
        assert_eq!(level1, vec![1, 3]);
        assert_eq!(stats.edges_scanned, 4);
    }

    #[test]
    fn nodes_found_this_epoch_are_not_parents() {
        // 0 -> 1 -> 2: pulling from {0} must not reach 2 in the same epoch.
        let g = DirectedGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let mut w = TraversalWorker::new(g.forward(), g.reverse(), g.reverse(), TraversalStrategy::default());
        w.seed(0);
        assert_eq!(epoch(&mut w, Direction::Pull).0, vec![1]);
        assert_eq!(epoch(&mut w, Direction::Pull).0, vec![2]);
    }

    #[test]
    fn mixed_directions_and_kernels_agree() {
        let g = diamond();
        for kernel in [PushKernel::VertexCentric, PushKernel::ScatterGather] {
            let strategy = TraversalStrategy {
                push_kernel: kernel,
                ..TraversalStrategy::default()
            };
            let mut w = TraversalWorker::new(g.forward(), g.reverse(), g.reverse(), strategy);
            w.seed(0);
            assert_eq!(epoch(&mut w, Direction::Push).0, vec![1, 3]);
            assert_eq!(epoch(&mut w, Direction::Pull).0, vec![2]);
            assert!(epoch(&mut w, Direction::Push).0.is_empty());
            assert!(!w.explored().is_visited(4));
        }
    }

    #[test]
    fn emit_failure_propagates() {
        let g = diamond();
        let mut w = TraversalWorker::new(g.forward(), g.reverse(), g.reverse(), TraversalStrategy::default());
        w.seed(0);
        let err = w
            .run_epoch(Direction::Push, |_| Err(BfsError::StageDisconnected("depth writer")))
            .unwrap_err();
        assert_eq!(err, BfsError::StageDisconnected("depth writer"));
    }
}
