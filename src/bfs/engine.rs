//! The traversal engine: validates inputs, spawns the stages and collects
//! their results.

use std::thread::ScopedJoinHandle;
use std::time::Instant;

use super::cache::{serve, CacheClient, CacheRequest, REQUEST_DEPTH, RESPONSE_DEPTH};
use super::controller::Controller;
use super::depth::DepthWriter;
use super::worker::{TraversalWorker, WorkerCommand};
use super::{
    BfsConfig, BfsError, BfsOutput, Direction, EpochStats, LineSegment,
    NeighborCache, SwitchHeuristic, TraversalReport, DEFAULT_LINE,
};
use crate::concurrency::{epoch_stream, with_read_scope};
use crate::graph::{CompressedView, NodeId};
use crate::GhostToken;

/// Capacity of the controller → worker command stream.
const COMMAND_DEPTH: usize = 2;
/// Capacity of the worker → controller statistics stream.
const STATS_DEPTH: usize = 1;

/// A direction-optimizing BFS engine over one graph.
///
/// `LINE` is the neighbor-cache line width in node ids.
///
/// ```rust
/// use dobfs::bfs::{BfsConfig, BfsEngine, UNREACHED};
/// use dobfs::graph::DirectedGraph;
///
/// let g = DirectedGraph::from_edges(5, &[(0, 1), (1, 2), (0, 3), (3, 2)]).unwrap();
/// let engine = BfsEngine::<16>::new(g.forward(), g.reverse(), BfsConfig::default()).unwrap();
/// let out = engine.run(0).unwrap();
/// assert_eq!(out.depths, vec![0, 1, 2, 1, UNREACHED]);
/// ```
#[derive(Debug, Clone)]
pub struct BfsEngine<'g, const LINE: usize = DEFAULT_LINE> {
    forward: CompressedView<'g>,
    reverse: CompressedView<'g>,
    config: BfsConfig,
}

impl<'g, const LINE: usize> BfsEngine<'g, LINE> {
    /// Creates an engine over a forward (out-edge) and reverse (in-edge) view of
    /// the same graph.
    ///
    /// # Errors
    /// - [`BfsError::InvalidConfig`] if `config` fails validation
    /// - [`BfsError::ShapeMismatch`] if the views differ in node or edge count
    /// - [`BfsError::TooManyNodes`] if the graph exceeds `config.max_nodes`
    pub fn new(
        forward: CompressedView<'g>,
        reverse: CompressedView<'g>,
        config: BfsConfig,
    ) -> Result<Self, BfsError> {
        config.validate()?;
        let shape = |v: &CompressedView<'_>| (v.node_count(), v.edge_count());
        if shape(&forward) != shape(&reverse) {
            return Err(BfsError::ShapeMismatch {
                forward: shape(&forward),
                reverse: shape(&reverse),
            });
        }
        if forward.node_count() > config.max_nodes {
            return Err(BfsError::TooManyNodes {
                nodes: forward.node_count(),
                capacity: config.max_nodes,
            });
        }
        Ok(Self {
            forward,
            reverse,
            config,
        })
    }

    /// The engine configuration.
    pub fn config(&self) -> &BfsConfig {
        &self.config
    }

    /// Nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.forward.node_count()
    }

    /// Edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.forward.edge_count()
    }

    /// Computes hop distances from `start`.
    ///
    /// # Errors
    /// - [`BfsError::StartOutOfRange`] if `start` is not a node
    /// - [`BfsError::EpochLimitExceeded`] if no epoch updated zero nodes within
    ///   `max_epochs`
    /// - [`BfsError::StageDisconnected`] / [`BfsError::StagePanicked`] if a
    ///   pipeline stage failed
    pub fn run(&self, start: usize) -> Result<BfsOutput, BfsError> {
        let nodes = self.node_count();
        if start >= nodes {
            return Err(BfsError::StartOutOfRange { start, nodes });
        }

        let strategy = self.config.strategy;
        tracing::info!(
            nodes,
            edges = self.edge_count(),
            start,
            policy = ?strategy.policy,
            cache = strategy.use_cache,
            "starting traversal"
        );
        let began = Instant::now();

        let heuristic = SwitchHeuristic::from_config(&self.config, nodes, self.edge_count());
        let controller = Controller::new(heuristic, self.config.max_epochs);
        let (depths, cache, run) = GhostToken::new(|token| {
            let (cmd_tx, cmd_rx) = epoch_stream::<WorkerCommand>(COMMAND_DEPTH);
            let (visited_tx, visited_rx) = epoch_stream::<NodeId>(self.config.update_queue_depth);
            let (stats_tx, stats_rx) = epoch_stream::<EpochStats>(STATS_DEPTH);

            with_read_scope(&token, |scope| {
                let depth = scope
                    .spawn_named("dobfs-depth", move |t| {
                        DepthWriter::new(nodes).run(&visited_rx, t)
                    })
                    .map_err(|_| spawn_failed("depth writer"))?;

                let forward = self.forward;
                let reverse = self.reverse;
                let (worker, cache) = if strategy.use_cache {
                    let (req_tx, req_rx) = epoch_stream::<CacheRequest>(REQUEST_DEPTH);
                    let (resp_tx, resp_rx) = epoch_stream::<LineSegment<LINE>>(RESPONSE_DEPTH);
                    let lines = NeighborCache::<LINE>::new(
                        reverse,
                        self.config.cache_lines,
                        self.config.track_cache_stats,
                    );
                    let cache = scope
                        .spawn_named("dobfs-cache", move |t| serve(lines, &req_rx, &resp_tx, t))
                        .map_err(|_| spawn_failed("neighbor cache"))?;
                    let worker = scope
                        .spawn_named("dobfs-worker", move |t| {
                            let client = CacheClient::new(req_tx, resp_rx, t);
                            TraversalWorker::new(forward, reverse, client, strategy)
                                .run(&cmd_rx, &visited_tx, &stats_tx, t)
                        })
                        .map_err(|_| spawn_failed("traversal worker"))?;
                    (worker, Some(cache))
                } else {
                    let worker = scope
                        .spawn_named("dobfs-worker", move |t| {
                            TraversalWorker::new(forward, reverse, reverse, strategy)
                                .run(&cmd_rx, &visited_tx, &stats_tx, t)
                        })
                        .map_err(|_| spawn_failed("traversal worker"))?;
                    (worker, None)
                };

                let run = controller.run(start as NodeId, &cmd_tx, &stats_rx, scope.token());
                // Hanging up shuts the worker down, which in turn stops the
                // cache and the depth writer.
                drop(cmd_tx);
                drop(stats_rx);

                let worker = join(worker, "traversal worker").and_then(|r| r);
                let cache = match cache {
                    Some(handle) => join(handle, "neighbor cache").and_then(|r| r),
                    None => Ok(None),
                };
                let depths = join(depth, "depth writer");
                worker?;
                Ok::<_, BfsError>((depths?, cache?, run?))
            })
        })?;

        if !run.converged {
            tracing::warn!(max_epochs = self.config.max_epochs, "epoch limit reached");
            return Err(BfsError::EpochLimitExceeded {
                max_epochs: self.config.max_epochs,
            });
        }

        let report = TraversalReport {
            epochs: run.epochs,
            cache,
        };
        tracing::info!(
            epochs = report.epochs.len(),
            push_epochs = report.epochs_in(Direction::Push),
            pull_epochs = report.epochs_in(Direction::Pull),
            explored = report.nodes_explored(),
            edges_scanned = report.edges_scanned(),
            elapsed_us = began.elapsed().as_micros() as u64,
            "traversal finished"
        );
        Ok(BfsOutput { depths, report })
    }
}

fn join<T>(handle: ScopedJoinHandle<'_, T>, stage: &'static str) -> Result<T, BfsError> {
    handle.join().map_err(|_| {
        tracing::error!(stage, "pipeline stage panicked");
        BfsError::StagePanicked(stage)
    })
}

fn spawn_failed(stage: &'static str) -> BfsError {
    tracing::error!(stage, "failed to spawn pipeline stage");
    BfsError::StageDisconnected(stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfs::{SwitchPolicy, UNREACHED};
    use crate::graph::DirectedGraph;

    fn diamond() -> DirectedGraph {
        DirectedGraph::from_edges(5, &[(0, 1), (1, 2), (0, 3), (3, 2)]).unwrap()
    }

    #[test]
    fn diamond_depths() {
        let g = diamond();
        let engine = BfsEngine::<4>::new(g.forward(), g.reverse(), BfsConfig::default()).unwrap();
        let out = engine.run(0).unwrap();
        assert_eq!(out.depths, vec![0, 1, 2, 1, UNREACHED]);
        assert_eq!(out.report.nodes_explored(), 4);
        assert_eq!(out.report.epochs.last().unwrap().stats.nodes_updated, 0);
    }

    #[test]
    fn preconditions_are_checked() {
        let g = diamond();
        let small = BfsConfig::default().with_max_nodes(4);
        assert_eq!(
            BfsEngine::<4>::new(g.forward(), g.reverse(), small).unwrap_err(),
            BfsError::TooManyNodes { nodes: 5, capacity: 4 }
        );

        let other = DirectedGraph::from_edges(5, &[(0, 1)]).unwrap();
        assert!(matches!(
            BfsEngine::<4>::new(g.forward(), other.reverse(), BfsConfig::default()),
            Err(BfsError::ShapeMismatch { forward: (5, 4), reverse: (5, 1) })
        ));

        let engine = BfsEngine::<4>::new(g.forward(), g.reverse(), BfsConfig::default()).unwrap();
        assert_eq!(
            engine.run(5).unwrap_err(),
            BfsError::StartOutOfRange { start: 5, nodes: 5 }
        );
    }

    #[test]
    fn epoch_limit_is_an_error() {
        // A path of 6 nodes needs 6 epochs including the final empty one.
        let edges: Vec<(NodeId, NodeId)> = (0..5).map(|i| (i, i + 1)).collect();
        let g = DirectedGraph::from_edges(6, &edges).unwrap();
        let config = BfsConfig::default().with_max_epochs(5);
        let engine = BfsEngine::<4>::new(g.forward(), g.reverse(), config).unwrap();
        assert_eq!(
            engine.run(0).unwrap_err(),
            BfsError::EpochLimitExceeded { max_epochs: 5 }
        );

        let config = BfsConfig::default().with_max_epochs(6);
        let engine = BfsEngine::<4>::new(g.forward(), g.reverse(), config).unwrap();
        assert_eq!(engine.run(0).unwrap().depths, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn cache_stats_are_reported_when_enabled() {
        let g = diamond();
        let config = BfsConfig::default()
            .with_policy(SwitchPolicy::AlwaysPull)
            .with_cache_stats(true);
        let engine = BfsEngine::<4>::new(g.forward(), g.reverse(), config).unwrap();
        let out = engine.run(0).unwrap();
        let stats = out.report.cache.unwrap();
        assert!(stats.lookups > 0);
        assert_eq!(out.report.epochs_in(Direction::Pull), out.report.epochs.len());

        let engine = BfsEngine::<4>::new(g.forward(), g.reverse(), BfsConfig::default().with_cache(false)).unwrap();
        assert_eq!(engine.run(0).unwrap().report.cache, None);
    }

    #[test]
    fn engine_is_reusable() {
        let g = diamond();
        let engine = BfsEngine::<4>::new(g.forward(), g.reverse(), BfsConfig::default()).unwrap();
        assert_eq!(engine.run(1).unwrap().depths, vec![UNREACHED, 0, 1, UNREACHED, UNREACHED]);
        assert_eq!(engine.run(0).unwrap().depths, vec![0, 1, 2, 1, UNREACHED]);
    }
}
