//! The controller: owns the epoch loop and the direction decision.

use super::worker::WorkerCommand;
use super::{BfsError, Direction, EpochRecord, EpochStats, SwitchHeuristic};
use crate::concurrency::{EpochReceiver, EpochSender};
use crate::graph::NodeId;
use crate::GhostToken;

/// Outcome of the epoch loop.
#[derive(Debug, Default)]
pub(crate) struct ControllerRun {
    pub(crate) epochs: Vec<EpochRecord>,
    pub(crate) converged: bool,
}

pub(crate) struct Controller {
    heuristic: SwitchHeuristic,
    max_epochs: usize,
}

impl Controller {
    pub(crate) fn new(heuristic: SwitchHeuristic, max_epochs: usize) -> Self {
        Self {
            heuristic,
            max_epochs,
        }
    }

    /// Seeds the worker with `start`, then runs epochs until one updates no
    /// node or `max_epochs` have run.
    ///
    /// Each decision is made only after the previous epoch's statistics
    /// transaction has been read to its end marker.
    pub(crate) fn run<'brand>(
        &self,
        start: NodeId,
        commands: &EpochSender<'brand, WorkerCommand>,
        stats: &EpochReceiver<'brand, EpochStats>,
        token: &GhostToken<'brand>,
    ) -> Result<ControllerRun, BfsError> {
        let gone = || BfsError::StageDisconnected("traversal worker");
        let issue = |command| -> Result<(), BfsError> {
            commands.send(command, token).map_err(|_| gone())?;
            commands.close(token).map_err(|_| gone())
        };

        issue(WorkerCommand::Seed(start))?;

        let mut run = ControllerRun::default();
        let mut direction = Direction::Push;
        let mut frontier = 1u64;
        let mut explored = 1u64;

        for epoch in 1..=self.max_epochs {
            direction = self.heuristic.decide(direction, frontier, explored);
            tracing::debug!(
                epoch,
                %direction,
                frontier,
                explored,
                estimate = ?self.heuristic.estimate(frontier, explored),
                "starting epoch"
            );
            issue(WorkerCommand::Epoch(direction))?;

            let epoch_stats = stats
                .recv_last(token)
                .map_err(|_| gone())?
                .ok_or_else(gone)?;
            tracing::debug!(
                epoch,
                nodes_updated = epoch_stats.nodes_updated,
                edges_explored = epoch_stats.edges_explored,
                edges_scanned = epoch_stats.edges_scanned,
                "epoch finished"
            );
            run.epochs.push(EpochRecord {
                epoch,
                direction,
                frontier,
                stats: epoch_stats,
            });

            if epoch_stats.nodes_updated == 0 {
                run.converged = true;
                break;
            }
            frontier = epoch_stats.nodes_updated;
            explored += epoch_stats.nodes_updated;
        }
        Ok(run)
    }
}
