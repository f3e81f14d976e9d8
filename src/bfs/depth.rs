//! The depth writer stage.

use super::{Depth, UNREACHED};
use crate::concurrency::{EpochReceiver, RecvError};
use crate::graph::NodeId;
use crate::GhostToken;

/// Stamps visited nodes with the epoch that reached them.
///
/// The counter starts at 0 (the seed) and advances once per end-of-transaction
/// marker on the visited stream.
#[derive(Debug)]
pub(crate) struct DepthWriter {
    depths: Vec<Depth>,
    current: Depth,
}

impl DepthWriter {
    pub(crate) fn new(nodes: usize) -> Self {
        Self {
            depths: vec![UNREACHED; nodes],
            current: 0,
        }
    }

    #[inline]
    pub(crate) fn record(&mut self, node: NodeId) {
        let slot = &mut self.depths[node as usize];
        debug_assert_eq!(*slot, UNREACHED, "node {node} visited twice");
        if *slot == UNREACHED {
            *slot = self.current;
        }
    }

    #[inline]
    pub(crate) fn end_epoch(&mut self) {
        self.current += 1;
    }

    /// Consumes visited nodes until the worker hangs up and returns the depths.
    pub(crate) fn run<'brand>(
        mut self,
        visited: &EpochReceiver<'brand, NodeId>,
        token: &GhostToken<'brand>,
    ) -> Vec<Depth> {
        loop {
            match visited.recv(token) {
                Ok(Some(node)) => self.record(node),
                Ok(None) => self.end_epoch(),
                Err(RecvError) => {
                    tracing::trace!(epochs = self.current, "depth writer done");
                    return self.depths;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::epoch_stream;

    #[test]
    fn markers_advance_depth() {
        GhostToken::new(|token| {
            let (tx, rx) = epoch_stream::<NodeId>(16);
            tx.send(2, &token).unwrap();
            tx.close(&token).unwrap();
            tx.send(0, &token).unwrap();
            tx.send(3, &token).unwrap();
            tx.close(&token).unwrap();
            // An empty epoch still advances the counter.
            tx.close(&token).unwrap();
            tx.send(1, &token).unwrap();
            tx.close(&token).unwrap();
            drop(tx);

            let depths = DepthWriter::new(5).run(&rx, &token);
            assert_eq!(depths, vec![1, 3, 0, 1, UNREACHED]);
        });
    }
}
