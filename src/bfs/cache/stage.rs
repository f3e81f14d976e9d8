//! The neighbor cache as a pipeline stage.
//!
//! The worker sends `Lookup(v)` and reads line segments until the
//! end-of-transaction marker. If it finds a frontier parent early it sends
//! `Abort(v)` and keeps draining to the marker. The stage polls for that abort
//! between line fetches. An abort that arrives after the lookup already
//! finished is stale and dropped, which is safe because the worker never issues
//! the next lookup before it has read the previous marker.

use core::ops::ControlFlow;

use super::{CacheStats, LineSegment, NeighborCache};
use crate::bfs::BfsError;
use crate::concurrency::{EpochReceiver, EpochSender, RecvError};
use crate::graph::NodeId;
use crate::GhostToken;

/// Capacity of the worker → cache request stream.
pub(crate) const REQUEST_DEPTH: usize = 2;
/// Capacity of the cache → worker segment stream.
pub(crate) const RESPONSE_DEPTH: usize = 8;

/// A request to the cache stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheRequest {
    /// Stream the in-list of a node.
    Lookup(NodeId),
    /// Stop streaming the in-list of a node.
    Abort(NodeId),
}

/// Runs the cache service loop until the worker hangs up.
///
/// Returns the cache counters, if enabled.
pub(crate) fn serve<'brand, const LINE: usize>(
    mut cache: NeighborCache<'_, LINE>,
    requests: &EpochReceiver<'brand, CacheRequest>,
    responses: &EpochSender<'brand, LineSegment<LINE>>,
    token: &GhostToken<'brand>,
) -> Result<Option<CacheStats>, BfsError> {
    let mut pending = None;
    loop {
        let request = match pending.take() {
            Some(r) => r,
            None => match requests.recv(token) {
                Ok(Some(r)) => r,
                Ok(None) => continue,
                Err(RecvError) => break,
            },
        };
        let node = match request {
            CacheRequest::Lookup(node) => node,
            CacheRequest::Abort(node) => {
                tracing::trace!(node, "dropping stale abort");
                continue;
            }
        };

        let mut send_failed = false;
        let _ = cache.scan(node as usize, |values| {
            match requests.try_recv(token) {
                Ok(Some(CacheRequest::Abort(n))) if n == node => return ControlFlow::Break(()),
                Ok(Some(CacheRequest::Abort(_)) | None) | Err(_) => {}
                Ok(Some(other)) => pending = Some(other),
            }
            if responses.send(LineSegment::from_slice(values), token).is_err() {
                send_failed = true;
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        if send_failed || responses.close(token).is_err() {
            return Err(BfsError::StageDisconnected("traversal worker"));
        }
    }
    Ok(cache.stats())
}

/// Worker-side handle to the cache stage.
pub(crate) struct CacheClient<'t, 'brand, const LINE: usize> {
    requests: EpochSender<'brand, CacheRequest>,
    responses: EpochReceiver<'brand, LineSegment<LINE>>,
    token: &'t GhostToken<'brand>,
}

impl<'t, 'brand, const LINE: usize> CacheClient<'t, 'brand, LINE> {
    pub(crate) fn new(
        requests: EpochSender<'brand, CacheRequest>,
        responses: EpochReceiver<'brand, LineSegment<LINE>>,
        token: &'t GhostToken<'brand>,
    ) -> Self {
        Self {
            requests,
            responses,
            token,
        }
    }

    /// Streams `node`'s in-list through `visit`, aborting the remaining line
    /// fetches when `visit` breaks.
    pub(crate) fn scan<F>(&mut self, node: usize, mut visit: F) -> Result<ControlFlow<()>, BfsError>
    where
        F: FnMut(&[NodeId]) -> ControlFlow<()>,
    {
        let disconnected = || BfsError::StageDisconnected("neighbor cache");
        let id = node as NodeId;
        self.requests
            .send(CacheRequest::Lookup(id), self.token)
            .map_err(|_| disconnected())?;

        let mut flow = ControlFlow::Continue(());
        loop {
            match self.responses.recv(self.token) {
                Ok(Some(segment)) => {
                    // After an abort, segments already in flight are drained unread.
                    if flow.is_continue() {
                        flow = visit(segment.as_slice());
                        if flow.is_break() {
                            self.requests
                                .send(CacheRequest::Abort(id), self.token)
                                .map_err(|_| disconnected())?;
                        }
                    }
                }
                Ok(None) => return Ok(flow),
                Err(RecvError) => return Err(disconnected()),
            }
        }
    }
}
