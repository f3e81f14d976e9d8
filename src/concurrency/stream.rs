//! Bounded, branded epoch streams.
//!
//! An epoch stream is a single-producer/single-consumer FIFO with a fixed
//! capacity and explicit *end-of-transaction* markers. A producer ends a batch
//! (one BFS epoch, one neighbor list) with [`EpochSender::close`]; the consumer
//! sees `Ok(None)` for the marker and keeps receiving to start the next batch.
//!
//! Disconnection is the only shutdown signal: once the sender is dropped and the
//! queue drains, `recv` reports [`RecvError`]. Every operation takes a token
//! borrow proving the caller belongs to the same traversal session.

use crate::token::{GhostBorrow, InvariantBrand};
use crossbeam_utils::CachePadded;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Error returned when sending to a stream whose receiver has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError<T>(pub T);

/// Error returned when the sender has been dropped and the stream is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecvError;

/// Error returned by [`EpochReceiver::try_recv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// The stream is empty.
    Empty,
    /// The sender has been dropped and the stream is drained.
    Disconnected,
}

impl<T> core::fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("sending on a stream whose receiver is gone")
    }
}

impl<T: core::fmt::Debug> std::error::Error for SendError<T> {}

impl core::fmt::Display for RecvError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("receiving on a disconnected stream")
    }
}

impl std::error::Error for RecvError {}

enum Slot<T> {
    Item(T),
    EndOfTransaction,
}

struct StreamState<T> {
    queue: VecDeque<Slot<T>>,
    capacity: usize,
    sender_alive: bool,
    receiver_alive: bool,
}

struct StreamShared<T> {
    state: CachePadded<Mutex<StreamState<T>>>,
    readable: Condvar,
    writable: Condvar,
}

impl<T> StreamShared<T> {
    fn lock(&self) -> MutexGuard<'_, StreamState<T>> {
        // The protected state stays consistent across a panicking peer; recover it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The producing half of an epoch stream.
pub struct EpochSender<'brand, T> {
    shared: Arc<StreamShared<T>>,
    _brand: InvariantBrand<'brand>,
}

/// The consuming half of an epoch stream.
pub struct EpochReceiver<'brand, T> {
    shared: Arc<StreamShared<T>>,
    _brand: InvariantBrand<'brand>,
}

/// Creates a bounded epoch stream holding at most `capacity` slots.
///
/// End-of-transaction markers occupy a slot like any value.
///
/// # Panics
/// Panics if `capacity == 0`.
pub fn epoch_stream<'brand, T>(capacity: usize) -> (EpochSender<'brand, T>, EpochReceiver<'brand, T>) {
    assert!(capacity != 0, "stream capacity must be > 0");
    let shared = Arc::new(StreamShared {
        state: CachePadded::new(Mutex::new(StreamState {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            sender_alive: true,
            receiver_alive: true,
        })),
        readable: Condvar::new(),
        writable: Condvar::new(),
    });

    (
        EpochSender {
            shared: shared.clone(),
            _brand: core::marker::PhantomData,
        },
        EpochReceiver {
            shared,
            _brand: core::marker::PhantomData,
        },
    )
}

impl<'brand, T> EpochSender<'brand, T> {
    /// Sends a value, blocking while the stream is full.
    pub fn send(&self, value: T, _token: &impl GhostBorrow<'brand>) -> Result<(), SendError<T>> {
        self.push(Slot::Item(value)).map_err(|slot| match slot {
            Slot::Item(v) => SendError(v),
            Slot::EndOfTransaction => unreachable!("pushed an item"),
        })
    }

    /// Ends the current transaction, blocking while the stream is full.
    pub fn close(&self, _token: &impl GhostBorrow<'brand>) -> Result<(), SendError<()>> {
        self.push(Slot::EndOfTransaction).map_err(|_| SendError(()))
    }

    fn push(&self, slot: Slot<T>) -> Result<(), Slot<T>> {
        let mut state = self.shared.lock();
        while state.receiver_alive && state.queue.len() >= state.capacity {
            state = self
                .shared
                .writable
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if !state.receiver_alive {
            return Err(slot);
        }
        state.queue.push_back(slot);
        self.shared.readable.notify_one();
        Ok(())
    }
}

impl<'brand, T> EpochReceiver<'brand, T> {
    /// Receives the next slot, blocking while the stream is empty.
    ///
    /// Returns `Ok(Some(value))` for data, `Ok(None)` at an end-of-transaction
    /// marker, and `Err(RecvError)` once the sender is gone and the queue drained.
    pub fn recv(&self, _token: &impl GhostBorrow<'brand>) -> Result<Option<T>, RecvError> {
        let mut state = self.shared.lock();
        loop {
            if let Some(slot) = state.queue.pop_front() {
                self.shared.writable.notify_one();
                return Ok(slot.into_option());
            }
            if !state.sender_alive {
                return Err(RecvError);
            }
            state = self
                .shared
                .readable
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Receives the next slot without blocking.
    pub fn try_recv(&self, _token: &impl GhostBorrow<'brand>) -> Result<Option<T>, TryRecvError> {
        let mut state = self.shared.lock();
        if let Some(slot) = state.queue.pop_front() {
            self.shared.writable.notify_one();
            Ok(slot.into_option())
        } else if !state.sender_alive {
            Err(TryRecvError::Disconnected)
        } else {
            Err(TryRecvError::Empty)
        }
    }

    /// Receives values until the next end-of-transaction marker, returning the
    /// last one seen (if any).
    ///
    /// Used for control streams where only the final value of a batch matters.
    pub fn recv_last(&self, token: &impl GhostBorrow<'brand>) -> Result<Option<T>, RecvError> {
        let mut last = None;
        while let Some(v) = self.recv(token)? {
            last = Some(v);
        }
        Ok(last)
    }
}

impl<T> Slot<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Slot::Item(v) => Some(v),
            Slot::EndOfTransaction => None,
        }
    }
}

impl<T> Drop for EpochSender<'_, T> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.sender_alive = false;
        self.shared.readable.notify_all();
    }
}

impl<T> Drop for EpochReceiver<'_, T> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.receiver_alive = false;
        state.queue.clear();
        self.shared.writable.notify_all();
    }
}
