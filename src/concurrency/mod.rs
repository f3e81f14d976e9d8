//! Concurrency primitives for the traversal pipeline.
//!
//! Important: the brand enforces *session* separation, not synchronization.
//! Synchronization comes from the atomics and from the bounded streams that are
//! the only channel between pipeline stages.

pub mod atomic;
pub mod scoped;
pub mod stream;

pub use atomic::{GhostAtomicBitset, GhostAtomicUsize};
pub use scoped::{with_read_scope, GhostReadScope};
pub use stream::{epoch_stream, EpochReceiver, EpochSender, RecvError, SendError, TryRecvError};
