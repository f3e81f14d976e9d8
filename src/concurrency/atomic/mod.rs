//! Branded, lock-free atomic primitives.
//!
//! The brand is purely compile-time; the wrappers compile down to the plain
//! hardware atomics.

/// Branded `AtomicUsize`.
pub mod usize;
/// Branded atomic bitsets.
pub mod bitset;

pub use bitset::GhostAtomicBitset;
pub use usize::GhostAtomicUsize;
