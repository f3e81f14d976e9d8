//! Graph storage consumed by the traversal engine.
//!
//! - `compressed`: offset/neighbor arrays and the borrowed views the core reads
//! - `builder`: forward + reverse adjacency from an edge list, with renumbering
//! - `loader`: edge-list text parsing

pub mod builder;
pub mod compressed;
pub mod loader;
mod error;

pub use builder::{DirectedGraph, NodeRenumbering};
pub use compressed::{CompressedAdjacency, CompressedView};
pub use error::GraphError;
pub use loader::{load_edge_list, parse_edge_list, read_edge_list};

/// Dense node identifier.
pub type NodeId = u32;

/// Offset into a neighbor array.
pub type Offset = u32;
