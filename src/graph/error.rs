use super::{NodeId, Offset};

/// Errors raised while building or loading a graph.
#[derive(Debug)]
pub enum GraphError {
    /// The offset array is not of length `n + 1` or does not start at zero.
    IndexLength {
        /// Length of the offending offset array.
        len: usize,
    },
    /// `index[node] > index[node + 1]`.
    NonMonotoneIndex {
        /// First node whose range is inverted.
        node: usize,
    },
    /// `index[n]` disagrees with the neighbor array length.
    EdgeCountMismatch {
        /// Final offset.
        last_offset: Offset,
        /// Neighbor array length.
        edges: usize,
    },
    /// A neighbor id is `>= n`.
    NeighborOutOfRange {
        /// The offending neighbor id.
        neighbor: NodeId,
        /// Node count.
        nodes: usize,
    },
    /// Node or edge count does not fit the id/offset types.
    TooManyNodes {
        /// Requested count.
        count: usize,
    },
    /// A line of an edge list could not be parsed.
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },
    /// Reading the edge list failed.
    Io(std::io::Error),
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IndexLength { len } => {
                write!(f, "offset array of length {len} must be non-empty and start at 0")
            }
            Self::NonMonotoneIndex { node } => write!(f, "offsets decrease at node {node}"),
            Self::EdgeCountMismatch { last_offset, edges } => write!(
                f,
                "final offset {last_offset} does not match neighbor array length {edges}"
            ),
            Self::NeighborOutOfRange { neighbor, nodes } => {
                write!(f, "neighbor {neighbor} out of range for {nodes} nodes")
            }
            Self::TooManyNodes { count } => write!(f, "{count} exceeds the 32-bit id space"),
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
            Self::Io(e) => write!(f, "failed to read edge list: {e}"),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GraphError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
