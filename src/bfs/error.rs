/// Errors raised by the traversal engine.
///
/// None of these are transient: a run that fails is a precondition violation or
/// a logic error, and retrying it yields the same result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BfsError {
    /// The graph has more nodes than the configured frontier capacity.
    TooManyNodes {
        /// Nodes in the graph.
        nodes: usize,
        /// Configured `max_nodes`.
        capacity: usize,
    },
    /// The start node is not a node of the graph.
    StartOutOfRange {
        /// Requested start node.
        start: usize,
        /// Nodes in the graph.
        nodes: usize,
    },
    /// Forward and reverse views disagree in node or edge count.
    ShapeMismatch {
        /// `(nodes, edges)` of the forward view.
        forward: (usize, usize),
        /// `(nodes, edges)` of the reverse view.
        reverse: (usize, usize),
    },
    /// The epoch bound was reached before an epoch updated zero nodes.
    EpochLimitExceeded {
        /// The configured bound.
        max_epochs: usize,
    },
    /// A pipeline stage hung up while its peer still expected traffic.
    StageDisconnected(&'static str),
    /// A pipeline stage panicked.
    StagePanicked(&'static str),
    /// A configuration value is unusable.
    InvalidConfig(String),
}

impl core::fmt::Display for BfsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TooManyNodes { nodes, capacity } => {
                write!(f, "graph has {nodes} nodes but capacity is {capacity}")
            }
            Self::StartOutOfRange { start, nodes } => {
                write!(f, "start node {start} out of range for {nodes} nodes")
            }
            Self::ShapeMismatch { forward, reverse } => write!(
                f,
                "forward view has {} nodes/{} edges but reverse has {} nodes/{} edges",
                forward.0, forward.1, reverse.0, reverse.1
            ),
            Self::EpochLimitExceeded { max_epochs } => {
                write!(f, "traversal did not converge within {max_epochs} epochs")
            }
            Self::StageDisconnected(stage) => write!(f, "{stage} stage disconnected"),
            Self::StagePanicked(stage) => write!(f, "{stage} stage panicked"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for BfsError {}
