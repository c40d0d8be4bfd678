//! Error types for spantree-topology.

use thiserror::Error;

use crate::NodeId;

/// Result type for topology construction.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors raised while building or loading a topology.
///
/// All of them are fatal: no partially built topology is ever handed out.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// A vertex id outside `0..vertex_count`.
    #[error("invalid vertex {vertex}: topology has {vertex_count} vertices")]
    InvalidVertex { vertex: u64, vertex_count: usize },

    /// An edge from a vertex to itself.
    #[error("self-loop on vertex {0}")]
    SelfLoop(NodeId),

    /// A LAN segment with no attached bridge.
    #[error("segment {0} has no attached bridges")]
    EmptySegment(usize),

    /// More vertices than ids can address.
    #[error("vertex count {0} exceeds the id space")]
    TooManyVertices(usize),

    /// Malformed edge-list input.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The edge list declared a different number of edges than it contains.
    #[error("edge list declares {declared} edges but contains {found}")]
    EdgeCountMismatch { declared: usize, found: usize },

    /// IO error while reading an edge list.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
