//! Error types for spantree-bridge.

use thiserror::Error;

use crate::NodeId;

/// Result type for bridge construction.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while wiring a bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A neighbor id with no mailbox, or the bridge's own id.
    #[error("invalid topology: bridge {node} cannot link to {neighbor}")]
    InvalidTopology { node: NodeId, neighbor: NodeId },
}
