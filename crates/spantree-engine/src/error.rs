//! Error types for spantree-engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that prevent a run from starting or finishing cleanly.
///
/// Not converging is not one of them: see [`crate::RunOutcome`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The topology could not be built
    #[error("topology error: {0}")]
    Topology(#[from] spantree_topology::TopologyError),

    /// A bridge could not be wired
    #[error("bridge error: {0}")]
    Bridge(#[from] spantree_bridge::BridgeError),

    /// The async runtime could not be started
    #[error("runtime error: {0}")]
    Runtime(#[source] std::io::Error),

    /// Configuration rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be decoded
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
