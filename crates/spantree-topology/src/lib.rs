//! Spantree Topology
//!
//! Fixed bridge topologies for the spanning-tree election.
//!
//! # Model
//!
//! Bridges are identified by dense integer ids `0..N`, so every per-node
//! table in the workspace is a plain array indexed by [`NodeId`]. Links are
//! undirected and stored as an adjacency arena: no pointers, no cycles to
//! break. Cycles in the graph are resolved by the election itself.
//!
//! # Inputs
//!
//! - [`Graph`]: built edge by edge, or parsed from an edge list
//!   ([`edgelist`]): `V`, `E`, then `E` pairs of vertex ids.
//! - [`SegmentLayout`]: bridges attached to shared broadcast segments (LANs)
//!   instead of point-to-point links.
//! - [`generate`]: reproducible shapes for tests and benchmarks.

mod error;
mod graph;
mod id;
mod segment;

pub mod edgelist;
pub mod generate;

pub use error::{Result, TopologyError};
pub use graph::{Components, Graph};
pub use id::NodeId;
pub use segment::SegmentLayout;

/// Largest vertex count accepted by [`Graph::new`] and the edge-list parser.
///
/// Ids are `u32`; the top value is kept free so `N` itself fits.
pub const MAX_VERTICES: usize = u32::MAX as usize;
