//! Spanning-Tree Convergence Engines
//!
//! Drives a fixed [`Topology`] of bridges to the fixpoint of the local
//! election rule: one root per connected component (its smallest id), and
//! for every bridge a shortest hop count to that root plus the smallest
//! neighbor id that achieves it.
//!
//! # Engines
//!
//! - [`SequentialEngine`]: synchronous rounds, every bridge updates then
//!   relays in index order. Fully deterministic.
//! - [`ConcurrentEngine`]: one tokio task per bridge racing on its own
//!   mailbox, plus a monitor that stops everyone once the oracle agrees.
//! - [`SegmentEngine`] (feature `lan`): bridges attached to shared
//!   broadcast segments instead of direct links.
//!
//! Every run is bounded: a round budget for the sequential engines, a
//! wall-clock budget for the concurrent one. Running out is reported as
//! [`RunOutcome::NotConverged`], not as an error.
//!
//! # Example
//!
//! ```
//! use spantree_engine::{Engine, SequentialEngine, Topology};
//! use spantree_bridge::FloodPolicy;
//!
//! let mut topology = Topology::from_edges(3, [(0, 1), (1, 2), (0, 2)], FloodPolicy::Full).unwrap();
//! let report = SequentialEngine::default().run(&mut topology).unwrap();
//!
//! let tree = report.tree().unwrap();
//! assert!(tree.iter().all(|entry| entry.root.value() == 0));
//! ```

mod board;
mod concurrent;
mod config;
mod engine;
mod error;
mod oracle;
mod report;
mod rounds;
mod sequential;
mod topology;
mod tree;

#[cfg(feature = "lan")]
pub mod lan;

pub use concurrent::ConcurrentEngine;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use oracle::{roots_agree_globally, ConvergenceOracle, ConvergenceState};
pub use report::{RouteChange, RunOutcome, RunReport, StopReason, WorkerFailure};
pub use sequential::SequentialEngine;
pub use topology::{RoundSummary, Topology};
pub use tree::{FinalTree, NotConverged, TreeEntry};

#[cfg(feature = "lan")]
pub use lan::{SegmentEngine, SegmentEntry, SegmentTopology};

#[cfg(test)]
mod tests {
    use super::*;
    use spantree_bridge::FloodPolicy;
    use spantree_topology::generate;

    #[test]
    fn engines_agree_on_a_grid() {
        let graph = generate::grid(4, 3);
        let mut a = Topology::new(graph.clone(), FloodPolicy::Full).unwrap();
        let mut b = Topology::new(graph, FloodPolicy::Full).unwrap();

        let seq = SequentialEngine::default().run(&mut a).unwrap();
        let conc = ConcurrentEngine::new(EngineConfig::default().with_worker_threads(2))
            .run(&mut b)
            .unwrap();

        assert_eq!(seq.tree(), conc.tree());
        assert!(seq.is_converged());
    }
}
