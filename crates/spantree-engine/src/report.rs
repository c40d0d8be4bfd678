//! What a run produced.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};
use spantree_bridge::Route;
use spantree_topology::NodeId;

use crate::{ConvergenceState, FinalTree};

/// Why a run stopped short of the fixpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Used up `max_rounds`
    RoundBudget,
    /// A full round changed nothing; no later round can either
    Stalled,
    /// Used up `max_duration`
    Deadline,
    /// Every worker is gone and the survivors never got there
    WorkerFailure,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::RoundBudget => "round budget exhausted",
            StopReason::Stalled => "stalled",
            StopReason::Deadline => "deadline reached",
            StopReason::WorkerFailure => "workers failed",
        })
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum RunOutcome {
    Converged(FinalTree),
    NotConverged {
        reason: StopReason,
        state: ConvergenceState,
    },
}

/// A worker that did not come back cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum WorkerFailure {
    Panicked { node: NodeId, message: String },
    Unresponsive { node: NodeId },
}

impl WorkerFailure {
    pub fn node(&self) -> NodeId {
        match self {
            WorkerFailure::Panicked { node, .. } | WorkerFailure::Unresponsive { node } => *node,
        }
    }
}

impl fmt::Display for WorkerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerFailure::Panicked { node, message } => write!(f, "bridge {node} panicked: {message}"),
            WorkerFailure::Unresponsive { node } => write!(f, "bridge {node} did not stop"),
        }
    }
}

/// One route change seen during a sequential run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteChange {
    pub round: u64,
    pub node: NodeId,
    pub from: Route,
    pub to: Route,
}

/// Result of one engine run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Engine name
    pub engine: &'static str,
    pub outcome: RunOutcome,
    /// Rounds executed (0 for the concurrent engine)
    pub rounds: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    /// Advertisements delivered to a mailbox
    pub messages: u64,
    /// Route changes in order, when recorded
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<RouteChange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<WorkerFailure>,
}

impl RunReport {
    pub fn is_converged(&self) -> bool {
        matches!(self.outcome, RunOutcome::Converged(_))
    }

    /// The tree, if the run converged.
    pub fn tree(&self) -> Option<&FinalTree> {
        match &self.outcome {
            RunOutcome::Converged(tree) => Some(tree),
            RunOutcome::NotConverged { .. } => None,
        }
    }

    pub fn into_tree(self) -> Option<FinalTree> {
        match self.outcome {
            RunOutcome::Converged(tree) => Some(tree),
            RunOutcome::NotConverged { .. } => None,
        }
    }

    /// Why the run stopped early, if it did.
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.outcome {
            RunOutcome::Converged(_) => None,
            RunOutcome::NotConverged { reason, .. } => Some(reason),
        }
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_micros() as f64 / 1000.0)
}
