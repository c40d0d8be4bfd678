//! The converged spanning tree.

use serde::{Deserialize, Serialize};
use spantree_bridge::Route;
use spantree_topology::NodeId;
use thiserror::Error;

use crate::ConvergenceState;

/// One bridge's final place in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub node: NodeId,
    pub root: NodeId,
    pub distance: u32,
    /// Parent toward the root; the node itself for a root
    pub designated: NodeId,
}

impl TreeEntry {
    /// True for the root of a component.
    pub fn is_root(&self) -> bool {
        self.node == self.root
    }
}

/// Per-bridge `(root, distance, designated)` of a converged run, indexed by
/// node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalTree {
    entries: Vec<TreeEntry>,
}

impl FinalTree {
    /// Build from routes indexed by node id.
    pub(crate) fn from_routes(routes: &[Route]) -> Self {
        let entries = routes
            .iter()
            .enumerate()
            .map(|(i, route)| TreeEntry {
                node: NodeId(i as u32),
                root: route.root,
                distance: route.distance,
                designated: route.designated,
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, node: NodeId) -> Option<&TreeEntry> {
        self.entries.get(node.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct roots, one per connected component, in increasing order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|e| e.is_root())
            .map(|e| e.node)
            .collect()
    }

    /// `(child, parent)` for every non-root bridge.
    pub fn parent_edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.entries
            .iter()
            .filter(|e| !e.is_root())
            .map(|e| (e.node, e.designated))
    }

    /// Largest distance to a root.
    pub fn depth(&self) -> u32 {
        self.entries.iter().map(|e| e.distance).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a FinalTree {
    type Item = &'a TreeEntry;
    type IntoIter = std::slice::Iter<'a, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Asked for the tree before the bridges reached the fixpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("not converged: {disagreeing} bridges disagree on the root, {unsettled} not yet settled")]
pub struct NotConverged {
    pub disagreeing: usize,
    pub unsettled: usize,
}

impl From<&ConvergenceState> for NotConverged {
    fn from(state: &ConvergenceState) -> Self {
        Self {
            disagreeing: state.disagreeing.len(),
            unsettled: state.unsettled.len() + state.unsettled_segments.len(),
        }
    }
}
