//! Convergence detection.
//!
//! A topology has converged when every bridge sits at the fixpoint of the
//! election rule for its connected component:
//!
//! - the component's smallest id is root of itself at distance 0
//! - every other member names that root, is one hop further than its
//!   closest neighbor, and designates the smallest neighbor at that distance
//!
//! Agreement on the root alone is not enough to stop. On cyclic graphs a
//! bridge can learn the root over a long path before the short one arrives.

use serde::Serialize;
use spantree_bridge::{Route, SegmentId};
use spantree_topology::{Components, Graph, NodeId};

/// The spanning-tree fixpoint check for one graph.
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceOracle<'a> {
    graph: &'a Graph,
    components: &'a Components,
}

impl<'a> ConvergenceOracle<'a> {
    pub fn new(graph: &'a Graph, components: &'a Components) -> Self {
        Self { graph, components }
    }

    /// Every bridge names the same root as the smallest bridge of its
    /// component.
    pub fn roots_agree(&self, routes: &[Route]) -> bool {
        self.graph.nodes().all(|v| self.agrees(routes, v))
    }

    /// Every bridge holds exactly the route the fixpoint equations give it.
    pub fn is_settled(&self, routes: &[Route]) -> bool {
        self.graph.nodes().all(|v| self.settled(routes, v))
    }

    /// Roots agree and every bridge is settled.
    pub fn is_converged(&self, routes: &[Route]) -> bool {
        routes.len() == self.graph.vertex_count()
            && self.roots_agree(routes)
            && self.is_settled(routes)
    }

    /// Which bridges are off the fixpoint, and how.
    pub fn assess(&self, routes: &[Route]) -> ConvergenceState {
        let mut state = ConvergenceState::default();
        for v in self.graph.nodes() {
            if !self.agrees(routes, v) {
                state.disagreeing.push(v);
            }
            if !self.settled(routes, v) {
                state.unsettled.push(v);
            }
        }
        state
    }

    /// The route `v` must hold at the fixpoint, given its neighbors' routes.
    pub fn expected(&self, routes: &[Route], v: NodeId) -> Route {
        let representative = self.components.representative(v);
        if v == representative {
            return Route::own(v);
        }
        self.graph
            .neighbors(v)
            .iter()
            .filter_map(|&u| routes.get(u.index()).map(|r| (r.distance, u)))
            .min()
            .map_or(Route::own(v), |(distance, u)| Route {
                root: representative,
                distance: distance.saturating_add(1),
                designated: u,
            })
    }

    fn agrees(&self, routes: &[Route], v: NodeId) -> bool {
        let representative = self.components.representative(v);
        match (routes.get(v.index()), routes.get(representative.index())) {
            (Some(own), Some(reference)) => own.root == reference.root,
            _ => false,
        }
    }

    fn settled(&self, routes: &[Route], v: NodeId) -> bool {
        routes.get(v.index()) == Some(&self.expected(routes, v))
    }
}

/// The bridges (and segments) that keep a topology from having converged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConvergenceState {
    /// Bridges naming a different root than their component's smallest id
    pub disagreeing: Vec<NodeId>,
    /// Bridges whose route differs from the fixpoint
    pub unsettled: Vec<NodeId>,
    /// Segments still advertising a stale best route
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unsettled_segments: Vec<SegmentId>,
}

impl ConvergenceState {
    pub fn is_converged(&self) -> bool {
        self.disagreeing.is_empty() && self.unsettled.is_empty() && self.unsettled_segments.is_empty()
    }

    /// Number of entities off the fixpoint.
    pub fn total_tension(&self) -> usize {
        self.disagreeing.len() + self.unsettled.len() + self.unsettled_segments.len()
    }
}

/// Every root equals the first one. Vacuously true for no bridges.
///
/// Only meaningful on a connected topology; see
/// [`ConvergenceOracle::roots_agree`] for the per-component form.
pub fn roots_agree_globally(roots: &[NodeId]) -> bool {
    roots.first().map_or(true, |first| roots.iter().all(|r| r == first))
}
