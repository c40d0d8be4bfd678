//! A wired network of point-to-point bridges.

use spantree_bridge::{mailbox, BridgeNode, FloodPolicy, Inbox, NeighborLink, Outbox, Peer, Route};
use spantree_topology::{Components, Graph, NodeId};
use tracing::debug;

use crate::{ConvergenceOracle, ConvergenceState, FinalTree, NotConverged, Result, RouteChange};

/// What one sequential round did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Entities whose state changed
    pub changed: usize,
    /// Advertisements delivered
    pub sent: usize,
}

/// Bridges wired along the edges of a [`Graph`], each with its own mailbox.
///
/// The shape is fixed while an engine runs; edges can only be added in
/// between runs.
#[derive(Debug)]
pub struct Topology {
    graph: Graph,
    components: Components,
    policy: FloodPolicy,
    nodes: Vec<BridgeNode>,
    inboxes: Vec<Inbox>,
    outboxes: Vec<Outbox>,
}

impl Topology {
    /// Wire one bridge per vertex of `graph`.
    pub fn new(graph: Graph, policy: FloodPolicy) -> Result<Self> {
        let (outboxes, inboxes): (Vec<_>, Vec<_>) = graph.nodes().map(|_| mailbox()).unzip();
        let nodes = graph
            .nodes()
            .map(|id| BridgeNode::wire(id, graph.neighbors(id), &outboxes, policy))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let components = graph.components();

        debug!(
            bridges = graph.vertex_count(),
            links = graph.edge_count(),
            components = components.count(),
            %policy,
            "topology wired"
        );
        Ok(Self {
            graph,
            components,
            policy,
            nodes,
            inboxes,
            outboxes,
        })
    }

    /// Build from a vertex count and raw edge pairs.
    pub fn from_edges<I>(vertex_count: usize, edges: I, policy: FloodPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        Self::new(Graph::from_edges(vertex_count, edges)?, policy)
    }

    /// Link `u` and `v`. Returns `false` if they already were.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> Result<bool> {
        if !self.graph.add_edge(u, v)? {
            return Ok(false);
        }
        self.nodes[u.index()].attach(NeighborLink::new(Peer::Bridge(v), self.outboxes[v.index()].clone()));
        self.nodes[v.index()].attach(NeighborLink::new(Peer::Bridge(u), self.outboxes[u.index()].clone()));
        self.components = self.graph.components();
        Ok(true)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn policy(&self) -> FloodPolicy {
        self.policy
    }

    /// Number of bridges.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[BridgeNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&BridgeNode> {
        self.nodes.get(id.index())
    }

    /// Current route of every bridge, by id.
    pub fn routes(&self) -> Vec<Route> {
        self.nodes.iter().map(BridgeNode::route).collect()
    }

    /// Put every bridge back in its initial state and empty every mailbox.
    pub fn restart(&mut self) {
        for (node, inbox) in self.nodes.iter_mut().zip(&mut self.inboxes) {
            node.restart(inbox);
        }
    }

    /// One synchronous round: every bridge, in id order, applies its queued
    /// messages and then relays.
    ///
    /// Route changes are appended to `trace` when given.
    pub fn round(&mut self, round: u64, mut trace: Option<&mut Vec<RouteChange>>) -> RoundSummary {
        let mut summary = RoundSummary::default();
        for (node, inbox) in self.nodes.iter_mut().zip(&mut self.inboxes) {
            let before = node.route();
            if node.update(inbox) {
                summary.changed += 1;
                if let Some(trace) = trace.as_mut() {
                    trace.push(RouteChange {
                        round,
                        node: node.id(),
                        from: before,
                        to: node.route(),
                    });
                }
            }
            summary.sent += node.relay();
        }
        summary
    }

    pub fn oracle(&self) -> ConvergenceOracle<'_> {
        ConvergenceOracle::new(&self.graph, &self.components)
    }

    pub fn is_converged(&self) -> bool {
        self.oracle().is_converged(&self.routes())
    }

    pub fn assess(&self) -> ConvergenceState {
        self.oracle().assess(&self.routes())
    }

    /// The tree, if every bridge has reached the fixpoint.
    pub fn final_tree(&self) -> std::result::Result<FinalTree, NotConverged> {
        let routes = self.routes();
        let state = self.oracle().assess(&routes);
        if state.is_converged() {
            Ok(FinalTree::from_routes(&routes))
        } else {
            Err(NotConverged::from(&state))
        }
    }

    /// Advertisements delivered since the last restart.
    pub fn messages_sent(&self) -> u64 {
        self.nodes.iter().map(|n| n.stats().sent).sum()
    }

    /// Hand every bridge and its inbox to a worker. The topology is empty
    /// until [`Topology::return_workers`].
    pub(crate) fn take_workers(&mut self) -> Vec<(BridgeNode, Inbox)> {
        let nodes = std::mem::take(&mut self.nodes);
        let inboxes = std::mem::take(&mut self.inboxes);
        nodes.into_iter().zip(inboxes).collect()
    }

    /// Take the workers back. Bridges that never came back are rebuilt from
    /// their last published route with a fresh mailbox, and their
    /// neighbors are pointed at it.
    pub(crate) fn return_workers(
        &mut self,
        returned: Vec<(BridgeNode, Inbox)>,
        published: &[Route],
    ) -> Result<()> {
        let mut slots: Vec<Option<(BridgeNode, Inbox)>> = self.graph.nodes().map(|_| None).collect();
        for (node, inbox) in returned {
            let index = node.id().index();
            slots[index] = Some((node, inbox));
        }

        let mut rebuilt = Vec::new();
        for (index, slot) in slots.iter_mut().enumerate() {
            if slot.is_some() {
                continue;
            }
            let id = NodeId(index as u32);
            let (outbox, inbox) = mailbox();
            self.outboxes[index] = outbox;
            let mut node = BridgeNode::wire(id, self.graph.neighbors(id), &self.outboxes, self.policy)?;
            if let Some(&route) = published.get(index) {
                node.restore_route(route);
            }
            debug!(bridge = %id, route = %node.route(), "bridge rebuilt");
            *slot = Some((node, inbox));
            rebuilt.push(id);
        }

        for &id in &rebuilt {
            let outbox = &self.outboxes[id.index()];
            for &neighbor in self.graph.neighbors(id) {
                if let Some((node, _)) = slots[neighbor.index()].as_mut() {
                    node.relink(Peer::Bridge(id), outbox);
                }
            }
        }

        let (nodes, inboxes): (Vec<_>, Vec<_>) = slots.into_iter().flatten().unzip();
        self.nodes = nodes;
        self.inboxes = inboxes;
        Ok(())
    }
}
