//! Bridges attached to shared broadcast segments.
//!
//! Instead of point-to-point links, every bridge has one port per segment it
//! sits on. A segment collects the advertisements of its bridges, keeps the
//! best one (smallest root, then distance, then sender) and repeats it to
//! every other attached bridge. The bridges themselves run the unchanged
//! election rule, so crossing a segment counts as one hop and a bridge's
//! designated neighbor is the bridge that spoke best on the segment.
//!
//! Each segment ends up with a designated bridge of its own: the sender of
//! its best advertisement, which is the attached bridge closest to the root.

use serde::Serialize;
use spantree_bridge::{
    mailbox, BridgeNode, ConfigMessage, FloodPolicy, Inbox, NeighborLink, Outbox, Peer, Route, SegmentId,
};
use spantree_topology::{Components, Graph, NodeId, SegmentLayout};
use tracing::{debug, trace};

use crate::rounds::{run_rounds, Rounds};
use crate::{
    ConvergenceOracle, ConvergenceState, Engine, EngineConfig, FinalTree, NotConverged, Result, RoundSummary,
    RouteChange, RunReport,
};

/// A segment's place in the converged tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentEntry {
    pub segment: SegmentId,
    pub root: NodeId,
    /// One more than the designated bridge's distance
    pub distance: u32,
    /// The attached bridge closest to the root
    pub designated: NodeId,
}

/// A segment's end of one bridge attachment.
#[derive(Debug)]
struct Port {
    bridge: NodeId,
    from_bridge: Inbox,
    to_bridge: Outbox,
}

#[derive(Debug)]
struct Segment {
    id: SegmentId,
    ports: Vec<Port>,
    best: Option<ConfigMessage>,
}

impl Segment {
    /// Drain every port; if the best advertisement improved, repeat it to
    /// every bridge except its sender.
    ///
    /// Returns whether the best changed and how many copies were delivered.
    fn step(&mut self) -> (bool, usize) {
        let mut improved = false;
        for port in &mut self.ports {
            for msg in port.from_bridge.drain() {
                if self.best.map_or(true, |best| msg.rank() < best.rank()) {
                    self.best = Some(msg);
                    improved = true;
                }
            }
        }

        let Some(best) = self.best.filter(|_| improved) else {
            return (false, 0);
        };
        trace!(segment = %self.id, root = %best.root, via = %best.sender, "segment best improved");
        let sent = self
            .ports
            .iter()
            .filter(|port| port.bridge != best.sender)
            .filter(|port| port.to_bridge.post(best))
            .count();
        (true, sent)
    }

    fn reset(&mut self) {
        self.best = None;
        for port in &mut self.ports {
            port.from_bridge.clear();
        }
    }

    fn entry(&self) -> Option<SegmentEntry> {
        self.best.map(|best| SegmentEntry {
            segment: self.id,
            root: best.root,
            distance: best.distance.saturating_add(1),
            designated: best.sender,
        })
    }
}

/// Bridges and the segments joining them.
#[derive(Debug)]
pub struct SegmentTopology {
    layout: SegmentLayout,
    graph: Graph,
    components: Components,
    bridges: Vec<BridgeNode>,
    /// Per bridge, one inbox for each segment it is attached to
    ports: Vec<Vec<Inbox>>,
    segments: Vec<Segment>,
    forwarded: u64,
}

impl SegmentTopology {
    pub fn new(layout: SegmentLayout, policy: FloodPolicy) -> Self {
        let mut bridges: Vec<_> = (0..layout.bridge_count())
            .map(|i| BridgeNode::new(NodeId(i as u32), policy))
            .collect();
        let mut ports: Vec<Vec<Inbox>> = bridges.iter().map(|_| Vec::new()).collect();
        let mut segments = Vec::with_capacity(layout.segment_count());

        for index in 0..layout.segment_count() {
            let id = SegmentId(index as u32);
            let mut segment = Segment {
                id,
                ports: Vec::new(),
                best: None,
            };
            for &bridge in layout.bridges_on(index) {
                let (up_tx, up_rx) = mailbox();
                let (down_tx, down_rx) = mailbox();
                bridges[bridge.index()].attach(NeighborLink::new(Peer::Segment(id), up_tx));
                ports[bridge.index()].push(down_rx);
                segment.ports.push(Port {
                    bridge,
                    from_bridge: up_rx,
                    to_bridge: down_tx,
                });
            }
            segments.push(segment);
        }

        let graph = layout.bridge_graph();
        let components = graph.components();
        debug!(
            bridges = bridges.len(),
            segments = segments.len(),
            components = components.count(),
            %policy,
            "segment topology wired"
        );
        Self {
            layout,
            graph,
            components,
            bridges,
            ports,
            segments,
            forwarded: 0,
        }
    }

    pub fn layout(&self) -> &SegmentLayout {
        &self.layout
    }

    /// Bridges sharing a segment are neighbors in this graph.
    pub fn bridge_graph(&self) -> &Graph {
        &self.graph
    }

    pub fn bridges(&self) -> &[BridgeNode] {
        &self.bridges
    }

    pub fn routes(&self) -> Vec<Route> {
        self.bridges.iter().map(BridgeNode::route).collect()
    }

    pub fn restart(&mut self) {
        for (bridge, ports) in self.bridges.iter_mut().zip(&mut self.ports) {
            for inbox in ports.iter_mut() {
                inbox.clear();
            }
            bridge.reset();
        }
        for segment in &mut self.segments {
            segment.reset();
        }
        self.forwarded = 0;
    }

    /// Every bridge applies what its segments delivered and relays, then
    /// every segment forwards its best.
    pub fn round(&mut self, round: u64, mut trace: Option<&mut Vec<RouteChange>>) -> RoundSummary {
        let mut summary = RoundSummary::default();
        for (bridge, ports) in self.bridges.iter_mut().zip(&mut self.ports) {
            let before = bridge.route();
            let mut changed = false;
            for inbox in ports.iter_mut() {
                changed |= bridge.update(inbox);
            }
            if changed {
                summary.changed += 1;
                if let Some(trace) = trace.as_mut() {
                    trace.push(RouteChange {
                        round,
                        node: bridge.id(),
                        from: before,
                        to: bridge.route(),
                    });
                }
            }
            summary.sent += bridge.relay();
        }

        for segment in &mut self.segments {
            let (changed, sent) = segment.step();
            summary.changed += usize::from(changed);
            summary.sent += sent;
            self.forwarded += sent as u64;
        }
        summary
    }

    pub fn oracle(&self) -> ConvergenceOracle<'_> {
        ConvergenceOracle::new(&self.graph, &self.components)
    }

    /// Bridges off the fixpoint, plus segments whose best is not the best
    /// of their bridges' current advertisements.
    pub fn assess(&self) -> ConvergenceState {
        let mut state = self.oracle().assess(&self.routes());
        state.unsettled_segments = self
            .segments
            .iter()
            .filter(|segment| !self.segment_settled(segment))
            .map(|segment| segment.id)
            .collect();
        state
    }

    pub fn is_converged(&self) -> bool {
        self.oracle().is_converged(&self.routes()) && self.segments.iter().all(|s| self.segment_settled(s))
    }

    pub fn final_tree(&self) -> std::result::Result<FinalTree, NotConverged> {
        let state = self.assess();
        if state.is_converged() {
            Ok(FinalTree::from_routes(&self.routes()))
        } else {
            Err(NotConverged::from(&state))
        }
    }

    /// Each segment's root, distance and designated bridge, for segments
    /// that have heard from at least one bridge.
    pub fn segments(&self) -> Vec<SegmentEntry> {
        self.segments.iter().filter_map(Segment::entry).collect()
    }

    /// Advertisements delivered by bridges and segments since the last
    /// restart.
    pub fn messages_sent(&self) -> u64 {
        self.bridges.iter().map(|b| b.stats().sent).sum::<u64>() + self.forwarded
    }

    fn segment_settled(&self, segment: &Segment) -> bool {
        let expected = segment
            .ports
            .iter()
            .map(|port| self.bridges[port.bridge.index()].advertisement())
            .min_by_key(ConfigMessage::rank);
        segment.best == expected
    }
}

impl Rounds for SegmentTopology {
    fn restart(&mut self) {
        SegmentTopology::restart(self);
    }

    fn round(&mut self, round: u64, trace: Option<&mut Vec<RouteChange>>) -> RoundSummary {
        SegmentTopology::round(self, round, trace)
    }

    fn is_converged(&self) -> bool {
        SegmentTopology::is_converged(self)
    }

    fn assess(&self) -> ConvergenceState {
        SegmentTopology::assess(self)
    }

    fn final_tree(&self) -> std::result::Result<FinalTree, NotConverged> {
        SegmentTopology::final_tree(self)
    }

    fn messages_sent(&self) -> u64 {
        SegmentTopology::messages_sent(self)
    }
}

/// Sequential rounds over a [`SegmentTopology`].
#[derive(Debug, Clone, Default)]
pub struct SegmentEngine {
    config: EngineConfig,
}

impl SegmentEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl Engine for SegmentEngine {
    type Network = SegmentTopology;

    fn name(&self) -> &'static str {
        "segment"
    }

    fn run(&self, topology: &mut SegmentTopology) -> Result<RunReport> {
        self.config.validate()?;
        Ok(run_rounds(self.name(), topology, &self.config))
    }
}
