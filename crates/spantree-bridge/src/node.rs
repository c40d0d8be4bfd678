//! Per-bridge election state.

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::{
    BridgeError, ConfigMessage, Inbox, NeighborLink, NodeId, Outbox, Peer, Result, Route,
};

/// When a bridge advertises its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FloodPolicy {
    /// Every bridge advertises its best route after a restart and after
    /// every change.
    #[default]
    Full,
    /// Only bridges that still believe themselves root advertise, on every
    /// relay. Information stops one hop past the first bridge that gives
    /// up being root, so this stalls on anything deeper than a star.
    RootOnly,
}

impl fmt::Display for FloodPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FloodPolicy::Full => "full",
            FloodPolicy::RootOnly => "root-only",
        })
    }
}

impl FromStr for FloodPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "full" => Ok(FloodPolicy::Full),
            "root-only" | "root_only" => Ok(FloodPolicy::RootOnly),
            other => Err(format!("unknown flood policy {other:?} (expected full or root-only)")),
        }
    }
}

/// Message counters since the last restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeStats {
    /// Messages that improved the route
    pub accepted: u64,
    /// Messages that did not
    pub discarded: u64,
    /// Advertisements delivered to a neighbor's mailbox
    pub sent: u64,
    /// Advertisements whose mailbox was already gone
    pub undeliverable: u64,
}

/// A bridge: its own id, its current route and its links.
#[derive(Debug, Clone)]
pub struct BridgeNode {
    id: NodeId,
    route: Route,
    links: Vec<NeighborLink>,
    policy: FloodPolicy,
    advertise: bool,
    stats: NodeStats,
}

impl BridgeNode {
    /// An unlinked bridge in its initial, self-rooted state.
    pub fn new(id: NodeId, policy: FloodPolicy) -> Self {
        Self {
            id,
            route: Route::own(id),
            links: Vec::new(),
            policy,
            advertise: true,
            stats: NodeStats::default(),
        }
    }

    /// A bridge linked to each of `neighbors`, where `outboxes[n]` is the
    /// mailbox of bridge `n`.
    pub fn wire(
        id: NodeId,
        neighbors: &[NodeId],
        outboxes: &[Outbox],
        policy: FloodPolicy,
    ) -> Result<Self> {
        let mut node = Self::new(id, policy);
        for &neighbor in neighbors {
            let outbox = outboxes
                .get(neighbor.index())
                .filter(|_| neighbor != id)
                .ok_or(BridgeError::InvalidTopology { node: id, neighbor })?;
            node.attach(NeighborLink::new(Peer::Bridge(neighbor), outbox.clone()));
        }
        Ok(node)
    }

    /// Add a link.
    pub fn attach(&mut self, link: NeighborLink) {
        self.links.push(link);
    }

    /// Point every link to `peer` at a replacement mailbox.
    ///
    /// Returns `false` if no link leads to `peer`.
    pub fn relink(&mut self, peer: Peer, outbox: &Outbox) -> bool {
        let mut found = false;
        for link in self.links.iter_mut().filter(|l| l.peer() == peer) {
            link.retarget(outbox.clone());
            found = true;
        }
        found
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn root(&self) -> NodeId {
        self.route.root
    }

    pub fn distance(&self) -> u32 {
        self.route.distance
    }

    pub fn designated(&self) -> NodeId {
        self.route.designated
    }

    /// True while the bridge believes it is the root.
    pub fn is_root(&self) -> bool {
        self.route.is_own(self.id)
    }

    pub fn links(&self) -> &[NeighborLink] {
        &self.links
    }

    pub fn policy(&self) -> FloodPolicy {
        self.policy
    }

    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// The advertisement this bridge would send right now.
    pub fn advertisement(&self) -> ConfigMessage {
        ConfigMessage::new(self.id, self.route.root, self.route.distance)
    }

    /// Apply one message. Returns `true` if the route improved.
    pub fn accept(&mut self, msg: ConfigMessage) -> bool {
        if msg.sender == self.id {
            self.stats.discarded += 1;
            return false;
        }

        let candidate = msg.candidate();
        if !candidate.improves_on(&self.route) {
            self.stats.discarded += 1;
            return false;
        }

        trace!(
            bridge = %self.id,
            from = %self.route,
            to = %candidate,
            "route improved"
        );
        self.route = candidate;
        self.gate(Peer::Bridge(msg.sender));
        self.advertise = true;
        self.stats.accepted += 1;
        true
    }

    /// Apply every message currently queued in `inbox`.
    ///
    /// Returns `true` if the route changed. An empty inbox changes nothing.
    pub fn update(&mut self, inbox: &mut Inbox) -> bool {
        let mut changed = false;
        while let Some(msg) = inbox.try_next() {
            changed |= self.accept(msg);
        }
        changed
    }

    /// Advertise to every open link if the flood policy says so.
    ///
    /// Returns the number of advertisements delivered.
    pub fn relay(&mut self) -> usize {
        let due = match self.policy {
            FloodPolicy::Full => self.advertise,
            FloodPolicy::RootOnly => self.is_root(),
        };
        if !due {
            return 0;
        }
        self.advertise = false;

        let msg = self.advertisement();
        let mut sent = 0;
        for link in self.links.iter().filter(|l| l.can_send()) {
            if link.post(msg) {
                sent += 1;
            } else {
                self.stats.undeliverable += 1;
                trace!(bridge = %self.id, peer = ?link.peer(), "mailbox closed");
            }
        }
        self.stats.sent += sent as u64;
        sent
    }

    /// Back to the initial state: self-rooted, every link open, an
    /// advertisement pending, `inbox` emptied.
    pub fn restart(&mut self, inbox: &mut Inbox) {
        let dropped = inbox.clear();
        if dropped > 0 {
            trace!(bridge = %self.id, dropped, "discarded queued messages");
        }
        self.reset();
    }

    /// [`BridgeNode::restart`] without an inbox, for bridges whose queues
    /// are cleared by their owner.
    pub fn reset(&mut self) {
        self.route = Route::own(self.id);
        for link in &mut self.links {
            link.set_can_send(true);
        }
        self.advertise = true;
        self.stats = NodeStats::default();
    }

    /// Install a previously published route on a rebuilt bridge.
    ///
    /// Routes not rooted at this bridge must have a non-zero distance.
    pub fn restore_route(&mut self, route: Route) {
        debug_assert_eq!(route.distance == 0, route.is_own(self.id));
        self.route = route;
        if route.is_own(self.id) {
            for link in &mut self.links {
                link.set_can_send(true);
            }
        } else {
            self.gate(Peer::Bridge(route.designated));
        }
        self.advertise = true;
    }

    /// Close the link toward `upstream`, open every other one.
    fn gate(&mut self, upstream: Peer) {
        for link in &mut self.links {
            link.set_can_send(link.peer() != upstream);
        }
    }
}
