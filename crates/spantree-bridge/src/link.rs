//! Directed links from a bridge to the things it can advertise to.

use std::fmt;

use crate::{ConfigMessage, NodeId, Outbox};

/// A shared broadcast segment (LAN) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SegmentId(pub u32);

impl SegmentId {
    /// The id as an array index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lan{}", self.0)
    }
}

/// The far end of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Peer {
    /// Point-to-point link to another bridge
    Bridge(NodeId),
    /// Attachment to a shared segment
    Segment(SegmentId),
}

/// A directed adjacency from a bridge to a peer, with the peer's outbox and
/// a relay gate.
///
/// The gate is closed on the link the bridge's current best route came in
/// on, so the bridge never echoes a route back where it learned it.
#[derive(Debug, Clone)]
pub struct NeighborLink {
    peer: Peer,
    outbox: Outbox,
    can_send: bool,
}

impl NeighborLink {
    /// An open link to `peer`.
    pub fn new(peer: Peer, outbox: Outbox) -> Self {
        Self {
            peer,
            outbox,
            can_send: true,
        }
    }

    /// The far end.
    pub fn peer(&self) -> Peer {
        self.peer
    }

    /// Whether the bridge may relay on this link.
    pub fn can_send(&self) -> bool {
        self.can_send
    }

    pub(crate) fn set_can_send(&mut self, can_send: bool) {
        self.can_send = can_send;
    }

    /// Point the link at a replacement mailbox.
    pub(crate) fn retarget(&mut self, outbox: Outbox) {
        self.outbox = outbox;
    }

    pub(crate) fn post(&self, msg: ConfigMessage) -> bool {
        self.outbox.post(msg)
    }
}
