//! Configuration messages and the routes they price to.

use std::fmt;

use crate::NodeId;

/// A bridge's belief about the tree: who the root is, how far away it is,
/// and which neighbor leads there.
///
/// Routes order lexicographically by `(root, distance, designated)`; smaller
/// is better. A bridge's route only ever decreases between restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Believed root
    pub root: NodeId,
    /// Hops to the root
    pub distance: u32,
    /// Next hop toward the root (the bridge itself when it is the root)
    pub designated: NodeId,
}

impl Route {
    /// The route every bridge starts with: itself, at distance 0.
    pub const fn own(id: NodeId) -> Self {
        Self {
            root: id,
            distance: 0,
            designated: id,
        }
    }

    /// True if this route names `id` as root.
    pub fn is_own(&self, id: NodeId) -> bool {
        self.root == id
    }

    /// Strictly better than `other`.
    pub fn improves_on(&self, other: &Route) -> bool {
        self < other
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root={} dist={} via={}", self.root, self.distance, self.designated)
    }
}

/// An advertisement exchanged between neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigMessage {
    /// Advertising bridge
    pub sender: NodeId,
    /// Root the sender believes in
    pub root: NodeId,
    /// Sender's distance to that root
    pub distance: u32,
}

impl ConfigMessage {
    /// Create a message.
    pub const fn new(sender: NodeId, root: NodeId, distance: u32) -> Self {
        Self {
            sender,
            root,
            distance,
        }
    }

    /// The route a receiver would hold by going through the sender.
    pub fn candidate(&self) -> Route {
        Route {
            root: self.root,
            distance: self.distance.saturating_add(1),
            designated: self.sender,
        }
    }

    /// Order advertisements the way a segment picks the best one:
    /// root, then distance, then sender.
    pub fn rank(&self) -> (NodeId, u32, NodeId) {
        (self.root, self.distance, self.sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(root: u32, distance: u32, designated: u32) -> Route {
        Route {
            root: NodeId(root),
            distance,
            designated: NodeId(designated),
        }
    }

    #[test]
    fn root_dominates_distance() {
        // A farther path to a smaller root beats a nearer path to a larger one.
        assert!(route(0, 9, 5).improves_on(&route(1, 1, 1)));
    }

    #[test]
    fn distance_then_next_hop() {
        assert!(route(0, 1, 7).improves_on(&route(0, 2, 1)));
        assert!(route(0, 2, 1).improves_on(&route(0, 2, 3)));
        assert!(!route(0, 2, 3).improves_on(&route(0, 2, 3)));
    }

    #[test]
    fn candidate_adds_one_hop() {
        let msg = ConfigMessage::new(NodeId(4), NodeId(0), 2);
        assert_eq!(msg.candidate(), route(0, 3, 4));
    }

    #[test]
    fn own_route_is_root() {
        let r = Route::own(NodeId(3));
        assert!(r.is_own(NodeId(3)));
        assert_eq!(r.distance, 0);
        assert_eq!(r.to_string(), "root=3 dist=0 via=3");
    }
}
