//! Bridge Election Rule
//!
//! Every bridge starts out believing it is the root. Bridges only ever talk
//! to their direct neighbors, and only ever move toward better information:
//! a smaller root, then a shorter path to it, then a smaller next hop.
//!
//! # Local Rule
//!
//! 1. A neighbor advertises `(sender, root, distance)`
//! 2. The receiver prices it as `(root, distance + 1, sender)`
//! 3. The receiver adopts it iff that is strictly smaller than its own route
//! 4. Adoption gates the link back to the sender and schedules a
//!    re-advertisement to everyone else
//!
//! Because only strict improvements are applied, replayed or stale
//! advertisements are harmless and cycles collapse into a tree on their own.
//!
//! # Mailboxes
//!
//! Each bridge owns one [`Inbox`]; neighbors hold cloned [`Outbox`]es. Many
//! producers, one consumer, no shared lock.

mod error;
mod link;
mod mailbox;
mod message;
mod node;

pub use error::{BridgeError, Result};
pub use link::{NeighborLink, Peer, SegmentId};
pub use mailbox::{mailbox, Inbox, Outbox};
pub use message::{ConfigMessage, Route};
pub use node::{BridgeNode, FloodPolicy, NodeStats};

pub use spantree_topology::NodeId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_bridges_elect_smaller_id() {
        let (out0, mut in0) = mailbox();
        let (out1, mut in1) = mailbox();
        let outboxes = [out0, out1];

        let mut a = BridgeNode::wire(NodeId(0), &[NodeId(1)], &outboxes, FloodPolicy::Full).unwrap();
        let mut b = BridgeNode::wire(NodeId(1), &[NodeId(0)], &outboxes, FloodPolicy::Full).unwrap();

        a.relay();
        b.relay();
        assert!(!a.update(&mut in0));
        assert!(b.update(&mut in1));

        assert_eq!(a.route(), Route::own(NodeId(0)));
        assert_eq!(
            b.route(),
            Route {
                root: NodeId(0),
                distance: 1,
                designated: NodeId(0),
            }
        );
    }
}
