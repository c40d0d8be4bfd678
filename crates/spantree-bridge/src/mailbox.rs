//! Per-bridge MPSC mailboxes.
//!
//! Every bridge owns exactly one [`Inbox`]. Neighbors only ever hold an
//! [`Outbox`] and can append, never read or remove. Each mailbox is its own
//! channel, so bridges never contend on a shared lock.
//!
//! The inbox works from plain synchronous code (`try_next`, `drain`) as well
//! as from a tokio task (`recv`).

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::ConfigMessage;

/// Create a connected outbox/inbox pair.
pub fn mailbox() -> (Outbox, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Outbox { tx }, Inbox { rx })
}

/// Producer side of a bridge's mailbox.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: UnboundedSender<ConfigMessage>,
}

impl Outbox {
    /// Append a message. Returns `false` if the owning inbox is gone.
    pub fn post(&self, msg: ConfigMessage) -> bool {
        self.tx.send(msg).is_ok()
    }

    /// True once the owning inbox has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// True if both handles feed the same inbox.
    pub fn same_mailbox(&self, other: &Outbox) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

/// Consumer side of a bridge's mailbox.
#[derive(Debug)]
pub struct Inbox {
    rx: UnboundedReceiver<ConfigMessage>,
}

impl Inbox {
    /// Take the next message if one is already queued.
    pub fn try_next(&mut self) -> Option<ConfigMessage> {
        self.rx.try_recv().ok()
    }

    /// Take every message that is currently queued.
    pub fn drain(&mut self) -> impl Iterator<Item = ConfigMessage> + '_ {
        std::iter::from_fn(move || self.try_next())
    }

    /// Wait for the next message. `None` once every outbox is dropped.
    pub async fn recv(&mut self) -> Option<ConfigMessage> {
        self.rx.recv().await
    }

    /// Discard everything queued; returns how many messages were dropped.
    pub fn clear(&mut self) -> usize {
        self.drain().count()
    }
}
