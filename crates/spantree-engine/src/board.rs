//! Routes published by running workers.

use std::sync::{Mutex, PoisonError};

use spantree_bridge::Route;
use spantree_topology::NodeId;
use tokio::sync::Notify;

/// The latest route of every bridge, readable while workers run.
///
/// Each route sits behind its own lock, so a reader never sees half of an
/// update and workers never contend with each other.
#[derive(Debug)]
pub(crate) struct RouteBoard {
    routes: Vec<Mutex<Route>>,
    changed: Notify,
}

impl RouteBoard {
    pub(crate) fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            routes: routes.into_iter().map(Mutex::new).collect(),
            changed: Notify::new(),
        }
    }

    /// Record `route` for `node` and wake the monitor.
    pub(crate) fn publish(&self, node: NodeId, route: Route) {
        if let Some(slot) = self.routes.get(node.index()) {
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = route;
            self.changed.notify_one();
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Route> {
        self.routes
            .iter()
            .map(|slot| *slot.lock().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    /// Wait for the next publish. A publish since the last wait counts.
    pub(crate) async fn changed(&self) {
        self.changed.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn publish_replaces_route() {
        let board = RouteBoard::new([Route::own(NodeId(0)), Route::own(NodeId(1))]);
        let route = Route { root: NodeId(0), distance: 1, designated: NodeId(0) };
        board.publish(NodeId(1), route);
        board.publish(NodeId(9), route);
        assert_eq!(board.snapshot(), vec![Route::own(NodeId(0)), route]);
    }

    #[tokio::test]
    async fn publish_before_wait_is_not_lost() {
        let board = RouteBoard::new([Route::own(NodeId(0))]);
        board.publish(NodeId(0), Route::own(NodeId(0)));
        tokio::time::timeout(Duration::from_secs(1), board.changed())
            .await
            .expect("stored permit wakes the waiter");
    }

    #[tokio::test]
    async fn publish_from_another_task_wakes() {
        let board = Arc::new(RouteBoard::new([Route::own(NodeId(0))]));
        let publisher = Arc::clone(&board);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            publisher.publish(NodeId(0), Route::own(NodeId(0)));
        });
        tokio::time::timeout(Duration::from_secs(1), board.changed()).await.unwrap();
        handle.await.unwrap();
    }
}
