//! One tokio task per bridge.
//!
//! Every bridge runs as its own task, draining its mailbox, publishing its
//! route to a shared board and relaying whenever it changed. A monitor
//! watches the board and raises the stop signal once the routes reach the
//! fixpoint, or once the time budget is spent.
//!
//! Workers run under `catch_unwind`. A worker that panics or ignores the
//! stop signal is reported in [`RunReport::failures`] and its bridge is
//! rebuilt from the last route it published.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use spantree_bridge::{BridgeNode, Inbox};
use spantree_topology::NodeId;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::board::RouteBoard;
use crate::{
    Engine, EngineConfig, EngineError, Result, RunOutcome, RunReport, StopReason, Topology, WorkerFailure,
};

type Worker = (BridgeNode, Inbox);
type Joined = (NodeId, std::thread::Result<Worker>);

/// Runs every bridge concurrently on a multi-threaded tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct ConcurrentEngine {
    config: EngineConfig,
    #[cfg(test)]
    fault: Option<Fault>,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
enum Fault {
    Panic(NodeId),
    Hang(NodeId),
}

impl ConcurrentEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            #[cfg(test)]
            fault: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[cfg(test)]
    fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Run on the current tokio runtime.
    ///
    /// [`Engine::run`] builds a dedicated runtime and blocks on this.
    pub async fn drive(&self, topology: &mut Topology) -> Result<RunReport> {
        self.config.validate()?;
        let started = Instant::now();
        topology.restart();

        let board = Arc::new(RouteBoard::new(topology.routes()));
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut tasks = JoinSet::new();
        for (node, inbox) in topology.take_workers() {
            let id = node.id();
            let work = worker(node, inbox, Arc::clone(&board), stop_rx.clone(), self.config.idle_interval);
            #[cfg(test)]
            let work = inject(work, id, self.fault);
            tasks.spawn(async move { (id, AssertUnwindSafe(work).catch_unwind().await) });
        }
        debug!(workers = tasks.len(), "workers started");

        let bridges = topology.graph().vertex_count();
        let mut returned = Vec::with_capacity(bridges);
        let mut failures = Vec::new();
        let deadline = time::Instant::now() + self.config.max_duration;
        let oracle = topology.oracle();

        let stopped = loop {
            if oracle.is_converged(&board.snapshot()) {
                break None;
            }
            if tasks.is_empty() {
                break Some(StopReason::WorkerFailure);
            }
            tokio::select! {
                _ = board.changed() => {}
                _ = time::sleep(self.config.poll_interval) => {}
                _ = time::sleep_until(deadline) => break Some(StopReason::Deadline),
                Some(joined) = tasks.join_next() => collect(joined, &mut returned, &mut failures),
            }
        };

        let _ = stop_tx.send(true);
        let grace = self.config.shutdown_grace;
        let drained = time::timeout(grace, async {
            while let Some(joined) = tasks.join_next().await {
                collect(joined, &mut returned, &mut failures);
            }
        })
        .await;
        if drained.is_err() {
            warn!(remaining = tasks.len(), ?grace, "workers ignored the stop signal");
            tasks.abort_all();
        }

        let mut accounted = vec![false; bridges];
        for (node, _) in &returned {
            accounted[node.id().index()] = true;
        }
        for failure in &failures {
            accounted[failure.node().index()] = true;
        }
        for (index, _) in accounted.iter().enumerate().filter(|(_, &seen)| !seen) {
            let node = NodeId(index as u32);
            warn!(bridge = %node, "worker unresponsive");
            failures.push(WorkerFailure::Unresponsive { node });
        }

        topology.return_workers(returned, &board.snapshot())?;

        let outcome = match topology.final_tree() {
            Ok(tree) => RunOutcome::Converged(tree),
            Err(_) => RunOutcome::NotConverged {
                reason: stopped.unwrap_or(StopReason::WorkerFailure),
                state: topology.assess(),
            },
        };
        if self.config.record_trace {
            warn!("route-change trace is only recorded by the sequential engines");
        }

        let report = RunReport {
            engine: self.name(),
            outcome,
            rounds: 0,
            elapsed: started.elapsed(),
            messages: topology.messages_sent(),
            trace: Vec::new(),
            failures,
        };
        match report.stop_reason() {
            None => info!(engine = report.engine, elapsed = ?report.elapsed, messages = report.messages, "converged"),
            Some(reason) => info!(
                engine = report.engine,
                %reason,
                failures = report.failures.len(),
                "did not converge"
            ),
        }
        Ok(report)
    }
}

impl Engine for ConcurrentEngine {
    type Network = Topology;

    fn name(&self) -> &'static str {
        "concurrent"
    }

    /// Build a runtime and block on [`ConcurrentEngine::drive`].
    ///
    /// # Panics
    ///
    /// Panics if called from within a tokio runtime; use `drive` there.
    fn run(&self, topology: &mut Topology) -> Result<RunReport> {
        self.config.validate()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.runtime_threads())
            .thread_name("spantree-bridge")
            .enable_time()
            .build()
            .map_err(EngineError::Runtime)?;

        let report = runtime.block_on(self.drive(topology));
        runtime.shutdown_timeout(self.config.shutdown_grace);
        report
    }
}

/// A bridge's event loop: apply, publish, relay, wait.
async fn worker(
    mut node: BridgeNode,
    mut inbox: Inbox,
    board: Arc<RouteBoard>,
    mut stop: watch::Receiver<bool>,
    idle: Duration,
) -> Worker {
    let mut ticker = time::interval(idle);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *stop.borrow() {
            break;
        }
        if node.update(&mut inbox) {
            board.publish(node.id(), node.route());
        }
        node.relay();

        tokio::select! {
            biased;
            _ = stop.changed() => break,
            msg = inbox.recv() => match msg {
                Some(msg) => {
                    if node.accept(msg) {
                        board.publish(node.id(), node.route());
                    }
                }
                None => break,
            },
            _ = ticker.tick() => {}
        }
    }

    trace!(bridge = %node.id(), stats = ?node.stats(), "worker stopped");
    (node, inbox)
}

fn collect(
    joined: std::result::Result<Joined, JoinError>,
    returned: &mut Vec<Worker>,
    failures: &mut Vec<WorkerFailure>,
) {
    match joined {
        Ok((_, Ok(worker))) => returned.push(worker),
        Ok((node, Err(payload))) => {
            let message = panic_message(&*payload);
            warn!(bridge = %node, %message, "worker panicked");
            failures.push(WorkerFailure::Panicked { node, message });
        }
        Err(err) => warn!(error = %err, "worker task lost"),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
async fn inject<F>(work: F, id: NodeId, fault: Option<Fault>) -> Worker
where
    F: std::future::Future<Output = Worker>,
{
    match fault {
        Some(Fault::Panic(node)) if node == id => panic!("injected fault in bridge {id}"),
        Some(Fault::Hang(node)) if node == id => std::future::pending().await,
        _ => work.await,
    }
}
