//! Round-based driving shared by the sequential engines.

use std::time::Instant;

use tracing::{debug, info, trace};

use crate::{
    ConvergenceState, EngineConfig, FinalTree, NotConverged, RoundSummary, RouteChange, RunOutcome,
    RunReport, StopReason, Topology,
};

/// A network that can be stepped one synchronous round at a time.
pub(crate) trait Rounds {
    fn restart(&mut self);
    fn round(&mut self, round: u64, trace: Option<&mut Vec<RouteChange>>) -> RoundSummary;
    fn is_converged(&self) -> bool;
    fn assess(&self) -> ConvergenceState;
    fn final_tree(&self) -> Result<FinalTree, NotConverged>;
    fn messages_sent(&self) -> u64;
}

impl Rounds for Topology {
    fn restart(&mut self) {
        Topology::restart(self);
    }

    fn round(&mut self, round: u64, trace: Option<&mut Vec<RouteChange>>) -> RoundSummary {
        Topology::round(self, round, trace)
    }

    fn is_converged(&self) -> bool {
        Topology::is_converged(self)
    }

    fn assess(&self) -> ConvergenceState {
        Topology::assess(self)
    }

    fn final_tree(&self) -> Result<FinalTree, NotConverged> {
        Topology::final_tree(self)
    }

    fn messages_sent(&self) -> u64 {
        Topology::messages_sent(self)
    }
}

/// Restart `network` and run rounds until it converges, stalls or runs out
/// of rounds.
pub(crate) fn run_rounds<N: Rounds>(engine: &'static str, network: &mut N, config: &EngineConfig) -> RunReport {
    let started = Instant::now();
    network.restart();

    let mut trace = config.record_trace.then(Vec::new);
    let mut rounds = 0;
    let stopped = loop {
        if network.is_converged() {
            break None;
        }
        if rounds >= config.max_rounds {
            break Some(StopReason::RoundBudget);
        }

        rounds += 1;
        let summary = network.round(rounds, trace.as_mut());
        trace!(round = rounds, changed = summary.changed, sent = summary.sent, "round complete");

        // Nothing moved and nothing is in flight: every later round is
        // identical to this one.
        if summary.changed == 0 && !network.is_converged() {
            break Some(StopReason::Stalled);
        }
    };

    let tree = match stopped {
        None => network.final_tree().map_err(|_| StopReason::Stalled),
        Some(reason) => Err(reason),
    };
    let outcome = match tree {
        Ok(tree) => RunOutcome::Converged(tree),
        Err(reason) => RunOutcome::NotConverged {
            reason,
            state: network.assess(),
        },
    };

    let report = RunReport {
        engine,
        outcome,
        rounds,
        elapsed: started.elapsed(),
        messages: network.messages_sent(),
        trace: trace.unwrap_or_default(),
        failures: Vec::new(),
    };
    match report.stop_reason() {
        None => info!(engine, rounds, messages = report.messages, "converged"),
        Some(reason) => {
            let state = match &report.outcome {
                RunOutcome::NotConverged { state, .. } => state.total_tension(),
                RunOutcome::Converged(_) => 0,
            };
            info!(engine, rounds, %reason, tension = state, "did not converge");
        }
    }
    debug!(engine, elapsed = ?report.elapsed, "run finished");
    report
}
