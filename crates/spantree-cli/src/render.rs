//! Human-readable output.

use std::fmt::Write;

use spantree_engine::{RouteChange, RunOutcome, RunReport, TreeEntry};

/// Aligned `node root distance designated` table.
pub fn table<'a>(entries: impl IntoIterator<Item = &'a TreeEntry>) -> String {
    let mut out = format!("{:>6}  {:>6}  {:>8}  {:>10}\n", "node", "root", "distance", "designated");
    for e in entries {
        let _ = writeln!(out, "{:>6}  {:>6}  {:>8}  {:>10}", e.node.value(), e.root.value(), e.distance, e.designated.value());
    }
    out
}

/// One-line outcome.
pub fn summary(report: &RunReport) -> String {
    let elapsed = report.elapsed.as_secs_f64() * 1000.0;
    let mut line = match &report.outcome {
        RunOutcome::Converged(tree) => format!(
            "{}: converged, {} root(s), depth {}",
            report.engine,
            tree.roots().len(),
            tree.depth()
        ),
        RunOutcome::NotConverged { reason, state } => format!(
            "{}: not converged ({reason}), {} bridge(s) disagree on the root, {} unsettled",
            report.engine,
            state.disagreeing.len(),
            state.unsettled.len() + state.unsettled_segments.len()
        ),
    };
    if report.rounds > 0 {
        let _ = write!(line, ", {} round(s)", report.rounds);
    }
    let _ = write!(line, ", {} message(s), {elapsed:.1} ms", report.messages);
    line
}

/// One line per route change.
pub fn trace(changes: &[RouteChange]) -> String {
    changes
        .iter()
        .map(|c| format!("round {:>4}  bridge {:>4}  {} -> {}\n", c.round, c.node.value(), c.from, c.to))
        .collect()
}
