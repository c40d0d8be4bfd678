//! Deterministic round-by-round engine.

use crate::rounds::run_rounds;
use crate::{Engine, EngineConfig, Result, RunReport, Topology};

/// Runs every bridge in id order, one synchronous round at a time.
///
/// The same topology always yields the same tree, round count and trace.
#[derive(Debug, Clone, Default)]
pub struct SequentialEngine {
    config: EngineConfig,
}

impl SequentialEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Engine for SequentialEngine {
    type Network = Topology;

    fn name(&self) -> &'static str {
        "sequential"
    }

    fn run(&self, topology: &mut Topology) -> Result<RunReport> {
        self.config.validate()?;
        Ok(run_rounds(self.name(), topology, &self.config))
    }
}
