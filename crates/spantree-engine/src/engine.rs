//! The engine abstraction.

use crate::{Result, RunReport};

/// Drives a network of bridges from a fresh restart to the fixpoint, or
/// until its budget runs out.
pub trait Engine {
    /// What the engine runs on.
    type Network;

    /// Short name used in reports and logs.
    fn name(&self) -> &'static str;

    /// Restart every bridge and run to completion.
    ///
    /// Errors are reserved for runs that could not be carried out at all.
    /// Not converging is reported in [`RunReport::outcome`].
    fn run(&self, network: &mut Self::Network) -> Result<RunReport>;
}
