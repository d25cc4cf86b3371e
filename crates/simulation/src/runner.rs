//! The round-stepping loop.

use netsim_engine::Factory;
use netsim_types::Round;
use thiserror::Error;
use tracing::debug;

/// Errors from starting a simulation run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// Some ramp has no path to any storehouse; packages from it could
    /// circulate forever. The run is refused before the first round.
    #[error("network is not consistent: a ramp cannot reach any storehouse")]
    InconsistentNetwork,
}

/// Run the factory for `rounds` rounds.
///
/// Refuses an inconsistent network. Each round executes the three
/// phases in fixed order — deliveries, routing, work — then hands the
/// factory to `observer` read-only for reporting. The observer never
/// influences engine behavior.
pub fn simulate<F>(
    factory: &mut Factory,
    rounds: Round,
    mut observer: F,
) -> Result<(), SimulationError>
where
    F: FnMut(&Factory, Round),
{
    if !factory.is_consistent() {
        return Err(SimulationError::InconsistentNetwork);
    }

    for round in 1..=rounds {
        debug!(round, "simulation round");
        factory.do_deliveries(round);
        factory.route();
        factory.do_work(round);
        observer(factory, round);
    }

    Ok(())
}
