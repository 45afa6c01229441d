pub mod driver;
pub mod trial;

pub use driver::{
    run_simulation, run_simulation_with_dice, DamageAggregate, DriverConfig, ShipAggregate,
    SimulationSummary,
};
pub use trial::{run_trial, ShipTrialStats, TrialRecord};
