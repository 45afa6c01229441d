//! Seed sweeps: many independent simulation runs distributed across cores.
//!
//! Each run builds its own fleet and boss from the shared config and draws
//! its seed from `base_seed + run index`, so a sweep is reproducible and no
//! mutable state crosses run boundaries. Results keep input order.

use rayon::prelude::*;

use crate::data::config::{build_boss, build_fleet, FleetConfig};
use crate::parallel::pool::WorkerPool;
use crate::sim::driver::{run_simulation_with_dice, SimulationSummary};
use crate::combat::rng::Rng;

/// Run `runs` independent simulations sequentially.
pub fn run_seed_sweep(
    config: &FleetConfig,
    runs: usize,
    base_seed: u64,
) -> Result<Vec<SimulationSummary>, String> {
    sweep(config, runs, base_seed, false)
}

/// Like [run_seed_sweep] but distributes runs across all CPU cores via
/// Rayon. Use for large sweeps; results order matches run index.
pub fn run_seed_sweep_parallel(
    config: &FleetConfig,
    runs: usize,
    base_seed: u64,
) -> Result<Vec<SimulationSummary>, String> {
    sweep(config, runs, base_seed, true)
}

/// Run a parallel sweep on a bounded pool.
pub fn run_seed_sweep_on(
    config: &FleetConfig,
    runs: usize,
    base_seed: u64,
    pool: &WorkerPool,
) -> Result<Vec<SimulationSummary>, String> {
    pool.install(|| sweep(config, runs, base_seed, true))
}

fn sweep(
    config: &FleetConfig,
    runs: usize,
    base_seed: u64,
    parallel: bool,
) -> Result<Vec<SimulationSummary>, String> {
    // Fail fast on a config that cannot build, before spawning anything.
    build_fleet(config)?;
    if config.ships.is_empty() {
        return Err("cannot sweep an empty fleet".to_string());
    }

    let run_one = |run: usize| {
        let seed = base_seed.wrapping_add(run as u64);
        let mut fleet = build_fleet(config).expect("config was validated above");
        let mut boss = build_boss(config);
        let mut rng = Rng::new(seed);
        run_simulation_with_dice(&mut fleet, &mut boss, &config.sim, seed, &mut rng)
    };

    let summaries = if parallel {
        (0..runs).into_par_iter().map(run_one).collect()
    } else {
        (0..runs).map(run_one).collect()
    };
    Ok(summaries)
}
